//! Tests for the in-memory platform double.

use chrono::{Duration as ChronoDuration, Utc};
use std::time::Duration;
use warden_core::{
    ActorId, AuditActionKind, AuditEntry, ChannelDescriptor, ChannelId, ChannelInfo, ChannelKind,
    CommunityId, MessageId, RoleDescriptor, RoleId, RoleInfo,
};
use warden_error::PlatformErrorKind;
use warden_interface::{
    AuditTrail, InMemoryPlatform, IssuedCommand, ModerationPlatform, StructurePlatform,
};

const GUILD: CommunityId = CommunityId::new(100);

#[tokio::test]
async fn test_repeat_ban_reports_already_in_effect() {
    let platform = InMemoryPlatform::new();
    let actor = ActorId::new(7);
    platform.add_member(GUILD, actor);

    platform.ban_actor(GUILD, actor, "first").await.unwrap();
    let err = platform.ban_actor(GUILD, actor, "second").await.unwrap_err();

    assert!(matches!(err.kind(), PlatformErrorKind::AlreadyInEffect(_)));
    assert!(err.kind().is_already_in_effect());
    assert!(platform.is_banned(GUILD, actor));
    assert!(!platform.is_member(GUILD, actor));
}

#[tokio::test]
async fn test_protected_actor_rejects_sanctions() {
    let platform = InMemoryPlatform::new();
    let admin = ActorId::new(9);
    platform.add_member(GUILD, admin);
    platform.protect(admin);

    let err = platform.kick_actor(GUILD, admin, "nope").await.unwrap_err();
    assert!(matches!(err.kind(), PlatformErrorKind::PermissionDenied(_)));
    assert!(platform.is_member(GUILD, admin));
}

#[tokio::test]
async fn test_denied_command_rejected() {
    let platform = InMemoryPlatform::new();
    let channel = ChannelInfo::new(ChannelId::new(5), "spam", ChannelKind::Text);
    platform.add_channel(GUILD, channel);
    platform.deny_command("delete_channel");

    let err = platform
        .delete_channel(GUILD, ChannelId::new(5), "revert")
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), PlatformErrorKind::PermissionDenied(_)));
    assert_eq!(platform.channels(GUILD).len(), 1);
}

#[tokio::test]
async fn test_missing_entities_report_not_found() {
    let platform = InMemoryPlatform::new();

    let err = platform
        .delete_role(GUILD, RoleId::new(1), "gone")
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), PlatformErrorKind::NotFound(_)));

    let err = platform
        .delete_message(ChannelId::new(1), MessageId::new(2), "gone")
        .await
        .unwrap_err();
    assert!(err.kind().is_already_in_effect());
}

#[tokio::test]
async fn test_audit_entries_newest_first_and_filtered() {
    let platform = InMemoryPlatform::new();
    let now = Utc::now();
    platform.push_audit_entry(
        GUILD,
        AuditEntry::new(
            ActorId::new(1),
            AuditActionKind::ChannelCreate,
            None,
            now - ChronoDuration::seconds(30),
        ),
    );
    platform.push_audit_entry(
        GUILD,
        AuditEntry::new(ActorId::new(2), AuditActionKind::ChannelCreate, None, now),
    );
    platform.push_audit_entry(
        GUILD,
        AuditEntry::new(ActorId::new(3), AuditActionKind::RoleCreate, None, now),
    );

    let entries = platform
        .fetch_audit_entries(GUILD, AuditActionKind::ChannelCreate, 1)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(*entries[0].actor(), ActorId::new(2));
}

#[tokio::test]
async fn test_audit_unavailable() {
    let platform = InMemoryPlatform::new();
    platform.set_audit_unavailable(true);
    assert!(
        platform
            .fetch_audit_entries(GUILD, AuditActionKind::BanAdd, 1)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_role_removal_and_timeout() {
    let platform = InMemoryPlatform::new();
    let member = ActorId::new(4);
    platform.add_member(GUILD, member);
    platform.grant_role(GUILD, member, RoleId::new(10));
    platform.grant_role(GUILD, member, RoleId::new(11));

    platform
        .remove_roles(GUILD, member, &[RoleId::new(10)], "strip")
        .await
        .unwrap();
    assert_eq!(platform.member_roles(GUILD, member), vec![RoleId::new(11)]);

    platform
        .timeout_actor(GUILD, member, Duration::from_secs(600), "flood")
        .await
        .unwrap();
    assert_eq!(
        platform.timeout_of(GUILD, member),
        Some(Duration::from_secs(600))
    );

    assert_eq!(
        platform.issued(),
        vec![
            IssuedCommand::RemoveRoles(member, vec![RoleId::new(10)]),
            IssuedCommand::Timeout(member, Duration::from_secs(600)),
        ]
    );
}

#[tokio::test]
async fn test_structure_creation() {
    let platform = InMemoryPlatform::new();
    platform.add_managed_role(GUILD, RoleInfo::new(RoleId::new(100), "@everyone", 0));

    let role = platform
        .create_role(GUILD, &RoleDescriptor::new("Mods", 8))
        .await
        .unwrap();
    platform
        .create_channel(GUILD, &ChannelDescriptor::new("general", ChannelKind::Text))
        .await
        .unwrap();
    let unknown = platform
        .create_channel(GUILD, &ChannelDescriptor::new("odd", ChannelKind::Unknown(42)))
        .await;

    assert!(unknown.is_err());
    let roles = platform.list_roles(GUILD).await.unwrap();
    assert_eq!(roles.len(), 2);
    assert!(roles.iter().any(|r| *r.role().id() == role && !r.is_managed()));
    assert!(roles.iter().any(|r| r.role().name() == "@everyone" && r.is_managed()));
    assert_eq!(platform.list_channels(GUILD).await.unwrap().len(), 1);
}
