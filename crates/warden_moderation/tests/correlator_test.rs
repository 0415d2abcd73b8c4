//! Audit correlation.

use chrono::{TimeDelta, Utc};
use std::sync::Arc;
use warden_core::{
    ActorId, Attribution, AuditActionKind, AuditEntry, ChannelId, ChannelInfo, ChannelKind,
    CommunityId, Event, EventKind, MemberInfo, MessageId, MessageInfo, RoleId, RoleInfo,
};
use warden_interface::InMemoryPlatform;
use warden_moderation::{AuditConfig, AuditCorrelator};

const GUILD: CommunityId = CommunityId::new(10);
const ACTOR: ActorId = ActorId::new(66);
const MEMBER: ActorId = ActorId::new(7);

fn correlator(platform: &Arc<InMemoryPlatform>) -> AuditCorrelator {
    AuditCorrelator::new(platform.clone(), &AuditConfig::default())
}

fn channel_created() -> Event {
    Event::now(
        GUILD,
        EventKind::ChannelCreated {
            channel: ChannelInfo::new(ChannelId::new(1), "raid", ChannelKind::Text),
        },
    )
}

#[tokio::test]
async fn test_resolves_newest_entry() {
    let platform = Arc::new(InMemoryPlatform::new());
    platform.push_audit_entry(
        GUILD,
        AuditEntry::new(ACTOR, AuditActionKind::ChannelCreate, Some(1), Utc::now()),
    );

    let attribution = correlator(&platform).attribute(&channel_created()).await;
    assert_eq!(attribution, Attribution::Resolved(ACTOR));
}

#[tokio::test]
async fn test_no_entry_is_unknown() {
    let platform = Arc::new(InMemoryPlatform::new());
    let attribution = correlator(&platform).attribute(&channel_created()).await;
    assert_eq!(attribution, Attribution::Unknown);
}

#[tokio::test]
async fn test_query_failure_is_unknown() {
    let platform = Arc::new(InMemoryPlatform::new());
    platform.push_audit_entry(
        GUILD,
        AuditEntry::new(ACTOR, AuditActionKind::ChannelCreate, None, Utc::now()),
    );
    platform.set_audit_unavailable(true);

    let attribution = correlator(&platform).attribute(&channel_created()).await;
    assert!(attribution.is_unknown());
}

#[tokio::test]
async fn test_subject_mismatch_is_unknown() {
    let platform = Arc::new(InMemoryPlatform::new());
    platform.push_audit_entry(
        GUILD,
        AuditEntry::new(
            ACTOR,
            AuditActionKind::MemberRoleUpdate,
            Some(999),
            Utc::now(),
        ),
    );
    let event = Event::now(
        GUILD,
        EventKind::RolesGranted {
            member: MemberInfo::new(MEMBER, "member", false),
            added_roles: vec![RoleInfo::new(RoleId::new(3), "Admin", 8)],
        },
    );

    let attribution = correlator(&platform).attribute(&event).await;
    assert_eq!(attribution, Attribution::Unknown);
}

#[tokio::test]
async fn test_stale_entry_is_unknown() {
    let platform = Arc::new(InMemoryPlatform::new());
    let event = channel_created();
    platform.push_audit_entry(
        GUILD,
        AuditEntry::new(
            ACTOR,
            AuditActionKind::ChannelCreate,
            None,
            *event.occurred_at() - TimeDelta::seconds(120),
        ),
    );

    assert!(correlator(&platform).attribute(&event).await.is_unknown());

    let lenient = AuditCorrelator::new(
        platform.clone(),
        &AuditConfig::default().with_max_entry_age_secs(0),
    );
    assert_eq!(lenient.attribute(&event).await, Attribution::Resolved(ACTOR));
}

#[tokio::test]
async fn test_posted_message_credited_to_author() {
    let platform = Arc::new(InMemoryPlatform::new());
    platform.set_audit_unavailable(true);
    let event = Event::now(
        GUILD,
        EventKind::MessagePosted {
            message: MessageInfo::new(
                MessageId::new(1),
                ChannelId::new(2),
                MemberInfo::new(MEMBER, "member", false),
                "hi",
            ),
        },
    );

    assert_eq!(
        correlator(&platform).attribute(&event).await,
        Attribution::Resolved(MEMBER)
    );
}

#[tokio::test]
async fn test_message_delete_attribution() {
    let platform = Arc::new(InMemoryPlatform::new());
    let event = Event::now(
        GUILD,
        EventKind::MessageDeleted {
            channel: ChannelId::new(2),
            message: MessageId::new(3),
            author: Some(MemberInfo::new(MEMBER, "member", false)),
            content: Some("oops".to_string()),
        },
    );

    // Without a matching entry the author deleted it.
    assert_eq!(
        correlator(&platform).attribute(&event).await,
        Attribution::Resolved(MEMBER)
    );

    platform.push_audit_entry(
        GUILD,
        AuditEntry::new(
            ACTOR,
            AuditActionKind::MessageDelete,
            Some(MEMBER.get()),
            Utc::now(),
        ),
    );
    assert_eq!(
        correlator(&platform).attribute(&event).await,
        Attribution::Resolved(ACTOR)
    );

    let uncached = Event::now(
        GUILD,
        EventKind::MessageDeleted {
            channel: ChannelId::new(2),
            message: MessageId::new(4),
            author: None,
            content: None,
        },
    );
    assert!(correlator(&platform).attribute(&uncached).await.is_unknown());
}
