//! Tests for the Serenity to Warden mappings.

use serenity::model::Timestamp;
use serenity::model::channel::ChannelType;
use serenity::model::guild::audit_log::{Action, MemberAction, MessageAction, RoleAction};
use warden_core::{AuditActionKind, ChannelKind};
use warden_social::{
    added_roles, audit_action, channel_kind, channel_type, server_flag_change, timestamp_of,
};

#[test]
fn test_restorable_channel_kinds_map_back_to_their_type() {
    for kind in [
        ChannelType::Text,
        ChannelType::Voice,
        ChannelType::Category,
        ChannelType::News,
        ChannelType::Stage,
        ChannelType::Forum,
    ] {
        let mapped = channel_kind(kind);
        assert!(mapped.is_restorable(), "{:?} should be restorable", kind);
        assert_eq!(channel_type(mapped), Some(kind));
    }
}

#[test]
fn test_threads_are_unknown_and_not_recreated() {
    let kind = channel_kind(ChannelType::PublicThread);
    assert!(matches!(kind, ChannelKind::Unknown(11)));
    assert_eq!(channel_type(kind), None);
}

#[test]
fn test_audit_actions_map_to_discord_actions() {
    assert!(matches!(
        audit_action(AuditActionKind::BotAdd),
        Action::Member(MemberAction::BotAdd)
    ));
    assert!(matches!(
        audit_action(AuditActionKind::MemberRoleUpdate),
        Action::Member(MemberAction::RoleUpdate)
    ));
    assert!(matches!(
        audit_action(AuditActionKind::RoleUpdate),
        Action::Role(RoleAction::Update)
    ));
    assert!(matches!(
        audit_action(AuditActionKind::MessageDelete),
        Action::Message(MessageAction::Delete)
    ));
}

#[test]
fn test_added_roles_keeps_only_new_entries() {
    let before = [1_u64, 2, 3];
    let after = [3_u64, 4, 1, 5];
    assert_eq!(added_roles(&before, &after), vec![4, 5]);
    assert_eq!(added_roles(&after, &before), vec![2]);
    assert!(added_roles(&before, &before).is_empty());
}

#[test]
fn test_server_flag_change_detects_transitions() {
    assert_eq!(server_flag_change(Some(false), true), Some(true));
    assert_eq!(server_flag_change(Some(true), false), Some(false));
    assert_eq!(server_flag_change(Some(true), true), None);
    assert_eq!(server_flag_change(None, true), Some(true));
    assert_eq!(server_flag_change(None, false), None);
}

#[test]
fn test_timestamp_conversion_keeps_seconds() {
    let timestamp = Timestamp::from_unix_timestamp(1_700_000_000).expect("valid timestamp");
    assert_eq!(timestamp_of(timestamp).timestamp(), 1_700_000_000);
}
