//! Tests for event payload helpers.

use warden_core::{
    ActorId, AuditActionKind, ChannelId, ChannelInfo, ChannelKind, CommunityId, Event, EventKind,
    MemberInfo, MessageId, RoleId, RoleInfo, VoiceStateChange,
};

fn member(id: u64, is_bot: bool) -> MemberInfo {
    MemberInfo::new(ActorId::new(id), format!("user{}", id), is_bot)
}

#[test]
fn test_structural_events_map_to_audit_actions() {
    let channel = ChannelInfo::new(ChannelId::new(10), "general", ChannelKind::Text);
    let role = RoleInfo::new(RoleId::new(20), "mods", 8);

    let created = EventKind::ChannelCreated {
        channel: channel.clone(),
    };
    assert_eq!(created.audit_action(), Some(AuditActionKind::ChannelCreate));
    assert_eq!(created.audit_subject(), None);

    let deleted = EventKind::RoleDeleted { role: role.clone() };
    assert_eq!(deleted.audit_action(), Some(AuditActionKind::RoleDelete));

    let modified = EventKind::RoleModified {
        before: None,
        after: role,
    };
    assert_eq!(modified.audit_action(), Some(AuditActionKind::RoleUpdate));
}

#[test]
fn test_human_join_is_not_attributed() {
    let human = EventKind::MemberJoined {
        member: member(5, false),
    };
    assert_eq!(human.audit_action(), None);

    let bot = EventKind::MemberJoined {
        member: member(6, true),
    };
    assert_eq!(bot.audit_action(), Some(AuditActionKind::BotAdd));
    assert_eq!(bot.audit_subject(), Some(6));
}

#[test]
fn test_message_delete_subject_is_author() {
    let kind = EventKind::MessageDeleted {
        channel: ChannelId::new(1),
        message: MessageId::new(2),
        author: Some(member(77, false)),
        content: Some("hello".to_string()),
    };
    assert_eq!(kind.audit_action(), Some(AuditActionKind::MessageDelete));
    assert_eq!(kind.audit_subject(), Some(77));

    let uncached = EventKind::MessageDeleted {
        channel: ChannelId::new(1),
        message: MessageId::new(2),
        author: None,
        content: None,
    };
    assert_eq!(uncached.audit_action(), None);
}

#[test]
fn test_voice_change_only_attributed_when_moderated() {
    let joined = VoiceStateChange::new(member(3, false), None, Some(ChannelId::new(9)), None, None);
    assert!(!joined.is_moderated());
    let kind = EventKind::VoiceStateChanged { change: joined };
    assert_eq!(kind.audit_action(), None);
    assert!(kind.describe().contains("joined voice 9"));

    let muted = VoiceStateChange::new(member(3, false), None, None, Some(true), None);
    let kind = EventKind::VoiceStateChanged { change: muted };
    assert_eq!(kind.audit_action(), Some(AuditActionKind::MemberUpdate));
    assert!(kind.describe().contains("server muted"));
}

#[test]
fn test_labels_are_snake_case() {
    let event = Event::now(
        CommunityId::new(1),
        EventKind::BanIssued {
            target: member(4, false),
        },
    );
    assert_eq!(event.kind().label(), "ban_issued");
    assert_eq!(event.community().get(), 1);
}

#[test]
fn test_roles_granted_beneficiary() {
    let kind = EventKind::RolesGranted {
        member: member(8, false),
        added_roles: vec![RoleInfo::new(RoleId::new(1), "admin", 8)],
    };
    assert_eq!(kind.beneficiary().map(|m| *m.id()), Some(ActorId::new(8)));
    assert!(kind.describe().contains("admin"));
}
