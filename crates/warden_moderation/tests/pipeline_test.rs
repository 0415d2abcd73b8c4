//! End-to-end pipeline runs against the in-memory platform.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use warden_core::{
    ActionStatus, ActorId, Attribution, AuditActionKind, AuditEntry, ChannelId, ChannelInfo,
    ChannelKind, CommunityId, Disposition, Event, EventKind, MemberInfo, MessageId, MessageInfo,
    RemediationAction, RoleId, RoleInfo,
};
use warden_interface::{InMemoryPlatform, IssuedCommand};
use warden_moderation::{
    AuditConfig, AuditCorrelator, EnforcementConfig, EnforcementExecutor, ModerationPipeline,
    OperatorConsole,
};
use warden_security::{ContentClassifier, ModerationState, PolicyConfig, PolicyEngine, SpamConfig};
use warden_snapshot::SnapshotManager;

const GUILD: CommunityId = CommunityId::new(10);
const OWNER: ActorId = ActorId::new(1);
const INTRUDER: ActorId = ActorId::new(66);
const MEMBER: ActorId = ActorId::new(7);

fn pipeline(platform: &Arc<InMemoryPlatform>) -> (Arc<ModerationPipeline>, Arc<ModerationState>) {
    let state = Arc::new(ModerationState::new(OWNER, &SpamConfig::default()));
    let pipeline = ModerationPipeline::new(
        AuditCorrelator::new(platform.clone(), &AuditConfig::default()),
        PolicyEngine::new(
            PolicyConfig::default(),
            ContentClassifier::new().unwrap(),
            state.clone(),
        ),
        EnforcementExecutor::new(platform.clone(), EnforcementConfig::default()),
        platform.clone(),
    );
    (Arc::new(pipeline), state)
}

fn audit(platform: &InMemoryPlatform, actor: ActorId, action: AuditActionKind, target: Option<u64>) {
    platform.push_audit_entry(GUILD, AuditEntry::new(actor, action, target, Utc::now()));
}

fn posted(author: ActorId, id: u64, content: &str) -> Event {
    Event::now(
        GUILD,
        EventKind::MessagePosted {
            message: MessageInfo::new(
                MessageId::new(id),
                ChannelId::new(3),
                MemberInfo::new(author, "author", false),
                content,
            ),
        },
    )
}

#[tokio::test]
async fn test_unauthorized_channel_creation_reverted_and_banned() {
    let platform = Arc::new(InMemoryPlatform::new());
    let (pipeline, _) = pipeline(&platform);
    platform.add_member(GUILD, INTRUDER);
    let channel = ChannelInfo::new(ChannelId::new(50), "nuked", ChannelKind::Text);
    platform.add_channel(GUILD, channel.clone());
    audit(&platform, INTRUDER, AuditActionKind::ChannelCreate, Some(50));

    let record = pipeline
        .handle(Event::now(GUILD, EventKind::ChannelCreated { channel }))
        .await;

    assert_eq!(*record.attribution(), Attribution::Resolved(INTRUDER));
    assert_eq!(record.verdict().disposition(), Disposition::Violation);
    assert!(record.report().as_ref().unwrap().is_complete());
    assert!(platform.channels(GUILD).is_empty());
    assert!(platform.is_banned(GUILD, INTRUDER));
    assert_eq!(platform.records().len(), 1);
}

#[tokio::test]
async fn test_owner_mutation_allowed() {
    let platform = Arc::new(InMemoryPlatform::new());
    let (pipeline, _) = pipeline(&platform);
    audit(&platform, OWNER, AuditActionKind::RoleDelete, None);

    let record = pipeline
        .handle(Event::now(
            GUILD,
            EventKind::RoleDeleted {
                role: RoleInfo::new(RoleId::new(2), "Old", 0),
            },
        ))
        .await;

    assert!(record.verdict().is_authorized());
    assert!(record.report().is_none());
    assert!(platform.issued().is_empty());
}

#[tokio::test]
async fn test_unattributed_event_recorded_without_enforcement() {
    let platform = Arc::new(InMemoryPlatform::new());
    let (pipeline, _) = pipeline(&platform);

    let record = pipeline
        .handle(Event::now(
            GUILD,
            EventKind::ChannelDeleted {
                channel: ChannelInfo::new(ChannelId::new(4), "rules", ChannelKind::Text),
            },
        ))
        .await;

    assert_eq!(record.verdict().disposition(), Disposition::Unattributed);
    assert!(platform.issued().is_empty());
    assert_eq!(platform.records().len(), 1);
}

#[tokio::test]
async fn test_role_grant_by_intruder() {
    let platform = Arc::new(InMemoryPlatform::new());
    let (pipeline, _) = pipeline(&platform);
    platform.add_member(GUILD, INTRUDER);
    platform.add_member(GUILD, MEMBER);
    platform.grant_role(GUILD, MEMBER, RoleId::new(8));
    audit(
        &platform,
        INTRUDER,
        AuditActionKind::MemberRoleUpdate,
        Some(MEMBER.get()),
    );

    let record = pipeline
        .handle(Event::now(
            GUILD,
            EventKind::RolesGranted {
                member: MemberInfo::new(MEMBER, "member", false),
                added_roles: vec![RoleInfo::new(RoleId::new(8), "Admin", 8)],
            },
        ))
        .await;

    assert!(record.verdict().is_violation());
    assert!(platform.member_roles(GUILD, MEMBER).is_empty());
    assert_eq!(
        platform.timeout_of(GUILD, MEMBER),
        Some(Duration::from_secs(86_400))
    );
    assert!(platform.is_banned(GUILD, INTRUDER));
}

#[tokio::test]
async fn test_bot_added_by_intruder_is_kicked() {
    let platform = Arc::new(InMemoryPlatform::new());
    let (pipeline, _) = pipeline(&platform);
    let bot = ActorId::new(500);
    platform.add_member(GUILD, INTRUDER);
    platform.add_member(GUILD, bot);
    audit(&platform, INTRUDER, AuditActionKind::BotAdd, Some(bot.get()));

    pipeline
        .handle(Event::now(
            GUILD,
            EventKind::MemberJoined {
                member: MemberInfo::new(bot, "nukebot", true),
            },
        ))
        .await;

    assert_eq!(
        platform.issued(),
        vec![IssuedCommand::Kick(bot), IssuedCommand::Ban(INTRUDER)]
    );
}

#[tokio::test]
async fn test_unauthorized_ban_punishes_banner() {
    let platform = Arc::new(InMemoryPlatform::new());
    let (pipeline, _) = pipeline(&platform);
    platform.add_member(GUILD, INTRUDER);
    platform.grant_role(GUILD, INTRUDER, RoleId::new(9));
    audit(&platform, INTRUDER, AuditActionKind::BanAdd, Some(MEMBER.get()));

    let record = pipeline
        .handle(Event::now(
            GUILD,
            EventKind::BanIssued {
                target: MemberInfo::new(MEMBER, "victim", false),
            },
        ))
        .await;

    let report = record.report().as_ref().unwrap();
    assert_eq!(
        report.status_of(&RemediationAction::StripAllRolesFromActor),
        Some(&ActionStatus::Applied)
    );
    assert_eq!(
        platform.issued(),
        vec![
            IssuedCommand::StripAllRoles(INTRUDER),
            IssuedCommand::Kick(INTRUDER)
        ]
    );
}

#[tokio::test]
async fn test_link_deleted_and_author_timed_out() {
    let platform = Arc::new(InMemoryPlatform::new());
    let (pipeline, _) = pipeline(&platform);
    platform.add_member(GUILD, MEMBER);
    platform.add_message(ChannelId::new(3), MessageId::new(11));

    pipeline
        .handle(posted(MEMBER, 11, "free stuff at https://scam.example"))
        .await;

    assert!(!platform.has_message(ChannelId::new(3), MessageId::new(11)));
    assert_eq!(
        platform.timeout_of(GUILD, MEMBER),
        Some(Duration::from_secs(600))
    );
}

#[tokio::test]
async fn test_flood_detected_on_sixth_message() {
    let platform = Arc::new(InMemoryPlatform::new());
    let (pipeline, _) = pipeline(&platform);
    platform.add_member(GUILD, MEMBER);

    for id in 0..5 {
        let record = pipeline.handle(posted(MEMBER, id, "hello")).await;
        assert_eq!(record.verdict().disposition(), Disposition::Observed);
    }
    let record = pipeline.handle(posted(MEMBER, 5, "hello")).await;

    assert!(record.verdict().is_violation());
    assert_eq!(
        platform.issued(),
        vec![IssuedCommand::Timeout(MEMBER, Duration::from_secs(600))]
    );
}

#[tokio::test]
async fn test_whitelisted_author_may_mention_everyone() {
    let platform = Arc::new(InMemoryPlatform::new());
    let (pipeline, state) = pipeline(&platform);
    state.whitelist().add(MEMBER);

    let record = pipeline.handle(posted(MEMBER, 1, "@everyone meeting")).await;

    assert_eq!(record.verdict().disposition(), Disposition::Authorized);
    assert!(platform.issued().is_empty());
}

#[tokio::test]
async fn test_dispatch_runs_on_task() {
    let platform = Arc::new(InMemoryPlatform::new());
    let (pipeline, _) = pipeline(&platform);

    let record = pipeline
        .dispatch(Event::now(
            GUILD,
            EventKind::MessageEdited {
                channel: ChannelId::new(3),
                message: MessageId::new(1),
                author: MemberInfo::new(MEMBER, "member", false),
                before: Some("a".to_string()),
                after: "b".to_string(),
            },
        ))
        .await
        .unwrap();

    assert_eq!(record.verdict().disposition(), Disposition::Observed);
    assert_eq!(*record.attribution(), Attribution::Resolved(MEMBER));
}

fn console(platform: &Arc<InMemoryPlatform>, state: &Arc<ModerationState>) -> OperatorConsole {
    let snapshots = Arc::new(SnapshotManager::new(platform.clone()));
    OperatorConsole::new("!", state.clone(), snapshots, platform.clone())
}

#[tokio::test]
async fn test_command_from_stranger_is_still_moderated() {
    let platform = Arc::new(InMemoryPlatform::new());
    let (pipeline, state) = pipeline(&platform);
    let console = console(&platform, &state);
    platform.add_member(GUILD, MEMBER);
    platform.add_message(ChannelId::new(3), MessageId::new(21));

    let outcome = pipeline
        .handle_message(
            &console,
            posted(MEMBER, 21, "!settings @everyone http://evil.com"),
        )
        .await
        .unwrap();

    assert!(outcome.record.verdict().is_violation());
    assert!(!platform.has_message(ChannelId::new(3), MessageId::new(21)));
    assert_eq!(
        platform.timeout_of(GUILD, MEMBER),
        Some(Duration::from_secs(3600))
    );
    let response = outcome.response.unwrap();
    assert!(!response.success);
}

#[tokio::test]
async fn test_repeated_commands_count_toward_flood() {
    let platform = Arc::new(InMemoryPlatform::new());
    let (pipeline, state) = pipeline(&platform);
    let console = console(&platform, &state);
    platform.add_member(GUILD, MEMBER);

    for id in 0..5 {
        let outcome = pipeline
            .handle_message(&console, posted(MEMBER, id, "!settings"))
            .await
            .unwrap();
        assert!(!outcome.record.verdict().is_violation());
    }
    let outcome = pipeline
        .handle_message(&console, posted(MEMBER, 5, "!settings"))
        .await
        .unwrap();

    assert!(outcome.record.verdict().is_violation());
    assert_eq!(
        platform.timeout_of(GUILD, MEMBER),
        Some(Duration::from_secs(600))
    );
}

#[tokio::test]
async fn test_owner_command_answered_after_moderation() {
    let platform = Arc::new(InMemoryPlatform::new());
    let (pipeline, state) = pipeline(&platform);
    let console = console(&platform, &state);

    let outcome = pipeline
        .handle_message(&console, posted(OWNER, 1, "!whitelist <@7>"))
        .await
        .unwrap();

    assert_eq!(outcome.record.verdict().disposition(), Disposition::Observed);
    assert!(outcome.response.unwrap().success);
    assert!(state.whitelist().contains(MEMBER));
    assert!(platform.issued().is_empty());
}

#[tokio::test]
async fn test_plain_message_gets_no_response() {
    let platform = Arc::new(InMemoryPlatform::new());
    let (pipeline, state) = pipeline(&platform);
    let console = console(&platform, &state);

    let outcome = pipeline
        .handle_message(&console, posted(MEMBER, 1, "good morning"))
        .await
        .unwrap();

    assert_eq!(outcome.record.verdict().disposition(), Disposition::Observed);
    assert!(outcome.response.is_none());
}

#[tokio::test]
async fn test_bot_messages_are_ignored() {
    let platform = Arc::new(InMemoryPlatform::new());
    let (pipeline, state) = pipeline(&platform);
    let console = console(&platform, &state);
    let integration = ActorId::new(500);
    platform.add_member(GUILD, integration);
    platform.add_message(ChannelId::new(3), MessageId::new(31));

    let event = Event::now(
        GUILD,
        EventKind::MessagePosted {
            message: MessageInfo::new(
                MessageId::new(31),
                ChannelId::new(3),
                MemberInfo::new(integration, "feed", true),
                "new release https://example.com/changelog",
            ),
        },
    );
    let outcome = pipeline.handle_message(&console, event).await;

    assert!(outcome.is_none());
    assert!(platform.has_message(ChannelId::new(3), MessageId::new(31)));
    assert!(platform.issued().is_empty());
    assert!(platform.records().is_empty());
}
