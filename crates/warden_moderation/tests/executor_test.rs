//! Enforcement execution.

use std::sync::Arc;
use std::time::Duration;
use warden_core::{
    ActionStatus, ActorId, ChannelId, ChannelInfo, ChannelKind, CommunityId, MessageId,
    RemediationAction, RoleId, Verdict,
};
use warden_error::PlatformErrorKind;
use warden_interface::{InMemoryPlatform, IssuedCommand};
use warden_moderation::{EnforcementConfig, EnforcementContext, EnforcementExecutor, RevertTarget};

const GUILD: CommunityId = CommunityId::new(10);
const ACTOR: ActorId = ActorId::new(66);
const MEMBER: ActorId = ActorId::new(7);

fn executor(platform: &Arc<InMemoryPlatform>) -> EnforcementExecutor {
    EnforcementExecutor::new(platform.clone(), EnforcementConfig::default())
}

#[tokio::test]
async fn test_actions_run_in_phase_order() {
    let platform = Arc::new(InMemoryPlatform::new());
    platform.add_member(GUILD, ACTOR);
    platform.add_member(GUILD, MEMBER);
    platform.grant_role(GUILD, MEMBER, RoleId::new(5));

    let verdict = Verdict::violation([
        RemediationAction::TimeoutBeneficiary(Duration::from_secs(86_400)),
        RemediationAction::BanActor,
        RemediationAction::StripGrantedRoles,
    ]);
    let context = EnforcementContext::new(GUILD, "test")
        .with_actor(ACTOR)
        .with_beneficiary(MEMBER)
        .with_granted_roles(vec![RoleId::new(5)]);

    let report = executor(&platform).apply(&verdict, &context).await;

    assert!(report.is_complete());
    assert_eq!(
        platform.issued(),
        vec![
            IssuedCommand::RemoveRoles(MEMBER, vec![RoleId::new(5)]),
            IssuedCommand::Timeout(MEMBER, Duration::from_secs(86_400)),
            IssuedCommand::Ban(ACTOR),
        ]
    );
    assert!(platform.member_roles(GUILD, MEMBER).is_empty());
}

#[tokio::test]
async fn test_failure_does_not_abort_later_actions() {
    let platform = Arc::new(InMemoryPlatform::new());
    platform.add_member(GUILD, ACTOR);
    platform.add_channel(
        GUILD,
        ChannelInfo::new(ChannelId::new(9), "raid", ChannelKind::Text),
    );
    platform.deny_command("delete_channel");

    let verdict = Verdict::violation([RemediationAction::RevertMutation, RemediationAction::BanActor]);
    let context = EnforcementContext::new(GUILD, "test")
        .with_actor(ACTOR)
        .with_revert_target(RevertTarget::Channel(ChannelId::new(9)));

    let report = executor(&platform).apply(&verdict, &context).await;

    assert!(!report.is_complete());
    assert!(
        report
            .status_of(&RemediationAction::RevertMutation)
            .unwrap()
            .is_permission_denied()
    );
    assert_eq!(
        report.status_of(&RemediationAction::BanActor),
        Some(&ActionStatus::Applied)
    );
    assert!(platform.is_banned(GUILD, ACTOR));
    assert_eq!(report.failures().count(), 1);
}

#[tokio::test]
async fn test_already_gone_counts_as_in_effect() {
    let platform = Arc::new(InMemoryPlatform::new());
    platform.add_member(GUILD, ACTOR);

    let verdict = Verdict::violation([RemediationAction::RevertMutation, RemediationAction::BanActor]);
    let context = EnforcementContext::new(GUILD, "test")
        .with_actor(ACTOR)
        .with_revert_target(RevertTarget::Role(RoleId::new(404)));

    let executor = executor(&platform);
    let first = executor.apply(&verdict, &context).await;
    let second = executor.apply(&verdict, &context).await;

    assert_eq!(
        first.status_of(&RemediationAction::RevertMutation),
        Some(&ActionStatus::AlreadyInEffect)
    );
    assert_eq!(
        second.status_of(&RemediationAction::BanActor),
        Some(&ActionStatus::AlreadyInEffect)
    );
    assert!(first.is_complete());
    assert!(second.is_complete());
}

#[tokio::test]
async fn test_missing_context_skips() {
    let platform = Arc::new(InMemoryPlatform::new());
    platform.add_member(GUILD, ACTOR);

    let verdict = Verdict::violation([
        RemediationAction::DeleteMessage,
        RemediationAction::KickBeneficiary,
        RemediationAction::BanActor,
    ]);
    let context = EnforcementContext::new(GUILD, "test").with_actor(ACTOR);

    let report = executor(&platform).apply(&verdict, &context).await;

    assert!(matches!(
        report.status_of(&RemediationAction::DeleteMessage),
        Some(ActionStatus::Skipped(_))
    ));
    assert!(matches!(
        report.status_of(&RemediationAction::KickBeneficiary),
        Some(ActionStatus::Skipped(_))
    ));
    assert_eq!(
        report.status_of(&RemediationAction::BanActor),
        Some(&ActionStatus::Applied)
    );
    assert_eq!(report.len(), 3);
}

#[tokio::test]
async fn test_protected_actor_failure_reported() {
    let platform = Arc::new(InMemoryPlatform::new());
    platform.add_member(GUILD, ACTOR);
    platform.protect(ACTOR);
    platform.add_message(ChannelId::new(1), MessageId::new(2));

    let verdict = Verdict::violation([
        RemediationAction::DeleteMessage,
        RemediationAction::TimeoutActor(Duration::from_secs(600)),
    ]);
    let context = EnforcementContext::new(GUILD, "test")
        .with_actor(ACTOR)
        .with_message(ChannelId::new(1), MessageId::new(2));

    let report = executor(&platform).apply(&verdict, &context).await;

    assert_eq!(
        report.status_of(&RemediationAction::DeleteMessage),
        Some(&ActionStatus::Applied)
    );
    assert!(matches!(
        report.status_of(&RemediationAction::TimeoutActor(Duration::from_secs(600))),
        Some(ActionStatus::Failed(PlatformErrorKind::PermissionDenied(_)))
    ));
    assert!(!platform.has_message(ChannelId::new(1), MessageId::new(2)));
}

#[tokio::test]
async fn test_notify_before_ban() {
    let platform = Arc::new(InMemoryPlatform::new());
    platform.add_member(GUILD, ACTOR);
    let executor = EnforcementExecutor::new(
        platform.clone(),
        EnforcementConfig::default().with_notify_before_ban(true),
    );

    let verdict = Verdict::violation([RemediationAction::BanActor]);
    let context = EnforcementContext::new(GUILD, "test").with_actor(ACTOR);
    executor.apply(&verdict, &context).await;

    assert_eq!(
        platform.issued(),
        vec![IssuedCommand::Notify(ACTOR), IssuedCommand::Ban(ACTOR)]
    );
}

#[tokio::test]
async fn test_failed_notice_does_not_block_ban() {
    let platform = Arc::new(InMemoryPlatform::new());
    platform.add_member(GUILD, ACTOR);
    platform.deny_command("notify_actor");
    let executor = EnforcementExecutor::new(
        platform.clone(),
        EnforcementConfig::default().with_notify_before_ban(true),
    );

    let verdict = Verdict::violation([RemediationAction::BanActor]);
    let context = EnforcementContext::new(GUILD, "test").with_actor(ACTOR);
    let report = executor.apply(&verdict, &context).await;

    assert!(report.is_complete());
    assert!(platform.is_banned(GUILD, ACTOR));
}
