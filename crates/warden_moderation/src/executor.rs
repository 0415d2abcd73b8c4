//! Remediation with partial-failure semantics.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use warden_core::{
    ActionStatus, ActorId, Attribution, ChannelId, CommunityId, Event, EventKind, ExecutionReport,
    MessageId, RemediationAction, RoleId, Verdict,
};
use warden_error::PlatformResult;
use warden_interface::ModerationPlatform;

/// Enforcement settings.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct EnforcementConfig {
    /// Send the actor a direct message before banning them
    #[serde(default)]
    notify_before_ban: bool,

    /// Days of the banned actor's message history the platform deletes (0-7)
    #[serde(default)]
    delete_message_days: u8,
}

/// Entity a `RevertMutation` deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevertTarget {
    /// Created channel
    Channel(ChannelId),
    /// Created role
    Role(RoleId),
}

/// Everything the executor may need to carry out a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct EnforcementContext {
    community: CommunityId,
    actor: Option<ActorId>,
    beneficiary: Option<ActorId>,
    revert_target: Option<RevertTarget>,
    granted_roles: Vec<RoleId>,
    message: Option<(ChannelId, MessageId)>,
    reason: String,
}

impl EnforcementContext {
    /// Context with only the community and reason filled in.
    pub fn new(community: CommunityId, reason: impl Into<String>) -> Self {
        Self {
            community,
            actor: None,
            beneficiary: None,
            revert_target: None,
            granted_roles: Vec::new(),
            message: None,
            reason: reason.into(),
        }
    }

    /// Context derived from an event and its attribution.
    pub fn from_event(event: &Event, attribution: Attribution) -> Self {
        let kind = event.kind();
        let mut context = Self::new(
            *event.community(),
            format!("Warden: unauthorized {}", kind.label().replace('_', " ")),
        );
        context.actor = attribution.actor();
        context.beneficiary = kind.beneficiary().map(|m| *m.id());
        match kind {
            EventKind::ChannelCreated { channel } => {
                context.revert_target = Some(RevertTarget::Channel(*channel.id()));
            }
            EventKind::RoleCreated { role } => {
                context.revert_target = Some(RevertTarget::Role(*role.id()));
            }
            EventKind::RolesGranted { added_roles, .. } => {
                context.granted_roles = added_roles.iter().map(|r| *r.id()).collect();
            }
            EventKind::MessagePosted { message } => {
                context.message = Some((*message.channel(), *message.id()));
            }
            _ => {}
        }
        context
    }

    /// Set the actor.
    pub fn with_actor(mut self, actor: ActorId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Set the beneficiary.
    pub fn with_beneficiary(mut self, beneficiary: ActorId) -> Self {
        self.beneficiary = Some(beneficiary);
        self
    }

    /// Set the entity to revert.
    pub fn with_revert_target(mut self, target: RevertTarget) -> Self {
        self.revert_target = Some(target);
        self
    }

    /// Set the roles that were granted.
    pub fn with_granted_roles(mut self, roles: Vec<RoleId>) -> Self {
        self.granted_roles = roles;
        self
    }

    /// Set the offending message.
    pub fn with_message(mut self, channel: ChannelId, message: MessageId) -> Self {
        self.message = Some((channel, message));
        self
    }
}

/// Carries out the remediation of a verdict.
///
/// Actions run in phase order (revert, cleanup, sanction). Each is attempted
/// independently: a failure is recorded and never aborts the actions after
/// it. There are no retries and no deduplication across runs.
pub struct EnforcementExecutor {
    platform: Arc<dyn ModerationPlatform>,
    config: EnforcementConfig,
}

impl std::fmt::Debug for EnforcementExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnforcementExecutor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EnforcementExecutor {
    /// Executor issuing commands to `platform`.
    pub fn new(platform: Arc<dyn ModerationPlatform>, config: EnforcementConfig) -> Self {
        Self { platform, config }
    }

    /// Apply every action of `verdict` and report each outcome.
    #[instrument(skip(self, verdict, context), fields(community = %context.community(), actions = verdict.remediation().len()))]
    pub async fn apply(&self, verdict: &Verdict, context: &EnforcementContext) -> ExecutionReport {
        let mut report = ExecutionReport::new();
        // BTreeSet iteration follows declaration order, which is phase order.
        for action in verdict.remediation() {
            let status = self.execute(*action, context).await;
            match &status {
                ActionStatus::Applied => info!(action = %action.label(), "Action applied"),
                ActionStatus::AlreadyInEffect => {
                    debug!(action = %action.label(), "Action already in effect")
                }
                ActionStatus::Failed(kind) => {
                    warn!(action = %action.label(), error = %kind, "Action failed")
                }
                ActionStatus::Skipped(reason) => {
                    debug!(action = %action.label(), reason = %reason, "Action skipped")
                }
            }
            report.record(*action, status);
        }
        info!(
            attempted = report.len(),
            complete = report.is_complete(),
            "Enforcement finished"
        );
        report
    }

    async fn execute(&self, action: RemediationAction, context: &EnforcementContext) -> ActionStatus {
        let community = context.community;
        let reason = context.reason.as_str();
        let platform = &self.platform;

        let result = match action {
            RemediationAction::RevertMutation => match context.revert_target {
                Some(RevertTarget::Channel(channel)) => {
                    platform.delete_channel(community, channel, reason).await
                }
                Some(RevertTarget::Role(role)) => platform.delete_role(community, role, reason).await,
                None => return ActionStatus::Skipped("nothing to revert".to_string()),
            },
            RemediationAction::DeleteMessage => match context.message {
                Some((channel, message)) => platform.delete_message(channel, message, reason).await,
                None => return ActionStatus::Skipped("no message".to_string()),
            },
            RemediationAction::StripGrantedRoles => {
                let Some(member) = context.beneficiary else {
                    return ActionStatus::Skipped("no beneficiary".to_string());
                };
                if context.granted_roles.is_empty() {
                    return ActionStatus::Skipped("no granted roles".to_string());
                }
                platform
                    .remove_roles(community, member, &context.granted_roles, reason)
                    .await
            }
            RemediationAction::StripAllRolesFromActor => match context.actor {
                Some(actor) => platform.strip_all_roles(community, actor, reason).await,
                None => return ActionStatus::Skipped("no actor".to_string()),
            },
            RemediationAction::KickBeneficiary => match context.beneficiary {
                Some(member) => platform.kick_actor(community, member, reason).await,
                None => return ActionStatus::Skipped("no beneficiary".to_string()),
            },
            RemediationAction::TimeoutBeneficiary(duration) => match context.beneficiary {
                Some(member) => {
                    platform
                        .timeout_actor(community, member, duration, reason)
                        .await
                }
                None => return ActionStatus::Skipped("no beneficiary".to_string()),
            },
            RemediationAction::BanActor => match context.actor {
                Some(actor) => self.ban(community, actor, reason).await,
                None => return ActionStatus::Skipped("no actor".to_string()),
            },
            RemediationAction::KickActor => match context.actor {
                Some(actor) => platform.kick_actor(community, actor, reason).await,
                None => return ActionStatus::Skipped("no actor".to_string()),
            },
            RemediationAction::TimeoutActor(duration) => match context.actor {
                Some(actor) => {
                    platform
                        .timeout_actor(community, actor, duration, reason)
                        .await
                }
                None => return ActionStatus::Skipped("no actor".to_string()),
            },
        };

        match result {
            Ok(()) => ActionStatus::Applied,
            Err(e) if e.kind().is_already_in_effect() => ActionStatus::AlreadyInEffect,
            Err(e) => ActionStatus::Failed(e.kind),
        }
    }

    async fn ban(&self, community: CommunityId, actor: ActorId, reason: &str) -> PlatformResult<()> {
        if self.config.notify_before_ban
            && let Err(e) = self.platform.notify_actor(community, actor, reason).await
        {
            debug!(error = %e, "Ban notice not delivered");
        }
        self.platform.ban_actor(community, actor, reason).await
    }
}
