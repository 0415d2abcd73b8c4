//! Table-driven authorization policy.

use crate::{ContentClassifier, MessageSignals, ModerationState};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};
use warden_core::{ActorId, Attribution, EventKind, MessageInfo, RemediationAction, Verdict};

/// Sanction durations applied by the policy table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct PolicyConfig {
    /// Timeout for posting a link (seconds)
    #[serde(default = "default_link_timeout_secs")]
    link_timeout_secs: u64,

    /// Timeout for a broadcast mention (seconds)
    #[serde(default = "default_mention_timeout_secs")]
    mention_timeout_secs: u64,

    /// Timeout for flooding (seconds)
    #[serde(default = "default_spam_timeout_secs")]
    spam_timeout_secs: u64,

    /// Timeout for a member who received roles from an untrusted actor (seconds)
    #[serde(default = "default_beneficiary_timeout_secs")]
    beneficiary_timeout_secs: u64,
}

fn default_link_timeout_secs() -> u64 {
    600
}

fn default_mention_timeout_secs() -> u64 {
    3_600
}

fn default_spam_timeout_secs() -> u64 {
    600
}

fn default_beneficiary_timeout_secs() -> u64 {
    86_400
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            link_timeout_secs: default_link_timeout_secs(),
            mention_timeout_secs: default_mention_timeout_secs(),
            spam_timeout_secs: default_spam_timeout_secs(),
            beneficiary_timeout_secs: default_beneficiary_timeout_secs(),
        }
    }
}

impl PolicyConfig {
    /// Link timeout.
    pub fn link_timeout(&self) -> Duration {
        Duration::from_secs(self.link_timeout_secs)
    }

    /// Broadcast mention timeout.
    pub fn mention_timeout(&self) -> Duration {
        Duration::from_secs(self.mention_timeout_secs)
    }

    /// Flood timeout.
    pub fn spam_timeout(&self) -> Duration {
        Duration::from_secs(self.spam_timeout_secs)
    }

    /// Beneficiary timeout after an unauthorized role grant.
    pub fn beneficiary_timeout(&self) -> Duration {
        Duration::from_secs(self.beneficiary_timeout_secs)
    }
}

/// Row of the policy table an event falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Channel created
    ChannelCreated,
    /// Channel deleted
    ChannelDeleted,
    /// Role created
    RoleCreated,
    /// Role deleted
    RoleDeleted,
    /// Role permissions or name changed
    RoleModified,
    /// Roles granted to a member
    RolesGranted,
    /// Account joined
    MemberJoined {
        /// Whether the account is a bot
        bot: bool,
    },
    /// Account banned
    BanIssued,
    /// Message posted, with the signals it tripped
    Message(MessageSignals),
    /// Log-only event
    Informational,
}

impl Trigger {
    /// Table row of `kind`. `signals` is used for posted messages only.
    pub fn from_event(kind: &EventKind, signals: MessageSignals) -> Self {
        match kind {
            EventKind::ChannelCreated { .. } => Self::ChannelCreated,
            EventKind::ChannelDeleted { .. } => Self::ChannelDeleted,
            EventKind::RoleCreated { .. } => Self::RoleCreated,
            EventKind::RoleDeleted { .. } => Self::RoleDeleted,
            EventKind::RoleModified { .. } => Self::RoleModified,
            EventKind::RolesGranted { .. } => Self::RolesGranted,
            EventKind::MemberJoined { member } => Self::MemberJoined {
                bot: *member.is_bot(),
            },
            EventKind::BanIssued { .. } => Self::BanIssued,
            EventKind::MessagePosted { .. } => Self::Message(signals),
            EventKind::MessageDeleted { .. }
            | EventKind::MessageEdited { .. }
            | EventKind::VoiceStateChanged { .. } => Self::Informational,
        }
    }

    /// Whether this row only ever logs.
    pub fn is_informational(&self) -> bool {
        match self {
            Self::Informational | Self::MemberJoined { bot: false } => true,
            Self::Message(signals) => signals.is_clean(),
            _ => false,
        }
    }
}

/// Maps (trigger, attribution, beneficiary) to a verdict.
///
/// Decisions depend only on the trigger, whether the actor is whitelisted,
/// whether a distinct beneficiary is present and the static [`PolicyConfig`].
/// Whitelist membership is checked against the actor, never the beneficiary.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    config: PolicyConfig,
    classifier: ContentClassifier,
    state: Arc<ModerationState>,
}

impl PolicyEngine {
    /// Engine over shared state.
    pub fn new(
        config: PolicyConfig,
        classifier: ContentClassifier,
        state: Arc<ModerationState>,
    ) -> Self {
        Self {
            config,
            classifier,
            state,
        }
    }

    /// Sanction durations in use.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Shared state the engine reads.
    pub fn state(&self) -> &Arc<ModerationState> {
        &self.state
    }

    /// Classify a posted message and count it against its author's window.
    #[instrument(skip(self, message), fields(author = %message.author().id()))]
    pub fn inspect_message(&self, message: &MessageInfo, at: DateTime<Utc>) -> MessageSignals {
        let mut signals = self.classifier.classify(message.content());
        signals.flood = self
            .state
            .rate_windows()
            .record_and_check(*message.author().id(), at);
        signals
    }

    /// Decide what to do about one event.
    #[instrument(skip(self, attribution), fields(actor = %attribution))]
    pub fn decide(
        &self,
        trigger: &Trigger,
        attribution: Attribution,
        beneficiary: Option<ActorId>,
    ) -> Verdict {
        if trigger.is_informational() {
            debug!("Informational event");
            return Verdict::observe();
        }
        let Some(actor) = attribution.actor() else {
            debug!("Actor unknown, not remediating");
            return Verdict::unattributed();
        };
        if self.state.whitelist().contains(actor) {
            debug!("Actor whitelisted");
            return Verdict::allow();
        }

        use RemediationAction::*;
        let verdict = match trigger {
            Trigger::ChannelCreated | Trigger::RoleCreated => {
                Verdict::violation([RevertMutation, BanActor])
            }
            Trigger::ChannelDeleted | Trigger::RoleDeleted | Trigger::RoleModified => {
                Verdict::violation([BanActor])
            }
            Trigger::RolesGranted if beneficiary == Some(actor) => {
                debug!("Self-granted roles");
                Verdict::allow()
            }
            Trigger::RolesGranted => Verdict::violation([
                BanActor,
                StripGrantedRoles,
                TimeoutBeneficiary(self.config.beneficiary_timeout()),
            ]),
            Trigger::MemberJoined { .. } => Verdict::violation([KickBeneficiary, BanActor]),
            Trigger::BanIssued => Verdict::violation([KickActor, StripAllRolesFromActor]),
            Trigger::Message(signals) => self.message_verdict(signals),
            Trigger::Informational => Verdict::observe(),
        };
        debug!(disposition = %verdict.disposition(), actions = verdict.remediation().len(), "Decided");
        verdict
    }

    fn message_verdict(&self, signals: &MessageSignals) -> Verdict {
        let mut actions = Vec::new();
        let mut timeout: Option<Duration> = None;
        let mut extend = |d: Duration| timeout = Some(timeout.map_or(d, |t| t.max(d)));

        if signals.link {
            actions.push(RemediationAction::DeleteMessage);
            extend(self.config.link_timeout());
        }
        if signals.flood {
            extend(self.config.spam_timeout());
        }
        if signals.broadcast_mention {
            actions.push(RemediationAction::DeleteMessage);
            extend(self.config.mention_timeout());
        }
        actions.extend(timeout.map(RemediationAction::TimeoutActor));
        Verdict::violation(actions)
    }
}
