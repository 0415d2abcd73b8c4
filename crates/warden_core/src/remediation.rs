//! Verdicts and the remediation actions they imply.

use std::collections::BTreeSet;
use std::time::Duration;

/// Execution phase of a remediation action.
///
/// The executor runs every revert before any cleanup and every cleanup before
/// any sanction, so reverted state is consistent before punitive side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RemediationPhase {
    /// Undo the mutation itself
    Revert,
    /// Tidy up state left behind by the mutation
    Cleanup,
    /// Punish the responsible accounts
    Sanction,
}

/// A corrective or punitive action.
///
/// Variants are declared in execution order, so the derived `Ord` sorts a set
/// of actions into the order the executor applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RemediationAction {
    /// Delete the created channel or role
    RevertMutation,
    /// Delete the offending message
    DeleteMessage,
    /// Remove the roles that were granted to the beneficiary
    StripGrantedRoles,
    /// Remove every role from the actor
    StripAllRolesFromActor,
    /// Kick the account that was added
    KickBeneficiary,
    /// Time out the account that received the mutation
    TimeoutBeneficiary(Duration),
    /// Ban the actor
    BanActor,
    /// Kick the actor
    KickActor,
    /// Time out the actor
    TimeoutActor(Duration),
}

impl RemediationAction {
    /// Phase this action runs in.
    pub fn phase(&self) -> RemediationPhase {
        match self {
            Self::RevertMutation | Self::DeleteMessage => RemediationPhase::Revert,
            Self::StripGrantedRoles | Self::StripAllRolesFromActor | Self::KickBeneficiary => {
                RemediationPhase::Cleanup
            }
            Self::TimeoutBeneficiary(_)
            | Self::BanActor
            | Self::KickActor
            | Self::TimeoutActor(_) => RemediationPhase::Sanction,
        }
    }

    /// Whether the action targets the beneficiary rather than the actor.
    pub fn targets_beneficiary(&self) -> bool {
        matches!(
            self,
            Self::StripGrantedRoles | Self::KickBeneficiary | Self::TimeoutBeneficiary(_)
        )
    }

    /// Short label for logs and notifications.
    pub fn label(&self) -> String {
        match self {
            Self::RevertMutation => "revert mutation".to_string(),
            Self::DeleteMessage => "delete message".to_string(),
            Self::StripGrantedRoles => "strip granted roles".to_string(),
            Self::StripAllRolesFromActor => "strip all roles from actor".to_string(),
            Self::KickBeneficiary => "kick beneficiary".to_string(),
            Self::TimeoutBeneficiary(d) => format!("timeout beneficiary {}s", d.as_secs()),
            Self::BanActor => "ban actor".to_string(),
            Self::KickActor => "kick actor".to_string(),
            Self::TimeoutActor(d) => format!("timeout actor {}s", d.as_secs()),
        }
    }
}

/// Outcome category of a policy decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Disposition {
    /// Actor is trusted; nothing to do.
    Authorized,
    /// Actor is not trusted; remediation applies.
    Violation,
    /// Actor could not be resolved; logged, never punished.
    Unattributed,
    /// Event is informational only.
    Observed,
}

/// Policy decision for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    disposition: Disposition,
    remediation: BTreeSet<RemediationAction>,
}

impl Verdict {
    /// Trusted actor, empty remediation.
    pub fn allow() -> Self {
        Self {
            disposition: Disposition::Authorized,
            remediation: BTreeSet::new(),
        }
    }

    /// Informational event, empty remediation.
    pub fn observe() -> Self {
        Self {
            disposition: Disposition::Observed,
            remediation: BTreeSet::new(),
        }
    }

    /// Unresolved actor, empty remediation.
    pub fn unattributed() -> Self {
        Self {
            disposition: Disposition::Unattributed,
            remediation: BTreeSet::new(),
        }
    }

    /// Violation with the given remediation.
    pub fn violation(remediation: impl IntoIterator<Item = RemediationAction>) -> Self {
        Self {
            disposition: Disposition::Violation,
            remediation: remediation.into_iter().collect(),
        }
    }

    /// Decision category.
    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    /// Actions to execute, in execution order.
    pub fn remediation(&self) -> &BTreeSet<RemediationAction> {
        &self.remediation
    }

    /// True when the event needs no enforcement because the actor is trusted
    /// or the event is informational.
    pub fn is_authorized(&self) -> bool {
        matches!(
            self.disposition,
            Disposition::Authorized | Disposition::Observed
        )
    }

    /// True when remediation must run.
    pub fn is_violation(&self) -> bool {
        self.disposition == Disposition::Violation
    }

    /// Whether the remediation set contains `action`.
    pub fn requires(&self, action: &RemediationAction) -> bool {
        self.remediation.contains(action)
    }
}
