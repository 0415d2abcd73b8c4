//! Per-action outcomes of an enforcement run.

use crate::RemediationAction;
use warden_error::PlatformErrorKind;

/// What happened when one remediation action was attempted.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ActionStatus {
    /// The platform carried out the command.
    #[display("applied")]
    Applied,
    /// The desired state already held; treated as success.
    #[display("already in effect")]
    AlreadyInEffect,
    /// The platform refused or the call failed.
    #[display("failed: {}", _0)]
    Failed(PlatformErrorKind),
    /// The action could not be attempted with the available context.
    #[display("skipped: {}", _0)]
    Skipped(String),
}

impl ActionStatus {
    /// Applied or already in effect.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Applied | Self::AlreadyInEffect)
    }

    /// Failed because the bot lacks rights.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Failed(PlatformErrorKind::PermissionDenied(_)))
    }
}

/// One line of an [`ExecutionReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Action attempted
    pub action: RemediationAction,
    /// Result
    pub status: ActionStatus,
}

/// Ordered outcomes of every action in a verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    outcomes: Vec<ActionOutcome>,
}

impl ExecutionReport {
    /// Empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of an action.
    pub fn record(&mut self, action: RemediationAction, status: ActionStatus) {
        self.outcomes.push(ActionOutcome { action, status });
    }

    /// Outcomes in execution order.
    pub fn outcomes(&self) -> &[ActionOutcome] {
        &self.outcomes
    }

    /// Status of `action`, if it was attempted.
    pub fn status_of(&self, action: &RemediationAction) -> Option<&ActionStatus> {
        self.outcomes
            .iter()
            .find(|o| &o.action == action)
            .map(|o| &o.status)
    }

    /// Whether every attempted action succeeded.
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_success())
    }

    /// Outcomes that did not succeed.
    pub fn failures(&self) -> impl Iterator<Item = &ActionOutcome> {
        self.outcomes.iter().filter(|o| !o.status.is_success())
    }

    /// Number of attempted actions.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// True when nothing was attempted.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
