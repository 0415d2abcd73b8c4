//! Moderation pipeline for the Warden engine.
//!
//! One event flows through four stages:
//!
//! 1. [`AuditCorrelator`] resolves the responsible actor from the audit trail
//! 2. `PolicyEngine` (from `warden_security`) decides on a verdict
//! 3. [`EnforcementExecutor`] reverts and sanctions, producing a report
//! 4. A `NotificationSink` receives the resulting decision record
//!
//! [`ModerationPipeline`] glues the stages together and dispatches each event
//! to its own task. [`OperatorConsole`] handles the owner's commands.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod console;
mod correlator;
mod executor;
mod pipeline;

pub use console::{CommandResponse, OperatorCommand, OperatorConsole};
pub use correlator::{AuditConfig, AuditCorrelator};
pub use executor::{EnforcementConfig, EnforcementContext, EnforcementExecutor, RevertTarget};
pub use pipeline::{MessageOutcome, ModerationPipeline};
