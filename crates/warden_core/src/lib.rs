//! Core data model for the Warden moderation engine.
//!
//! This crate holds the plain data that flows through a moderation run:
//! - **Identifiers**: snowflake newtypes for actors, communities, channels, roles, messages
//! - **Events**: immutable platform mutations delivered by the gateway
//! - **Audit entries**: the platform's record of who did what
//! - **Verdicts**: the policy decision and the remediation it implies
//! - **Reports**: per-action outcomes of enforcement and the decision record
//! - **Snapshots**: captured role/channel topology of a community
//!
//! Nothing in here performs I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod audit;
mod event;
mod ids;
mod record;
mod remediation;
mod report;
mod snapshot;

pub use audit::{AuditActionKind, AuditEntry};
pub use event::{
    ChannelInfo, Event, EventKind, MemberInfo, MessageInfo, RoleInfo, VoiceStateChange,
};
pub use ids::{ActorId, ChannelId, CommunityId, MessageId, RoleId};
pub use record::{Attribution, DecisionRecord, DecisionRecordBuilder};
pub use remediation::{Disposition, RemediationAction, RemediationPhase, Verdict};
pub use report::{ActionOutcome, ActionStatus, ExecutionReport};
pub use snapshot::{ChannelDescriptor, ChannelKind, RoleDescriptor, SnapshotDescriptor};
