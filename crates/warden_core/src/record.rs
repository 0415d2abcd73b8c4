//! Decision records handed to the notification emitter.

use crate::{ActorId, CommunityId, Event, ExecutionReport, Verdict};
use chrono::{DateTime, Utc};
use derive_getters::Getters;

/// Result of actor resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Attribution {
    /// The audit trail (or the event itself) names the actor.
    #[display("{}", _0)]
    Resolved(ActorId),
    /// No trustworthy attribution was available.
    #[display("unknown")]
    Unknown,
}

impl Attribution {
    /// Resolved actor, if any.
    pub fn actor(&self) -> Option<ActorId> {
        match self {
            Self::Resolved(actor) => Some(*actor),
            Self::Unknown => None,
        }
    }

    /// True for `Unknown`.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl From<Option<ActorId>> for Attribution {
    fn from(actor: Option<ActorId>) -> Self {
        actor.map_or(Self::Unknown, Self::Resolved)
    }
}

/// Structured audit record of one pipeline run.
#[derive(Debug, Clone, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct DecisionRecord {
    community: CommunityId,
    event: Event,
    attribution: Attribution,
    verdict: Verdict,
    #[builder(default)]
    report: Option<ExecutionReport>,
    #[builder(default = "Utc::now()")]
    recorded_at: DateTime<Utc>,
}

impl DecisionRecord {
    /// Record stamped with the current time.
    pub fn new(
        event: Event,
        attribution: Attribution,
        verdict: Verdict,
        report: Option<ExecutionReport>,
    ) -> Self {
        Self {
            community: *event.community(),
            event,
            attribution,
            verdict,
            report,
            recorded_at: Utc::now(),
        }
    }

    /// Start building a record.
    pub fn builder() -> DecisionRecordBuilder {
        DecisionRecordBuilder::default()
    }
}
