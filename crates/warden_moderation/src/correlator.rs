//! Actor resolution from the platform audit trail.

use chrono::{DateTime, TimeDelta, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use warden_core::{Attribution, AuditActionKind, CommunityId, Event, EventKind};
use warden_interface::AuditTrail;

/// Audit correlation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct AuditConfig {
    /// Oldest audit entry (relative to the event) still credited with it, in
    /// seconds. Zero disables the check.
    #[serde(default = "default_max_entry_age_secs")]
    max_entry_age_secs: u64,
}

fn default_max_entry_age_secs() -> u64 {
    60
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_entry_age_secs: default_max_entry_age_secs(),
        }
    }
}

/// Resolves "who caused this event" from the newest matching audit entry.
///
/// The audit trail is populated asynchronously and the query only looks at
/// the single most recent entry, so two mutations of the same kind landing
/// close together can be credited to the same actor. That race is accepted;
/// the subject and staleness checks narrow it down where they can.
pub struct AuditCorrelator {
    trail: Arc<dyn AuditTrail>,
    max_entry_age: Option<TimeDelta>,
}

impl std::fmt::Debug for AuditCorrelator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditCorrelator")
            .field("max_entry_age", &self.max_entry_age)
            .finish_non_exhaustive()
    }
}

impl AuditCorrelator {
    /// Correlator over `trail`.
    pub fn new(trail: Arc<dyn AuditTrail>, config: &AuditConfig) -> Self {
        let max_entry_age = match *config.max_entry_age_secs() {
            0 => None,
            secs => TimeDelta::try_seconds(i64::try_from(secs).unwrap_or(i64::MAX)),
        };
        Self {
            trail,
            max_entry_age,
        }
    }

    /// Actor credited with the newest `action` entry.
    ///
    /// `Unknown` when no entry exists, the query fails, the entry's target
    /// differs from `subject`, or the entry is older than the staleness bound
    /// relative to `occurred_at`. Never retries.
    #[instrument(skip(self, community, action), fields(community = %community, action = %action))]
    pub async fn resolve_actor(
        &self,
        community: CommunityId,
        action: AuditActionKind,
        subject: Option<u64>,
        occurred_at: DateTime<Utc>,
    ) -> Attribution {
        let entries = match self.trail.fetch_audit_entries(community, action, 1).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Attribution unavailable");
                return Attribution::Unknown;
            }
        };
        let Some(entry) = entries.into_iter().next() else {
            debug!("No audit entry");
            return Attribution::Unknown;
        };

        if let Some(subject) = subject
            && *entry.target() != Some(subject)
        {
            debug!(subject, target = ?entry.target(), "Audit entry targets another subject");
            return Attribution::Unknown;
        }

        if let Some(max_age) = self.max_entry_age {
            let age = occurred_at - *entry.occurred_at();
            if age > max_age {
                debug!(age_secs = age.num_seconds(), "Audit entry is stale");
                return Attribution::Unknown;
            }
        }

        debug!(actor = %entry.actor(), "Actor resolved");
        Attribution::Resolved(*entry.actor())
    }

    /// Attribution of a whole event.
    ///
    /// Posted and edited messages are credited to their author without a
    /// query. A deleted message with no matching audit entry was deleted by
    /// its author. Self-initiated events (human joins, voice moves) are
    /// credited to the member.
    #[instrument(skip(self, event), fields(community = %event.community(), kind = event.kind().label()))]
    pub async fn attribute(&self, event: &Event) -> Attribution {
        let kind = event.kind();
        match kind {
            EventKind::MessagePosted { message } => {
                return Attribution::Resolved(*message.author().id());
            }
            EventKind::MessageEdited { author, .. } => {
                return Attribution::Resolved(*author.id());
            }
            _ => {}
        }

        let Some(action) = kind.audit_action() else {
            return match kind {
                EventKind::MemberJoined { member } => Attribution::Resolved(*member.id()),
                EventKind::VoiceStateChanged { change } => {
                    Attribution::Resolved(*change.member().id())
                }
                _ => Attribution::Unknown,
            };
        };

        let attribution = self
            .resolve_actor(
                *event.community(),
                action,
                kind.audit_subject(),
                *event.occurred_at(),
            )
            .await;

        match (attribution, kind) {
            (Attribution::Unknown, EventKind::MessageDeleted { author: Some(author), .. }) => {
                debug!("No moderator entry, message deleted by its author");
                Attribution::Resolved(*author.id())
            }
            _ => attribution,
        }
    }
}
