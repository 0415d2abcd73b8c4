//! Audit trail entries.

use crate::ActorId;
use chrono::{DateTime, Utc};
use derive_getters::Getters;

/// Audit action kinds the correlator can query for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AuditActionKind {
    /// Channel created
    ChannelCreate,
    /// Channel deleted
    ChannelDelete,
    /// Role created
    RoleCreate,
    /// Role permissions or name changed
    RoleUpdate,
    /// Role deleted
    RoleDelete,
    /// Roles added to or removed from a member
    MemberRoleUpdate,
    /// Member moderated (server mute, deafen, nickname)
    MemberUpdate,
    /// Bot account added
    BotAdd,
    /// Member banned
    BanAdd,
    /// Message deleted by someone other than its author
    MessageDelete,
}

/// One entry of the platform audit trail.
///
/// Entries are fetched per event and never cached; the trail is populated
/// asynchronously, so the newest entry may lag the event that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct AuditEntry {
    actor: ActorId,
    action: AuditActionKind,
    target: Option<u64>,
    occurred_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Create an audit entry.
    pub fn new(
        actor: ActorId,
        action: AuditActionKind,
        target: Option<u64>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            actor,
            action,
            target,
            occurred_at,
        }
    }
}
