//! Captured community structure.

use crate::CommunityId;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Channel kinds the snapshot model distinguishes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Text channel
    #[display("text")]
    Text,
    /// Voice channel
    #[display("voice")]
    Voice,
    /// Category container
    #[display("category")]
    Category,
    /// Announcement channel
    #[display("news")]
    News,
    /// Stage channel
    #[display("stage")]
    Stage,
    /// Forum channel
    #[display("forum")]
    Forum,
    /// Anything the engine does not know how to recreate
    #[display("unknown({})", _0)]
    Unknown(u8),
}

impl ChannelKind {
    /// Whether a restore can recreate channels of this kind.
    pub fn is_restorable(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

/// Role captured for restore.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct RoleDescriptor {
    name: String,
    permission_bits: u64,
}

impl RoleDescriptor {
    /// Describe a role.
    pub fn new(name: impl Into<String>, permission_bits: u64) -> Self {
        Self {
            name: name.into(),
            permission_bits,
        }
    }
}

/// Channel captured for restore.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct ChannelDescriptor {
    name: String,
    kind: ChannelKind,
}

impl ChannelDescriptor {
    /// Describe a channel.
    pub fn new(name: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Role and channel topology of one community at a point in time.
///
/// One descriptor is kept per community and replaced wholesale on every
/// capture. Channel hierarchy, ordering and permission overwrites are not
/// part of the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct SnapshotDescriptor {
    community: CommunityId,
    captured_at: DateTime<Utc>,
    roles: Vec<RoleDescriptor>,
    channels: Vec<ChannelDescriptor>,
}

impl SnapshotDescriptor {
    /// Assemble a descriptor.
    pub fn new(
        community: CommunityId,
        captured_at: DateTime<Utc>,
        roles: Vec<RoleDescriptor>,
        channels: Vec<ChannelDescriptor>,
    ) -> Self {
        Self {
            community,
            captured_at,
            roles,
            channels,
        }
    }
}
