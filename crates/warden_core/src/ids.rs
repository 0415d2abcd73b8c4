//! Snowflake identifier newtypes.
//!
//! Each platform entity gets its own type so an actor id can never be passed
//! where a role id is expected.

use serde::{Deserialize, Serialize};

/// Account credited with causing a mutation (user or bot).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
#[display("{}", _0)]
pub struct ActorId(u64);

impl ActorId {
    /// Wrap a raw snowflake.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw snowflake value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A moderated community (guild).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
#[display("{}", _0)]
pub struct CommunityId(u64);

impl CommunityId {
    /// Wrap a raw snowflake.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw snowflake value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A channel inside a community.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
#[display("{}", _0)]
pub struct ChannelId(u64);

impl ChannelId {
    /// Wrap a raw snowflake.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw snowflake value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A role inside a community.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
#[display("{}", _0)]
pub struct RoleId(u64);

impl RoleId {
    /// Wrap a raw snowflake.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw snowflake value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A message inside a channel.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
#[display("{}", _0)]
pub struct MessageId(u64);

impl MessageId {
    /// Wrap a raw snowflake.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw snowflake value.
    pub const fn get(self) -> u64 {
        self.0
    }
}
