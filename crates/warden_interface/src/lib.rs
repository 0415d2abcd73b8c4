//! Trait definitions for the Warden moderation engine.
//!
//! The moderation core never talks to the network directly. It consumes the
//! outbound commands of the chat platform through the traits defined here:
//! - `AuditTrail` - query the platform's audit log
//! - `ModerationPlatform` - revert mutations and sanction accounts
//! - `StructurePlatform` - enumerate and recreate roles and channels
//! - `NotificationSink` - publish decision records for human operators
//!
//! `InMemoryPlatform` implements all of them over a simulated community and
//! is used by the test suites and for dry runs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod memory;
mod traits;

pub use memory::{InMemoryPlatform, IssuedCommand};
pub use traits::{
    AuditTrail, ExistingRole, ModerationPlatform, NotificationSink, StructurePlatform,
};
