//! Warden - anti-nuke moderation for Discord.
//!
//! Warden watches a guild for destructive mutations (channel and role
//! changes, privilege grants, bot additions, bans, spam), works out who did
//! it from the audit log, and reverts and sanctions anyone the owner has not
//! whitelisted. It also keeps a periodic snapshot of roles and channels that
//! the owner can restore from.
//!
//! # Architecture
//!
//! - `warden_error` - Error types
//! - `warden_core` - Events, verdicts, reports and snapshot descriptors
//! - `warden_interface` - Platform traits and an in-memory platform
//! - `warden_security` - Whitelist, rate windows, content rules, policy table
//! - `warden_moderation` - Audit correlation, enforcement, operator commands
//! - `warden_snapshot` - Snapshot capture, persistence and restore
//! - `warden_social` - Discord gateway adapter and REST commands
//!
//! This crate adds configuration, telemetry and wiring, and re-exports the
//! public API of the others.
//!
//! ```rust,ignore
//! let config = warden::WardenConfig::load()?;
//! warden::run(&config, &std::env::var("DISCORD_TOKEN")?).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod app;
mod config;
mod telemetry;

pub use app::{assemble, run};
pub use config::WardenConfig;
pub use telemetry::init_telemetry;

pub use warden_core::*;
pub use warden_error::*;
pub use warden_interface::*;
pub use warden_moderation::*;
pub use warden_security::*;
pub use warden_snapshot::*;
pub use warden_social::*;
