//! Discord integration for the Warden moderation engine.
//!
//! This crate is the only place that knows about Serenity. It provides:
//!
//! ## Inbound
//! - **handler**: [`WardenHandler`] turns gateway events into moderation events
//!   and routes operator commands to the console
//! - **conversions**: pure mappings between Serenity and Warden types
//! - **recent**: a bounded cache of recent messages, so deletions can be
//!   attributed to their author
//!
//! ## Outbound
//! - **platform**: [`DiscordPlatform`] implements the audit, moderation and
//!   structure traits over the REST client
//! - **notifier**: [`DiscordNotifier`] renders decision records as embeds in
//!   the security log channel
//!
//! ## Lifecycle
//! - **bot**: [`WardenBot`] builds and runs the Serenity client
//!
//! ```rust,ignore
//! let mut bot = WardenBot::new(&token, handler, 1000).await?;
//! bot.start().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bot;
mod conversions;
mod handler;
mod notifier;
mod platform;
mod recent;

pub use bot::WardenBot;
pub use conversions::{
    added_roles, audit_action, channel_kind, channel_type, server_flag_change, timestamp_of,
};
pub use handler::WardenHandler;
pub use notifier::{DiscordNotifier, LogEntry};
pub use platform::DiscordPlatform;
pub use recent::{CachedMessage, RecentMessages};
