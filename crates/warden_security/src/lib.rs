//! Authorization layers for the Warden moderation engine.
//!
//! This crate decides whether an attributed mutation is acceptable. It
//! consists of four layers:
//!
//! 1. **Whitelist** - trusted actors, seeded with the owner
//! 2. **Rate windows** - per-actor sliding-window message counters
//! 3. **Content classification** - link and broadcast mention detection
//! 4. **Policy engine** - table-driven mapping from trigger to remediation
//!
//! Mutable state (whitelist, rate windows) lives in [`ModerationState`],
//! which is shared by `Arc` between the pipeline and the operator console.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod content;
mod policy;
mod rate_window;
mod state;
mod whitelist;

pub use content::{ContentClassifier, MessageSignals};
pub use policy::{PolicyConfig, PolicyEngine, Trigger};
pub use rate_window::{RateWindowTracker, SpamConfig};
pub use state::ModerationState;
pub use whitelist::Whitelist;
