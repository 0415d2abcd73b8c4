//! Shared mutable moderation state.

use crate::{RateWindowTracker, SpamConfig, Whitelist};
use warden_core::ActorId;

/// Whitelist and rate windows of one process.
///
/// Passed around by `Arc`; each part guards itself with a short-lived
/// `parking_lot` lock, so no lock is ever held across a network call.
#[derive(Debug)]
pub struct ModerationState {
    whitelist: Whitelist,
    rate_windows: RateWindowTracker,
}

impl ModerationState {
    /// Fresh state seeded with `owner`.
    pub fn new(owner: ActorId, spam: &SpamConfig) -> Self {
        Self {
            whitelist: Whitelist::new(owner),
            rate_windows: RateWindowTracker::new(spam),
        }
    }

    /// Trusted actors.
    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    /// Message rate windows.
    pub fn rate_windows(&self) -> &RateWindowTracker {
        &self.rate_windows
    }
}
