//! Sliding-window message counters.

use chrono::{DateTime, TimeDelta, Utc};
use derive_getters::Getters;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, instrument};
use warden_core::ActorId;

/// Flood detection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct SpamConfig {
    /// Trailing window length in seconds
    #[serde(default = "default_window_secs")]
    window_secs: u64,

    /// Messages allowed inside the window before it counts as a flood
    #[serde(default = "default_max_messages")]
    max_messages: usize,
}

fn default_window_secs() -> u64 {
    5
}

fn default_max_messages() -> usize {
    5
}

impl Default for SpamConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_messages: default_max_messages(),
        }
    }
}

/// Appends between sweeps of idle actors.
const SWEEP_INTERVAL: usize = 256;

/// Per-actor ordered message timestamps.
///
/// Every append prunes timestamps that fell out of the trailing window, so a
/// window never holds entries older than `window` relative to the latest
/// append. Actors whose newest timestamp has left the window are dropped
/// every `SWEEP_INTERVAL` appends. Windows start empty at process start and
/// are never persisted.
#[derive(Debug)]
pub struct RateWindowTracker {
    window: TimeDelta,
    max_messages: usize,
    state: Mutex<Windows>,
}

#[derive(Debug, Default)]
struct Windows {
    by_actor: HashMap<ActorId, VecDeque<DateTime<Utc>>>,
    appends: usize,
}

impl RateWindowTracker {
    /// Tracker using `config`.
    pub fn new(config: &SpamConfig) -> Self {
        let secs = i64::try_from(*config.window_secs()).unwrap_or(i64::MAX);
        Self {
            window: TimeDelta::try_seconds(secs).unwrap_or(TimeDelta::MAX),
            max_messages: *config.max_messages(),
            state: Mutex::new(Windows::default()),
        }
    }

    /// Record a message by `actor` at `now` and report whether the actor is
    /// now over the limit.
    #[instrument(skip(self), fields(actor = %actor))]
    pub fn record_and_check(&self, actor: ActorId, now: DateTime<Utc>) -> bool {
        let mut state = self.state.lock();
        let timestamps = state.by_actor.entry(actor).or_default();
        timestamps.push_back(now);
        timestamps.retain(|t| now - *t < self.window);
        let count = timestamps.len();

        state.appends += 1;
        if state.appends >= SWEEP_INTERVAL {
            state.appends = 0;
            let window = self.window;
            state
                .by_actor
                .retain(|_, timestamps| timestamps.back().is_some_and(|t| now - *t < window));
        }
        drop(state);

        let flooding = count > self.max_messages;
        debug!(count, max = self.max_messages, flooding, "Rate window updated");
        flooding
    }

    /// Messages by `actor` inside the window ending at `now`.
    pub fn count(&self, actor: ActorId, now: DateTime<Utc>) -> usize {
        let mut state = self.state.lock();
        let Some(timestamps) = state.by_actor.get_mut(&actor) else {
            return 0;
        };
        timestamps.retain(|t| now - *t < self.window);
        let count = timestamps.len();
        if count == 0 {
            state.by_actor.remove(&actor);
        }
        count
    }

    /// Drop every actor with no timestamp inside the window ending at `now`.
    ///
    /// Returns the number of actors still tracked.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut state = self.state.lock();
        let window = self.window;
        state
            .by_actor
            .retain(|_, timestamps| timestamps.back().is_some_and(|t| now - *t < window));
        state.appends = 0;
        state.by_actor.len()
    }

    /// Actors currently holding a window.
    pub fn tracked_actors(&self) -> usize {
        self.state.lock().by_actor.len()
    }
}

impl Default for RateWindowTracker {
    fn default() -> Self {
        Self::new(&SpamConfig::default())
    }
}
