//! Snapshot loop settings.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Capture interval and document location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct SnapshotConfig {
    /// Seconds between capture cycles
    #[serde(default = "default_interval_secs")]
    interval_secs: u64,

    /// Path of the persisted JSON document
    #[serde(default = "default_path")]
    path: PathBuf,
}

fn default_interval_secs() -> u64 {
    600
}

fn default_path() -> PathBuf {
    PathBuf::from("server_backup.json")
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            path: default_path(),
        }
    }
}

impl SnapshotConfig {
    /// Capture interval. Zero is clamped to one second.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}
