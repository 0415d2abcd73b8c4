//! Structural snapshots for the Warden moderation engine.
//!
//! A snapshot is the role and channel topology of a community. The
//! [`SnapshotManager`] captures one per community on a fixed interval,
//! keeps the latest in a copy-on-write [`SnapshotStore`], persists the whole
//! store as a single JSON document and recreates the captured structure on
//! demand.
//!
//! Restoration recreates equivalent structure as new entities. Permission
//! overwrites, category nesting and ordering are not captured.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod manager;
mod persistence;
mod store;

pub use config::SnapshotConfig;
pub use manager::{RestoreReport, SnapshotManager};
pub use persistence::{JsonSnapshotPersistence, SnapshotDocument};
pub use store::SnapshotStore;
