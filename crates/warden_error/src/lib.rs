//! Error types for the Warden moderation engine.
//!
//! Every crate in the workspace reports failures through the types defined here.
//!
//! # Error Hierarchy
//!
//! Errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum names the specific condition
//! - `*Error` struct wraps the kind together with the source location
//! - Constructors use `#[track_caller]` so the location is captured automatically
//!
//! # Examples
//!
//! ```
//! use warden_error::{ConfigError, WardenResult};
//!
//! fn load_owner() -> WardenResult<u64> {
//!     Err(ConfigError::new("owner_id is not set"))?
//! }
//!
//! assert!(load_owner().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod command;
mod config;
mod error;
mod platform;
mod snapshot;
mod storage;

pub use command::{CommandError, CommandErrorKind};
pub use config::ConfigError;
pub use error::{WardenError, WardenErrorKind, WardenResult};
pub use platform::{PlatformError, PlatformErrorKind, PlatformResult};
pub use snapshot::{SnapshotError, SnapshotErrorKind};
pub use storage::{StorageError, StorageErrorKind};
