//! Top-level error wrapper types.

use crate::{CommandError, ConfigError, PlatformError, SnapshotError, StorageError};

/// Every error the workspace can surface to a caller.
///
/// # Examples
///
/// ```
/// use warden_error::{WardenError, ConfigError};
///
/// let err: WardenError = ConfigError::new("bad interval").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum WardenErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Chat platform command error
    #[from(PlatformError)]
    Platform(PlatformError),
    /// Structural snapshot error
    #[from(SnapshotError)]
    Snapshot(SnapshotError),
    /// Snapshot document storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Operator command error
    #[from(CommandError)]
    Command(CommandError),
}

/// Warden error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Warden Error: {}", _0)]
pub struct WardenError(Box<WardenErrorKind>);

impl WardenError {
    /// Create a new error from a kind.
    pub fn new(kind: WardenErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &WardenErrorKind {
        &self.0
    }
}

impl<T> From<T> for WardenError
where
    T: Into<WardenErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Warden operations.
pub type WardenResult<T> = std::result::Result<T, WardenError>;
