//! Structural snapshot error types.

/// Snapshot error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SnapshotErrorKind {
    /// Restore requested for a community that was never captured.
    #[display("No snapshot captured for community {}", _0)]
    Unavailable(u64),

    /// Enumerating the community structure failed.
    #[display("Capture failed for community {}: {}", community, reason)]
    CaptureFailed {
        /// Community being captured
        community: u64,
        /// Underlying failure
        reason: String,
    },
}

/// Snapshot error with location tracking.
///
/// # Examples
///
/// ```
/// use warden_error::{SnapshotError, SnapshotErrorKind};
///
/// let err = SnapshotError::new(SnapshotErrorKind::Unavailable(42));
/// assert!(format!("{}", err).contains("No snapshot"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Snapshot Error: {} at line {} in {}", kind, line, file)]
pub struct SnapshotError {
    /// The kind of error that occurred
    pub kind: SnapshotErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SnapshotError {
    /// Create a new snapshot error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SnapshotErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
