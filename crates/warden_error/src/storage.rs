//! Storage error types for the persisted snapshot document.

/// Kinds of storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to read the document
    #[display("Failed to read file: {}", _0)]
    FileRead(String),
    /// Failed to write the document
    #[display("Failed to write file: {}", _0)]
    FileWrite(String),
    /// Failed to encode the document
    #[display("Failed to serialize: {}", _0)]
    Serialize(String),
    /// Document on disk is malformed
    #[display("Failed to deserialize: {}", _0)]
    Deserialize(String),
}

/// Storage error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for StorageError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        let kind = if err.is_io() {
            StorageErrorKind::FileRead(err.to_string())
        } else {
            StorageErrorKind::Deserialize(err.to_string())
        };
        StorageError::new(kind)
    }
}
