//! Configuration error types.

/// Configuration error with source location.
///
/// Raised when layered configuration cannot be read, merged or deserialized,
/// or when a required value (such as the owner id) is missing.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the caller's location.
    ///
    /// # Examples
    ///
    /// ```
    /// use warden_error::ConfigError;
    ///
    /// let err = ConfigError::new("Missing owner_id");
    /// assert!(err.message.contains("owner_id"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
