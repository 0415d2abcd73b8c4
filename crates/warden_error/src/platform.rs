//! Errors returned by the chat platform when a command is issued.
//!
//! The enforcement executor inspects [`PlatformErrorKind`] to tell a real
//! failure apart from an idempotent no-op: banning an actor that is already
//! banned, or deleting a channel that no longer exists, is not an error from
//! the moderation engine's point of view.

/// Platform error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PlatformErrorKind {
    /// The bot lacks the rights to perform the command.
    #[display("Permission denied: {}", _0)]
    PermissionDenied(String),

    /// The requested state is already in effect (e.g. actor already banned).
    #[display("Already in effect: {}", _0)]
    AlreadyInEffect(String),

    /// The target entity does not exist (anymore).
    #[display("Not found: {}", _0)]
    NotFound(String),

    /// The platform rejected the request because of rate limiting.
    #[display("Rate limited: retry after {}s", retry_after_secs)]
    RateLimited {
        /// Seconds until the platform accepts requests again
        retry_after_secs: u64,
    },

    /// The command is not supported for this entity.
    #[display("Unsupported: {}", _0)]
    Unsupported(String),

    /// Any other API or transport failure.
    #[display("API error: {}", _0)]
    Api(String),
}

impl PlatformErrorKind {
    /// Whether the failure means the desired state already holds.
    pub fn is_already_in_effect(&self) -> bool {
        matches!(self, Self::AlreadyInEffect(_) | Self::NotFound(_))
    }
}

/// Platform error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Platform Error: {} at line {} in {}", kind, line, file)]
pub struct PlatformError {
    /// The kind of error that occurred
    pub kind: PlatformErrorKind,
    /// Line number where the error was created
    pub line: u32,
    /// File where the error was created
    pub file: &'static str,
}

impl PlatformError {
    /// Create a new platform error with automatic location tracking.
    ///
    /// # Examples
    ///
    /// ```
    /// use warden_error::{PlatformError, PlatformErrorKind};
    ///
    /// let err = PlatformError::new(PlatformErrorKind::PermissionDenied("ban".into()));
    /// assert!(format!("{}", err).contains("Permission denied"));
    /// ```
    #[track_caller]
    pub fn new(kind: PlatformErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PlatformErrorKind {
        &self.kind
    }
}

/// Result type for platform commands.
pub type PlatformResult<T> = Result<T, PlatformError>;

#[cfg(feature = "discord")]
impl From<serenity::Error> for PlatformError {
    #[track_caller]
    fn from(err: serenity::Error) -> Self {
        use serenity::http::HttpError;

        let kind = match &err {
            serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
                let message = response.error.message.clone();
                match response.status_code.as_u16() {
                    403 => PlatformErrorKind::PermissionDenied(message),
                    404 => PlatformErrorKind::NotFound(message),
                    429 => PlatformErrorKind::RateLimited { retry_after_secs: 1 },
                    _ => PlatformErrorKind::Api(err.to_string()),
                }
            }
            serenity::Error::Model(model_err) => {
                PlatformErrorKind::PermissionDenied(model_err.to_string())
            }
            _ => PlatformErrorKind::Api(err.to_string()),
        };
        PlatformError::new(kind)
    }
}
