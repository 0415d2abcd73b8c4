//! Operator command error types.

/// Operator command error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum CommandErrorKind {
    /// Invoker is not the configured owner.
    #[display("User {} is not authorized to use '{}'", invoker, command)]
    Unauthorized {
        /// Account that issued the command
        invoker: u64,
        /// Command that was rejected
        command: String,
    },

    /// Command name not recognized.
    #[display("Unknown command: {}", _0)]
    UnknownCommand(String),

    /// Required argument missing.
    #[display("Missing required argument '{}' for command '{}'", arg_name, command)]
    MissingArgument {
        /// Command being parsed
        command: String,
        /// Name of the missing argument
        arg_name: String,
    },

    /// Argument present but unusable.
    #[display("Invalid argument '{}' for command '{}': {}", arg_name, command, reason)]
    InvalidArgument {
        /// Command being parsed
        command: String,
        /// Name of the offending argument
        arg_name: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Attempt to remove the owner or a system identity from the whitelist.
    #[display("Identity {} is protected and cannot be removed", _0)]
    ProtectedIdentity(u64),
}

/// Operator command error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Command Error: {} at line {} in {}", kind, line, file)]
pub struct CommandError {
    /// The specific error kind
    pub kind: CommandErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl CommandError {
    /// Create a new command error with location tracking.
    #[track_caller]
    pub fn new(kind: CommandErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CommandErrorKind {
        &self.kind
    }
}
