//! Owner-restricted operator commands.

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use warden_core::{ActorId, CommunityId};
use warden_error::{CommandError, CommandErrorKind, WardenResult};
use warden_interface::NotificationSink;
use warden_security::ModerationState;
use warden_snapshot::SnapshotManager;

/// A parsed operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorCommand {
    /// Trust an actor
    Whitelist(ActorId),
    /// Stop trusting an actor
    WhitelistRemove(ActorId),
    /// List trusted actors
    WhitelistShow,
    /// Show effective settings
    Settings,
    /// Recreate the captured structure
    Restore,
}

impl OperatorCommand {
    /// Parse `content` if it starts with `prefix`.
    ///
    /// Returns `None` for messages that are not commands at all. User
    /// arguments accept a mention (`<@id>`, `<@!id>`) or a raw id.
    pub fn parse(prefix: &str, content: &str) -> Option<Result<Self, CommandError>> {
        let body = content.trim().strip_prefix(prefix)?;
        let mut words = body.split_whitespace();
        let name = words.next()?;
        let arg = words.next();

        let command = match name {
            "whitelist" => parse_user(name, arg).map(Self::Whitelist),
            "whitelist_remove" | "unwhitelist" => parse_user(name, arg).map(Self::WhitelistRemove),
            "whitelist_show" | "check_whitelist" => Ok(Self::WhitelistShow),
            "settings" => Ok(Self::Settings),
            "restore" => Ok(Self::Restore),
            other => Err(CommandError::new(CommandErrorKind::UnknownCommand(
                other.to_string(),
            ))),
        };
        Some(command)
    }

    /// Canonical command name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Whitelist(_) => "whitelist",
            Self::WhitelistRemove(_) => "whitelist_remove",
            Self::WhitelistShow => "whitelist_show",
            Self::Settings => "settings",
            Self::Restore => "restore",
        }
    }
}

fn parse_user(command: &str, arg: Option<&str>) -> Result<ActorId, CommandError> {
    let Some(arg) = arg else {
        return Err(CommandError::new(CommandErrorKind::MissingArgument {
            command: command.to_string(),
            arg_name: "user".to_string(),
        }));
    };
    let raw = arg
        .strip_prefix("<@")
        .and_then(|s| s.strip_suffix('>'))
        .map(|s| s.trim_start_matches('!'))
        .unwrap_or(arg);
    raw.parse::<u64>().map(ActorId::new).map_err(|e| {
        CommandError::new(CommandErrorKind::InvalidArgument {
            command: command.to_string(),
            arg_name: "user".to_string(),
            reason: e.to_string(),
        })
    })
}

/// Reply to an operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    /// Headline
    pub title: String,
    /// Detail lines
    pub lines: Vec<String>,
    /// Whether the command succeeded
    pub success: bool,
}

impl CommandResponse {
    fn ok(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
            success: true,
        }
    }

    fn rejected(title: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: vec![reason.into()],
            success: false,
        }
    }
}

impl std::fmt::Display for CommandResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "**{}**", self.title)?;
        for line in &self.lines {
            write!(f, "\n{}", line)?;
        }
        Ok(())
    }
}

/// Executes operator commands on behalf of the owner.
pub struct OperatorConsole {
    prefix: String,
    state: Arc<ModerationState>,
    snapshots: Arc<SnapshotManager>,
    sink: Arc<dyn NotificationSink>,
    settings: Vec<(String, String)>,
}

impl std::fmt::Debug for OperatorConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorConsole")
            .field("prefix", &self.prefix)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl OperatorConsole {
    /// Console answering to commands starting with `prefix`.
    pub fn new(
        prefix: impl Into<String>,
        state: Arc<ModerationState>,
        snapshots: Arc<SnapshotManager>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            state,
            snapshots,
            sink,
            settings: Vec::new(),
        }
    }

    /// Settings listed by the `settings` command.
    pub fn with_settings(mut self, settings: Vec<(String, String)>) -> Self {
        self.settings = settings;
        self
    }

    /// Command prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Parse and run `content` if it is a command.
    ///
    /// Errors are rendered into a rejected response. Unknown command names
    /// yield `None`, since other bots may share the prefix.
    #[instrument(skip(self, content), fields(community = %community, invoker = %invoker))]
    pub async fn handle_message(
        &self,
        community: CommunityId,
        invoker: ActorId,
        content: &str,
    ) -> Option<CommandResponse> {
        let command = match OperatorCommand::parse(&self.prefix, content)? {
            Ok(command) => command,
            Err(e) if matches!(e.kind(), CommandErrorKind::UnknownCommand(_)) => {
                debug!(error = %e, "Ignoring unknown command");
                return None;
            }
            Err(e) => return Some(CommandResponse::rejected("Invalid command", e.kind().to_string())),
        };

        match self.execute(community, invoker, command).await {
            Ok(response) => Some(response),
            Err(e) => {
                warn!(error = %e, command = command.name(), "Command rejected");
                Some(CommandResponse::rejected(
                    format!("{} failed", command.name()),
                    e.kind().to_string(),
                ))
            }
        }
    }

    /// Run a parsed command issued by `invoker`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `invoker` is the owner, `ProtectedIdentity` when
    /// removing the owner or a system identity, and snapshot errors from
    /// `restore`.
    #[instrument(skip(self), fields(community = %community, invoker = %invoker, command = command.name()))]
    pub async fn execute(
        &self,
        community: CommunityId,
        invoker: ActorId,
        command: OperatorCommand,
    ) -> WardenResult<CommandResponse> {
        let whitelist = self.state.whitelist();
        if !whitelist.is_owner(invoker) {
            return Err(CommandError::new(CommandErrorKind::Unauthorized {
                invoker: invoker.get(),
                command: command.name().to_string(),
            })
            .into());
        }

        let response = match command {
            OperatorCommand::Whitelist(actor) => {
                let added = whitelist.add(actor);
                if added {
                    self.announce(community, "User whitelisted", invoker, actor).await;
                }
                let line = if added {
                    format!("{} can now perform administrative actions", actor)
                } else {
                    format!("{} was already whitelisted", actor)
                };
                CommandResponse::ok("Whitelist updated", vec![line])
            }
            OperatorCommand::WhitelistRemove(actor) => {
                let removed = whitelist.remove(actor)?;
                if removed {
                    self.announce(community, "User removed from whitelist", invoker, actor)
                        .await;
                }
                let line = if removed {
                    format!("{} is no longer trusted", actor)
                } else {
                    format!("{} was not whitelisted", actor)
                };
                CommandResponse::ok("Whitelist updated", vec![line])
            }
            OperatorCommand::WhitelistShow => {
                let lines = whitelist
                    .members()
                    .into_iter()
                    .map(|actor| {
                        if whitelist.is_owner(actor) {
                            format!("{} (owner)", actor)
                        } else if whitelist.is_protected(actor) {
                            format!("{} (system)", actor)
                        } else {
                            actor.to_string()
                        }
                    })
                    .collect();
                CommandResponse::ok("Whitelisted users", lines)
            }
            OperatorCommand::Settings => {
                let lines = self
                    .settings
                    .iter()
                    .map(|(name, value)| format!("{}: {}", name, value))
                    .collect();
                CommandResponse::ok("Warden settings", lines)
            }
            OperatorCommand::Restore => {
                let report = self.snapshots.restore(community).await?;
                let mut lines = vec![report.summary()];
                lines.extend(
                    report
                        .failed()
                        .iter()
                        .map(|(entity, reason)| format!("{}: {}", entity, reason)),
                );
                let fields = vec![("Result".to_string(), report.summary())];
                if let Err(e) = self.sink.notice(community, "Server restored", &fields).await {
                    warn!(error = %e, "Restore notice not delivered");
                }
                CommandResponse::ok("Restore finished", lines)
            }
        };
        info!(command = command.name(), "Command executed");
        Ok(response)
    }

    async fn announce(&self, community: CommunityId, title: &str, by: ActorId, actor: ActorId) {
        let fields = vec![
            ("User".to_string(), actor.to_string()),
            ("By".to_string(), by.to_string()),
        ];
        if let Err(e) = self.sink.notice(community, title, &fields).await {
            warn!(error = %e, "Whitelist notice not delivered");
        }
    }
}
