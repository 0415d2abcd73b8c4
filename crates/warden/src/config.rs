//! Layered configuration for the Warden bot.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Bundled defaults (`warden.toml` shipped with the crate)
//! 2. `~/.config/warden/warden.toml`
//! 3. `./warden.toml`
//! 4. `WARDEN_`-prefixed environment variables, `__` separating sections
//!
//! An explicit path replaces the two user files.

use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};
use warden_core::ActorId;
use warden_error::{ConfigError, WardenResult};
use warden_moderation::{AuditConfig, EnforcementConfig};
use warden_security::{PolicyConfig, SpamConfig};
use warden_snapshot::SnapshotConfig;

const DEFAULT_CONFIG: &str = include_str!("../warden.toml");

/// Complete bot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct WardenConfig {
    /// Account allowed to run operator commands
    #[serde(default)]
    owner_id: Option<u64>,

    /// Prefix of operator commands
    #[serde(default = "default_command_prefix")]
    command_prefix: String,

    /// Name of the security log channel
    #[serde(default = "default_log_channel")]
    log_channel: String,

    /// Messages remembered for delete and edit attribution
    #[serde(default = "default_message_cache_size")]
    message_cache_size: usize,

    /// Audit correlation
    #[serde(default)]
    audit: AuditConfig,

    /// Flood detection
    #[serde(default)]
    spam: SpamConfig,

    /// Sanction durations
    #[serde(default)]
    policy: PolicyConfig,

    /// Enforcement behaviour
    #[serde(default)]
    enforcement: EnforcementConfig,

    /// Structural snapshots
    #[serde(default)]
    snapshot: SnapshotConfig,
}

fn default_command_prefix() -> String {
    "!".to_string()
}

fn default_log_channel() -> String {
    "security-logs".to_string()
}

fn default_message_cache_size() -> usize {
    1000
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            owner_id: None,
            command_prefix: default_command_prefix(),
            log_channel: default_log_channel(),
            message_cache_size: default_message_cache_size(),
            audit: AuditConfig::default(),
            spam: SpamConfig::default(),
            policy: PolicyConfig::default(),
            enforcement: EnforcementConfig::default(),
            snapshot: SnapshotConfig::default(),
        }
    }
}

impl WardenConfig {
    /// Load from the bundled defaults and the standard user locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed or a value has
    /// the wrong type.
    pub fn load() -> WardenResult<Self> {
        Self::load_from(None)
    }

    /// Load with `path` replacing the standard user locations when given.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not exist, or if any source cannot be
    /// parsed.
    #[instrument]
    pub fn load_from(path: Option<&Path>) -> WardenResult<Self> {
        debug!("Loading configuration");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                if let Some(config_dir) = dirs::config_dir() {
                    let user_config = config_dir.join("warden").join("warden.toml");
                    builder = builder.add_source(File::from(user_config).required(false));
                }
                builder = builder.add_source(File::with_name("warden").required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("WARDEN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        debug!(
            prefix = %config.command_prefix,
            log_channel = %config.log_channel,
            owner_set = config.owner_id.is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// The configured owner.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when no owner id is set, or it is zero.
    pub fn owner(&self) -> WardenResult<ActorId> {
        match self.owner_id {
            Some(id) if id != 0 => Ok(ActorId::new(id)),
            _ => Err(ConfigError::new("owner_id is not set (use OWNER_ID or WARDEN_OWNER_ID)").into()),
        }
    }

    /// Effective settings as name/value pairs, for display.
    pub fn summary(&self) -> Vec<(String, String)> {
        let owner = self
            .owner_id
            .map_or_else(|| "unset".to_string(), |id| id.to_string());
        vec![
            ("owner".to_string(), owner),
            ("command prefix".to_string(), self.command_prefix.clone()),
            ("log channel".to_string(), self.log_channel.clone()),
            (
                "audit entry max age".to_string(),
                format!("{}s", self.audit.max_entry_age_secs()),
            ),
            (
                "spam threshold".to_string(),
                format!(
                    "more than {} messages in {}s",
                    self.spam.max_messages(),
                    self.spam.window_secs()
                ),
            ),
            (
                "link timeout".to_string(),
                format!("{}s", self.policy.link_timeout_secs()),
            ),
            (
                "mention timeout".to_string(),
                format!("{}s", self.policy.mention_timeout_secs()),
            ),
            (
                "spam timeout".to_string(),
                format!("{}s", self.policy.spam_timeout_secs()),
            ),
            (
                "beneficiary timeout".to_string(),
                format!("{}s", self.policy.beneficiary_timeout_secs()),
            ),
            (
                "notify before ban".to_string(),
                self.enforcement.notify_before_ban().to_string(),
            ),
            (
                "ban deletes message days".to_string(),
                self.enforcement.delete_message_days().to_string(),
            ),
            (
                "snapshot interval".to_string(),
                format!("{}s", self.snapshot.interval_secs()),
            ),
            (
                "snapshot path".to_string(),
                self.snapshot.path().display().to_string(),
            ),
        ]
    }
}
