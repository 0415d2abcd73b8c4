//! Security log channel output.

use crate::conversions::channel_kind;
use async_trait::async_trait;
use derive_getters::Getters;
use parking_lot::RwLock;
use serenity::builder::{CreateChannel, CreateEmbed, CreateMessage};
use serenity::http::Http;
use serenity::model::channel::{ChannelType, PermissionOverwrite, PermissionOverwriteType};
use serenity::model::id::{ChannelId as DiscordChannelId, GuildId, RoleId as DiscordRoleId};
use serenity::model::{Colour, Permissions, Timestamp};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use warden_core::{Attribution, ChannelKind, CommunityId, DecisionRecord, Disposition, EventKind};
use warden_error::PlatformResult;
use warden_interface::NotificationSink;

const FIELD_LIMIT: usize = 1024;

const RED: u32 = 0xE7_4C_3C;
const ORANGE: u32 = 0xE6_7E_22;
const GREEN: u32 = 0x2E_CC_71;
const BLUE: u32 = 0x34_98_DB;
const PURPLE: u32 = 0x9B_59_B6;

/// Platform-neutral content of one log channel embed.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct LogEntry {
    title: String,
    colour: u32,
    fields: Vec<(String, String)>,
}

impl LogEntry {
    /// Render a decision record.
    ///
    /// Returns `None` for posted messages that were not violations, which
    /// would otherwise mirror the whole chat into the log channel.
    pub fn from_record(record: &DecisionRecord) -> Option<Self> {
        let kind = record.event().kind();
        let disposition = record.verdict().disposition();
        if matches!(kind, EventKind::MessagePosted { .. })
            && disposition != Disposition::Violation
        {
            return None;
        }

        let label = kind.label().replace('_', " ");
        let (title, colour) = match disposition {
            Disposition::Violation => (format!("Unauthorized {}", label), RED),
            Disposition::Unattributed => (format!("Unattributed {}", label), ORANGE),
            Disposition::Authorized => (format!("Authorized {}", label), GREEN),
            Disposition::Observed => (capitalize(&label), BLUE),
        };

        let actor = match record.attribution() {
            Attribution::Resolved(actor) => format!("<@{}> ({})", actor, actor),
            Attribution::Unknown => "unknown".to_string(),
        };
        let mut fields = vec![
            ("Subject".to_string(), kind.describe()),
            ("Actor".to_string(), actor),
            ("Verdict".to_string(), disposition.to_string()),
        ];
        if let Some(report) = record.report()
            && !report.is_empty()
        {
            let lines: Vec<String> = report
                .outcomes()
                .iter()
                .map(|outcome| format!("{}: {}", outcome.action.label(), outcome.status))
                .collect();
            fields.push(("Actions".to_string(), lines.join("\n")));
        }

        Some(Self {
            title,
            colour,
            fields: truncate_fields(fields),
        })
    }

    /// Render a free-form notice.
    pub fn notice(title: impl Into<String>, fields: &[(String, String)]) -> Self {
        Self {
            title: title.into(),
            colour: PURPLE,
            fields: truncate_fields(fields.to_vec()),
        }
    }

    fn to_embed(&self) -> CreateEmbed {
        self.fields.iter().fold(
            CreateEmbed::new()
                .title(&self.title)
                .colour(Colour::new(self.colour))
                .timestamp(Timestamp::now()),
            |embed, (name, value)| embed.field(name, value, false),
        )
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn truncate_fields(fields: Vec<(String, String)>) -> Vec<(String, String)> {
    fields
        .into_iter()
        .map(|(name, value)| {
            let value = if value.is_empty() {
                "-".to_string()
            } else if value.chars().count() > FIELD_LIMIT {
                let mut cut: String = value.chars().take(FIELD_LIMIT - 3).collect();
                cut.push_str("...");
                cut
            } else {
                value
            };
            (name, value)
        })
        .collect()
}

/// Posts decision records and notices to a per-community log channel.
///
/// The channel is looked up by name and created on first use, readable by
/// everyone but closed to `@everyone` for sending.
pub struct DiscordNotifier {
    http: Arc<Http>,
    channel_name: String,
    channels: RwLock<HashMap<CommunityId, DiscordChannelId>>,
}

impl std::fmt::Debug for DiscordNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordNotifier")
            .field("channel_name", &self.channel_name)
            .field("channels", &self.channels.read().len())
            .finish_non_exhaustive()
    }
}

impl DiscordNotifier {
    /// Notifier writing to the channel called `channel_name`.
    pub fn new(http: Arc<Http>, channel_name: impl Into<String>) -> Self {
        Self {
            http,
            channel_name: channel_name.into(),
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Name of the log channel.
    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    /// Find or create the log channel of `community`.
    #[instrument(skip(self), fields(community = %community, channel_name = %self.channel_name))]
    pub async fn ensure_log_channel(&self, community: CommunityId) -> PlatformResult<DiscordChannelId> {
        if let Some(channel) = self.channels.read().get(&community) {
            return Ok(*channel);
        }

        let guild = GuildId::new(community.get());
        let existing = self
            .http
            .get_channels(guild)
            .await?
            .into_iter()
            .find(|c| c.name == self.channel_name && channel_kind(c.kind) == ChannelKind::Text);

        let channel = match existing {
            Some(channel) => {
                debug!(channel = %channel.id, "Found log channel");
                channel.id
            }
            None => {
                let closed = PermissionOverwrite {
                    allow: Permissions::empty(),
                    deny: Permissions::SEND_MESSAGES,
                    kind: PermissionOverwriteType::Role(DiscordRoleId::new(guild.get())),
                };
                let builder = CreateChannel::new(self.channel_name.as_str())
                    .kind(ChannelType::Text)
                    .permissions(vec![closed])
                    .audit_log_reason("Warden: security log channel");
                let created = guild.create_channel(&self.http, builder).await?;
                info!(channel = %created.id, "Created log channel");
                created.id
            }
        };

        self.channels.write().insert(community, channel);
        Ok(channel)
    }

    async fn post(&self, community: CommunityId, entry: &LogEntry) -> PlatformResult<()> {
        let channel = self.ensure_log_channel(community).await?;
        channel
            .send_message(&self.http, CreateMessage::new().embed(entry.to_embed()))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for DiscordNotifier {
    #[instrument(skip(self, record), fields(community = %record.community(), kind = record.event().kind().label()))]
    async fn emit(&self, record: &DecisionRecord) -> PlatformResult<()> {
        match LogEntry::from_record(record) {
            Some(entry) => self.post(*record.community(), &entry).await,
            None => {
                debug!("Record not rendered");
                Ok(())
            }
        }
    }

    #[instrument(skip(self, fields), fields(community = %community))]
    async fn notice(
        &self,
        community: CommunityId,
        title: &str,
        fields: &[(String, String)],
    ) -> PlatformResult<()> {
        self.post(community, &LogEntry::notice(title, fields)).await
    }
}
