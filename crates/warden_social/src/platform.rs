//! Platform commands issued over the Discord REST API.

use crate::conversions::{audit_action, channel_info, channel_type, role_info, timestamp_of};
use async_trait::async_trait;
use chrono::Utc;
use serenity::builder::{CreateChannel, CreateMessage, EditMember, EditRole};
use serenity::http::Http;
use serenity::model::Permissions;
use serenity::model::Timestamp;
use serenity::model::id::{
    ChannelId as DiscordChannelId, GuildId, MessageId as DiscordMessageId,
    RoleId as DiscordRoleId, UserId,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};
use warden_core::{
    ActorId, AuditActionKind, AuditEntry, ChannelDescriptor, ChannelId, ChannelInfo, CommunityId,
    MessageId, RoleDescriptor, RoleId,
};
use warden_error::{PlatformError, PlatformErrorKind, PlatformResult};
use warden_interface::{AuditTrail, ExistingRole, ModerationPlatform, StructurePlatform};

const RESTORE_REASON: &str = "Warden: restore from snapshot";

/// Discord implementation of the outbound platform traits.
///
/// Holds its own REST client so it can be built before the gateway client.
/// Rate limits are handled by Serenity's ratelimiter; refusals surface as
/// `PlatformError`s mapped from the HTTP status.
#[derive(Clone)]
pub struct DiscordPlatform {
    http: Arc<Http>,
    delete_message_days: u8,
}

impl std::fmt::Debug for DiscordPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordPlatform")
            .field("delete_message_days", &self.delete_message_days)
            .finish_non_exhaustive()
    }
}

impl DiscordPlatform {
    /// Create a platform with a standalone HTTP client.
    #[instrument(skip(token), fields(token_len = token.as_ref().len()))]
    pub fn new(token: impl AsRef<str>) -> Self {
        info!("Creating Discord platform client");
        Self::with_http_client(Arc::new(Http::new(token.as_ref())))
    }

    /// Create a platform sharing an existing HTTP client.
    pub fn with_http_client(http: Arc<Http>) -> Self {
        Self {
            http,
            delete_message_days: 0,
        }
    }

    /// Days of message history removed with a ban. Discord caps this at 7.
    pub fn with_delete_message_days(mut self, days: u8) -> Self {
        self.delete_message_days = days.min(7);
        self
    }

    /// Shared HTTP client.
    pub fn http(&self) -> &Arc<Http> {
        &self.http
    }
}

fn guild(community: CommunityId) -> GuildId {
    GuildId::new(community.get())
}

fn user(actor: ActorId) -> UserId {
    UserId::new(actor.get())
}

#[async_trait]
impl AuditTrail for DiscordPlatform {
    #[instrument(skip(self), fields(community = %community, action = %action))]
    async fn fetch_audit_entries(
        &self,
        community: CommunityId,
        action: AuditActionKind,
        limit: u8,
    ) -> PlatformResult<Vec<AuditEntry>> {
        let logs = guild(community)
            .audit_logs(&self.http, Some(audit_action(action)), None, None, Some(limit))
            .await?;

        let entries: Vec<AuditEntry> = logs
            .entries
            .iter()
            .map(|entry| {
                AuditEntry::new(
                    ActorId::new(entry.user_id.get()),
                    action,
                    entry.target_id.map(|target| target.get()),
                    timestamp_of(entry.id.created_at()),
                )
            })
            .collect();
        debug!(count = entries.len(), "Fetched audit entries");
        Ok(entries)
    }
}

#[async_trait]
impl ModerationPlatform for DiscordPlatform {
    #[instrument(skip(self, reason), fields(community = %community, channel = %channel))]
    async fn delete_channel(
        &self,
        community: CommunityId,
        channel: ChannelId,
        reason: &str,
    ) -> PlatformResult<()> {
        self.http
            .delete_channel(DiscordChannelId::new(channel.get()), Some(reason))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, reason), fields(community = %community, role = %role))]
    async fn delete_role(
        &self,
        community: CommunityId,
        role: RoleId,
        reason: &str,
    ) -> PlatformResult<()> {
        self.http
            .delete_role(guild(community), DiscordRoleId::new(role.get()), Some(reason))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, reason), fields(channel = %channel, message = %message))]
    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        reason: &str,
    ) -> PlatformResult<()> {
        self.http
            .delete_message(
                DiscordChannelId::new(channel.get()),
                DiscordMessageId::new(message.get()),
                Some(reason),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self, roles, reason), fields(community = %community, member = %member, roles = roles.len()))]
    async fn remove_roles(
        &self,
        community: CommunityId,
        member: ActorId,
        roles: &[RoleId],
        reason: &str,
    ) -> PlatformResult<()> {
        for role in roles {
            self.http
                .remove_member_role(
                    guild(community),
                    user(member),
                    DiscordRoleId::new(role.get()),
                    Some(reason),
                )
                .await?;
        }
        Ok(())
    }

    #[instrument(skip(self, reason), fields(community = %community, member = %member))]
    async fn strip_all_roles(
        &self,
        community: CommunityId,
        member: ActorId,
        reason: &str,
    ) -> PlatformResult<()> {
        let builder = EditMember::new()
            .roles(Vec::<DiscordRoleId>::new())
            .audit_log_reason(reason);
        guild(community)
            .edit_member(&self.http, user(member), builder)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, reason), fields(community = %community, actor = %actor, delete_message_days = self.delete_message_days))]
    async fn ban_actor(
        &self,
        community: CommunityId,
        actor: ActorId,
        reason: &str,
    ) -> PlatformResult<()> {
        // Discord answers a repeated ban with success, so repeats report Applied.
        self.http
            .ban_user(
                guild(community),
                user(actor),
                self.delete_message_days,
                Some(reason),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self, reason), fields(community = %community, actor = %actor))]
    async fn kick_actor(
        &self,
        community: CommunityId,
        actor: ActorId,
        reason: &str,
    ) -> PlatformResult<()> {
        self.http
            .kick_member(guild(community), user(actor), Some(reason))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, reason), fields(community = %community, actor = %actor, secs = duration.as_secs()))]
    async fn timeout_actor(
        &self,
        community: CommunityId,
        actor: ActorId,
        duration: Duration,
        reason: &str,
    ) -> PlatformResult<()> {
        let secs = i64::try_from(duration.as_secs()).map_err(|e| {
            PlatformError::new(PlatformErrorKind::Unsupported(format!(
                "timeout duration: {}",
                e
            )))
        })?;
        let until = Timestamp::from_unix_timestamp(Utc::now().timestamp().saturating_add(secs))
            .map_err(|e| {
                PlatformError::new(PlatformErrorKind::Unsupported(format!(
                    "timeout end: {}",
                    e
                )))
            })?;
        let builder = EditMember::new()
            .disable_communication_until_datetime(until)
            .audit_log_reason(reason);
        guild(community)
            .edit_member(&self.http, user(actor), builder)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, reason), fields(community = %community, actor = %actor))]
    async fn notify_actor(
        &self,
        community: CommunityId,
        actor: ActorId,
        reason: &str,
    ) -> PlatformResult<()> {
        let content = format!(
            "You are being removed from server {} after an unauthorized action. Reason: {}",
            community, reason
        );
        user(actor)
            .direct_message(&self.http, CreateMessage::new().content(content))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl StructurePlatform for DiscordPlatform {
    #[instrument(skip(self), fields(community = %community))]
    async fn list_roles(&self, community: CommunityId) -> PlatformResult<Vec<ExistingRole>> {
        let roles = self.http.get_guild_roles(guild(community)).await?;
        // The @everyone role shares the guild's id.
        Ok(roles
            .iter()
            .map(|role| {
                if role.managed || role.id.get() == community.get() {
                    ExistingRole::managed(role_info(role))
                } else {
                    ExistingRole::regular(role_info(role))
                }
            })
            .collect())
    }

    #[instrument(skip(self), fields(community = %community))]
    async fn list_channels(&self, community: CommunityId) -> PlatformResult<Vec<ChannelInfo>> {
        let channels = self.http.get_channels(guild(community)).await?;
        Ok(channels.iter().map(channel_info).collect())
    }

    #[instrument(skip(self, role), fields(community = %community, name = %role.name()))]
    async fn create_role(
        &self,
        community: CommunityId,
        role: &RoleDescriptor,
    ) -> PlatformResult<RoleId> {
        let builder = EditRole::new()
            .name(role.name())
            .permissions(Permissions::from_bits_truncate(*role.permission_bits()))
            .audit_log_reason(RESTORE_REASON);
        let created = guild(community).create_role(&self.http, builder).await?;
        info!(role = %created.id, "Role created");
        Ok(RoleId::new(created.id.get()))
    }

    #[instrument(skip(self, channel), fields(community = %community, name = %channel.name(), kind = %channel.kind()))]
    async fn create_channel(
        &self,
        community: CommunityId,
        channel: &ChannelDescriptor,
    ) -> PlatformResult<ChannelId> {
        let Some(kind) = channel_type(*channel.kind()) else {
            return Err(PlatformError::new(PlatformErrorKind::Unsupported(format!(
                "channel kind {}",
                channel.kind()
            ))));
        };
        let builder = CreateChannel::new(channel.name())
            .kind(kind)
            .audit_log_reason(RESTORE_REASON);
        let created = guild(community).create_channel(&self.http, builder).await?;
        info!(channel = %created.id, "Channel created");
        Ok(ChannelId::new(created.id.get()))
    }
}
