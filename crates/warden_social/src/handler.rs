//! Serenity event handler for the Warden bot.
//!
//! Each gateway event that can mutate a guild is converted into a Warden
//! [`Event`] and handed to the moderation pipeline on its own task. Posted
//! messages are moderated first and then offered to the operator console.
//! Messages from bot accounts are only cached.

use crate::conversions::{
    added_roles, channel_info, community_id, member_info, role_info, server_flag_change,
    timestamp_of,
};
use crate::{CachedMessage, DiscordNotifier, RecentMessages};
use serenity::all::{GuildMemberUpdateEvent, MessageUpdateEvent, Ready, VoiceState};
use serenity::async_trait;
use serenity::client::{Context, EventHandler};
use serenity::model::channel::{GuildChannel, Message};
use serenity::model::gateway::GatewayIntents;
use serenity::model::guild::{Member, Role};
use serenity::model::id::{
    ChannelId as DiscordChannelId, GuildId, MessageId as DiscordMessageId,
    RoleId as DiscordRoleId,
};
use serenity::model::user::User;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info, warn};
use warden_core::{
    ActorId, ChannelId, CommunityId, Event, EventKind, MemberInfo, MessageId, MessageInfo, RoleId,
    RoleInfo, VoiceStateChange,
};
use warden_moderation::{ModerationPipeline, OperatorConsole};
use warden_security::ModerationState;
use warden_snapshot::SnapshotManager;

/// Event handler for the Warden Discord bot.
pub struct WardenHandler {
    pipeline: Arc<ModerationPipeline>,
    console: Arc<OperatorConsole>,
    snapshots: Arc<SnapshotManager>,
    notifier: Arc<DiscordNotifier>,
    snapshot_interval: Duration,
    recent: RecentMessages,
    bot_id: OnceLock<ActorId>,
    capture_started: AtomicBool,
}

impl std::fmt::Debug for WardenHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WardenHandler")
            .field("pipeline", &self.pipeline)
            .field("console", &self.console)
            .field("snapshot_interval", &self.snapshot_interval)
            .field("recent", &self.recent.len())
            .field("bot_id", &self.bot_id.get())
            .finish_non_exhaustive()
    }
}

impl WardenHandler {
    /// Create a handler.
    ///
    /// `recent_messages` bounds the cache used to attribute deleted and
    /// edited messages.
    pub fn new(
        pipeline: Arc<ModerationPipeline>,
        console: Arc<OperatorConsole>,
        snapshots: Arc<SnapshotManager>,
        notifier: Arc<DiscordNotifier>,
        snapshot_interval: Duration,
        recent_messages: usize,
    ) -> Self {
        Self {
            pipeline,
            console,
            snapshots,
            notifier,
            snapshot_interval,
            recent: RecentMessages::new(recent_messages),
            bot_id: OnceLock::new(),
            capture_started: AtomicBool::new(false),
        }
    }

    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MEMBERS
            | GatewayIntents::GUILD_MODERATION
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::GUILD_VOICE_STATES
    }

    fn state(&self) -> &Arc<ModerationState> {
        self.pipeline.policy().state()
    }

    fn submit(&self, guild: GuildId, kind: EventKind) {
        let event = Event::now(community_id(guild), kind);
        debug!(community = %event.community(), kind = event.kind().label(), "Dispatching event");
        // The pipeline logs and reports its own outcome.
        drop(self.pipeline.dispatch(event));
    }

    async fn prepare_communities(&self, communities: &[CommunityId]) {
        for community in communities {
            if let Err(e) = self.notifier.ensure_log_channel(*community).await {
                warn!(community = %community, error = %e, "Log channel unavailable");
            }
        }
    }

    async fn start_capture(&self, ctx: &Context, communities: &[CommunityId]) {
        if self.capture_started.swap(true, Ordering::SeqCst) {
            debug!("Snapshot capture already running");
            return;
        }

        match self.snapshots.load().await {
            Ok(loaded) => info!(loaded, "Loaded persisted snapshots"),
            Err(e) => warn!(error = %e, "Persisted snapshots unavailable"),
        }

        // Keep loaded snapshots until the first scheduled capture, so a
        // restart right after an incident can still restore.
        let missing: Vec<CommunityId> = communities
            .iter()
            .copied()
            .filter(|community| self.snapshots.store().get(*community).is_none())
            .collect();
        if !missing.is_empty() {
            let captured = self.snapshots.run_cycle(&missing).await;
            info!(captured, "Initial snapshot capture finished");
        }

        let cache = Arc::clone(&ctx.cache);
        drop(Arc::clone(&self.snapshots).spawn_capture_loop(
            self.snapshot_interval,
            move || cache.guilds().into_iter().map(community_id).collect(),
        ));
    }
}

fn placeholder_role(id: DiscordRoleId) -> RoleInfo {
    RoleInfo::new(RoleId::new(id.get()), id.to_string(), 0)
}

#[async_trait]
impl EventHandler for WardenHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        let bot_id = ActorId::new(ready.user.id.get());
        info!(
            bot_user = %ready.user.name,
            bot_id = %bot_id,
            guilds = ready.guilds.len(),
            "Bot connected to Discord"
        );
        let _ = self.bot_id.set(bot_id);
        self.state().whitelist().register_system(bot_id);

        let communities: Vec<CommunityId> =
            ready.guilds.iter().map(|g| community_id(g.id)).collect();
        self.prepare_communities(&communities).await;
        self.start_capture(&ctx, &communities).await;
    }

    async fn channel_create(&self, _ctx: Context, channel: GuildChannel) {
        info!(channel_id = %channel.id, channel_name = %channel.name, "Channel created");
        self.submit(
            channel.guild_id,
            EventKind::ChannelCreated {
                channel: channel_info(&channel),
            },
        );
    }

    async fn channel_delete(
        &self,
        _ctx: Context,
        channel: GuildChannel,
        _messages: Option<Vec<Message>>,
    ) {
        info!(channel_id = %channel.id, channel_name = %channel.name, "Channel deleted");
        self.submit(
            channel.guild_id,
            EventKind::ChannelDeleted {
                channel: channel_info(&channel),
            },
        );
    }

    async fn guild_role_create(&self, _ctx: Context, new: Role) {
        info!(guild_id = %new.guild_id, role_id = %new.id, role_name = %new.name, "Role created");
        self.submit(new.guild_id, EventKind::RoleCreated { role: role_info(&new) });
    }

    async fn guild_role_delete(
        &self,
        _ctx: Context,
        guild_id: GuildId,
        removed_role_id: DiscordRoleId,
        removed_role_data_if_available: Option<Role>,
    ) {
        info!(guild_id = %guild_id, role_id = %removed_role_id, "Role deleted");
        let role = removed_role_data_if_available
            .as_ref()
            .map(role_info)
            .unwrap_or_else(|| placeholder_role(removed_role_id));
        self.submit(guild_id, EventKind::RoleDeleted { role });
    }

    async fn guild_role_update(&self, _ctx: Context, old_data_if_available: Option<Role>, new: Role) {
        let before = old_data_if_available.as_ref().map(role_info);
        let after = role_info(&new);
        if before.as_ref() == Some(&after) {
            debug!(role_id = %new.id, "Role update without name or permission change");
            return;
        }
        info!(guild_id = %new.guild_id, role_id = %new.id, "Role modified");
        self.submit(new.guild_id, EventKind::RoleModified { before, after });
    }

    async fn guild_member_update(
        &self,
        ctx: Context,
        old_if_available: Option<Member>,
        _new: Option<Member>,
        event: GuildMemberUpdateEvent,
    ) {
        let Some(old) = old_if_available else {
            debug!(user_id = %event.user.id, "Member update without cached roles");
            return;
        };
        let added = added_roles(&old.roles, &event.roles);
        if added.is_empty() {
            return;
        }

        let roles: Vec<RoleInfo> = match ctx.cache.guild(event.guild_id) {
            Some(guild) => added
                .iter()
                .map(|id| {
                    guild
                        .roles
                        .get(id)
                        .map(role_info)
                        .unwrap_or_else(|| placeholder_role(*id))
                })
                .collect(),
            None => added.iter().copied().map(placeholder_role).collect(),
        };
        info!(
            guild_id = %event.guild_id,
            user_id = %event.user.id,
            roles = roles.len(),
            "Roles granted"
        );
        self.submit(
            event.guild_id,
            EventKind::RolesGranted {
                member: member_info(&event.user),
                added_roles: roles,
            },
        );
    }

    async fn guild_member_addition(&self, _ctx: Context, new_member: Member) {
        info!(
            guild_id = %new_member.guild_id,
            user_id = %new_member.user.id,
            bot = new_member.user.bot,
            "Member joined guild"
        );
        self.submit(
            new_member.guild_id,
            EventKind::MemberJoined {
                member: member_info(&new_member.user),
            },
        );
    }

    async fn guild_ban_addition(&self, _ctx: Context, guild_id: GuildId, banned_user: User) {
        info!(guild_id = %guild_id, user_id = %banned_user.id, "Member banned");
        self.submit(
            guild_id,
            EventKind::BanIssued {
                target: member_info(&banned_user),
            },
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let Some(guild_id) = msg.guild_id else {
            return;
        };

        let community = community_id(guild_id);
        let author = member_info(&msg.author);
        let channel = ChannelId::new(msg.channel_id.get());
        let id = MessageId::new(msg.id.get());
        self.recent.insert(
            id,
            CachedMessage::new(channel, author.clone(), msg.content.clone()),
        );

        let message = MessageInfo::new(id, channel, author, msg.content);
        let event = Event::new(
            community,
            timestamp_of(msg.timestamp),
            EventKind::MessagePosted { message },
        );
        let response = self
            .pipeline
            .handle_message(&self.console, event)
            .await
            .and_then(|outcome| outcome.response);

        if let Some(response) = response {
            if let Err(e) = msg.channel_id.say(&ctx.http, response.to_string()).await {
                warn!(error = %e, "Command response not delivered");
            }
        }
    }

    async fn message_delete(
        &self,
        _ctx: Context,
        channel_id: DiscordChannelId,
        deleted_message_id: DiscordMessageId,
        guild_id: Option<GuildId>,
    ) {
        let Some(guild_id) = guild_id else {
            return;
        };
        let message = MessageId::new(deleted_message_id.get());
        let cached = self.recent.remove(message);
        let (author, content) = match cached {
            Some(cached) => (
                Some(cached.author().clone()),
                Some(cached.content().clone()),
            ),
            None => (None, None),
        };
        debug!(channel_id = %channel_id, message_id = %deleted_message_id, cached = author.is_some(), "Message deleted");
        self.submit(
            guild_id,
            EventKind::MessageDeleted {
                channel: ChannelId::new(channel_id.get()),
                message,
                author,
                content,
            },
        );
    }

    async fn message_update(
        &self,
        _ctx: Context,
        old_if_available: Option<Message>,
        _new: Option<Message>,
        event: MessageUpdateEvent,
    ) {
        let (Some(guild_id), Some(after)) = (event.guild_id, event.content.clone()) else {
            return;
        };
        let message = MessageId::new(event.id.get());
        let channel = ChannelId::new(event.channel_id.get());
        let cached = self.recent.get(message);

        let author = match (&event.author, &cached) {
            (Some(user), _) => member_info(user),
            (None, Some(cached)) => cached.author().clone(),
            (None, None) => {
                debug!(message_id = %event.id, "Edit of an uncached message without author");
                return;
            }
        };
        if self.bot_id.get() == Some(author.id()) {
            return;
        }

        let before = old_if_available
            .map(|m| m.content)
            .or_else(|| cached.map(|c| c.content().clone()));
        if before.as_deref() == Some(after.as_str()) {
            return;
        }

        self.recent.insert(
            message,
            CachedMessage::new(channel, author.clone(), after.clone()),
        );
        self.submit(
            guild_id,
            EventKind::MessageEdited {
                channel,
                message,
                author,
                before,
                after,
            },
        );
    }

    async fn voice_state_update(&self, _ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        let Some(guild_id) = new.guild_id else {
            return;
        };
        let from_channel = old
            .as_ref()
            .and_then(|o| o.channel_id)
            .map(|c| ChannelId::new(c.get()));
        let to_channel = new.channel_id.map(|c| ChannelId::new(c.get()));
        let server_mute = server_flag_change(old.as_ref().map(|o| o.mute), new.mute);
        let server_deaf = server_flag_change(old.as_ref().map(|o| o.deaf), new.deaf);

        if from_channel == to_channel && server_mute.is_none() && server_deaf.is_none() {
            return;
        }

        let member = match &new.member {
            Some(member) => member_info(&member.user),
            None => MemberInfo::new(
                ActorId::new(new.user_id.get()),
                new.user_id.to_string(),
                false,
            ),
        };
        self.submit(
            guild_id,
            EventKind::VoiceStateChanged {
                change: VoiceStateChange::new(
                    member,
                    from_channel,
                    to_channel,
                    server_mute,
                    server_deaf,
                ),
            },
        );
    }
}
