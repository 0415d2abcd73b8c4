//! Mappings between Serenity models and the Warden data model.
//!
//! Everything here is pure so the gateway adapter stays thin.

use chrono::{DateTime, Utc};
use serenity::model::channel::{ChannelType, GuildChannel};
use serenity::model::guild::Role;
use serenity::model::guild::audit_log::{
    Action, ChannelAction, MemberAction, MessageAction, RoleAction,
};
use serenity::model::id::GuildId;
use serenity::model::user::User;
use serenity::model::Timestamp;
use warden_core::{
    ActorId, AuditActionKind, ChannelId, ChannelInfo, ChannelKind, CommunityId, MemberInfo,
    RoleId, RoleInfo,
};

/// Map a Discord channel type onto the snapshot model.
pub fn channel_kind(kind: ChannelType) -> ChannelKind {
    match kind {
        ChannelType::Text => ChannelKind::Text,
        ChannelType::Voice => ChannelKind::Voice,
        ChannelType::Category => ChannelKind::Category,
        ChannelType::News => ChannelKind::News,
        ChannelType::Stage => ChannelKind::Stage,
        ChannelType::Forum => ChannelKind::Forum,
        other => ChannelKind::Unknown(u8::from(other)),
    }
}

/// Discord channel type used to recreate a channel of `kind`.
///
/// `None` for kinds a restore cannot create.
pub fn channel_type(kind: ChannelKind) -> Option<ChannelType> {
    match kind {
        ChannelKind::Text => Some(ChannelType::Text),
        ChannelKind::Voice => Some(ChannelType::Voice),
        ChannelKind::Category => Some(ChannelType::Category),
        ChannelKind::News => Some(ChannelType::News),
        ChannelKind::Stage => Some(ChannelType::Stage),
        ChannelKind::Forum => Some(ChannelType::Forum),
        ChannelKind::Unknown(_) => None,
    }
}

/// Discord audit log action matching `action`.
pub fn audit_action(action: AuditActionKind) -> Action {
    match action {
        AuditActionKind::ChannelCreate => Action::Channel(ChannelAction::Create),
        AuditActionKind::ChannelDelete => Action::Channel(ChannelAction::Delete),
        AuditActionKind::RoleCreate => Action::Role(RoleAction::Create),
        AuditActionKind::RoleUpdate => Action::Role(RoleAction::Update),
        AuditActionKind::RoleDelete => Action::Role(RoleAction::Delete),
        AuditActionKind::MemberRoleUpdate => Action::Member(MemberAction::RoleUpdate),
        AuditActionKind::MemberUpdate => Action::Member(MemberAction::Update),
        AuditActionKind::BotAdd => Action::Member(MemberAction::BotAdd),
        AuditActionKind::BanAdd => Action::Member(MemberAction::BanAdd),
        AuditActionKind::MessageDelete => Action::Message(MessageAction::Delete),
    }
}

/// Entries of `after` that were not in `before`, in `after` order.
pub fn added_roles<T: PartialEq + Copy>(before: &[T], after: &[T]) -> Vec<T> {
    after
        .iter()
        .filter(|role| !before.contains(role))
        .copied()
        .collect()
}

/// New value of a server-controlled voice flag, if it changed.
///
/// Without a cached previous state only a raised flag counts as a change.
pub fn server_flag_change(before: Option<bool>, after: bool) -> Option<bool> {
    match before {
        Some(before) if before != after => Some(after),
        Some(_) => None,
        None if after => Some(true),
        None => None,
    }
}

/// Convert a Discord timestamp, falling back to now if it is out of range.
pub fn timestamp_of(timestamp: Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp.unix_timestamp(), 0).unwrap_or_else(Utc::now)
}

pub(crate) fn community_id(guild: GuildId) -> CommunityId {
    CommunityId::new(guild.get())
}

pub(crate) fn member_info(user: &User) -> MemberInfo {
    MemberInfo::new(ActorId::new(user.id.get()), user.name.clone(), user.bot)
}

pub(crate) fn role_info(role: &Role) -> RoleInfo {
    RoleInfo::new(
        RoleId::new(role.id.get()),
        role.name.clone(),
        role.permissions.bits(),
    )
}

pub(crate) fn channel_info(channel: &GuildChannel) -> ChannelInfo {
    ChannelInfo::new(
        ChannelId::new(channel.id.get()),
        channel.name.clone(),
        channel_kind(channel.kind),
    )
}
