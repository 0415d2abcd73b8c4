//! Platform events consumed by the moderation pipeline.
//!
//! Events are built by the gateway adapter when the platform delivers a
//! mutation. They are immutable and consumed exactly once; nothing here is
//! persisted.

use crate::{ActorId, AuditActionKind, ChannelId, ChannelKind, CommunityId, MessageId, RoleId};
use chrono::{DateTime, Utc};
use derive_getters::Getters;

/// Channel as seen in an event payload.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ChannelInfo {
    id: ChannelId,
    name: String,
    kind: ChannelKind,
}

impl ChannelInfo {
    /// Describe a channel.
    pub fn new(id: ChannelId, name: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
        }
    }
}

/// Role as seen in an event payload.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct RoleInfo {
    id: RoleId,
    name: String,
    permission_bits: u64,
}

impl RoleInfo {
    /// Describe a role.
    pub fn new(id: RoleId, name: impl Into<String>, permission_bits: u64) -> Self {
        Self {
            id,
            name: name.into(),
            permission_bits,
        }
    }
}

/// Community member as seen in an event payload.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct MemberInfo {
    id: ActorId,
    name: String,
    is_bot: bool,
}

impl MemberInfo {
    /// Describe a member.
    pub fn new(id: ActorId, name: impl Into<String>, is_bot: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_bot,
        }
    }
}

/// A posted message.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct MessageInfo {
    id: MessageId,
    channel: ChannelId,
    author: MemberInfo,
    content: String,
}

impl MessageInfo {
    /// Describe a message.
    pub fn new(
        id: MessageId,
        channel: ChannelId,
        author: MemberInfo,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            channel,
            author,
            content: content.into(),
        }
    }
}

/// Transition of a member's voice state.
///
/// `server_mute` and `server_deaf` are `Some(new_value)` only when a moderator
/// changed them in this transition.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct VoiceStateChange {
    member: MemberInfo,
    from_channel: Option<ChannelId>,
    to_channel: Option<ChannelId>,
    server_mute: Option<bool>,
    server_deaf: Option<bool>,
}

impl VoiceStateChange {
    /// Describe a voice transition.
    pub fn new(
        member: MemberInfo,
        from_channel: Option<ChannelId>,
        to_channel: Option<ChannelId>,
        server_mute: Option<bool>,
        server_deaf: Option<bool>,
    ) -> Self {
        Self {
            member,
            from_channel,
            to_channel,
            server_mute,
            server_deaf,
        }
    }

    /// Whether a moderator (rather than the member) caused this transition.
    pub fn is_moderated(&self) -> bool {
        self.server_mute.is_some() || self.server_deaf.is_some()
    }
}

/// Kind-specific event payload.
#[derive(Debug, Clone, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    /// A channel appeared.
    ChannelCreated {
        /// The new channel
        channel: ChannelInfo,
    },
    /// A channel was removed.
    ChannelDeleted {
        /// The removed channel
        channel: ChannelInfo,
    },
    /// A role appeared.
    RoleCreated {
        /// The new role
        role: RoleInfo,
    },
    /// A role was removed.
    RoleDeleted {
        /// The removed role
        role: RoleInfo,
    },
    /// A role's name or permissions changed.
    RoleModified {
        /// Previous state, if the gateway had it cached
        before: Option<RoleInfo>,
        /// Current state
        after: RoleInfo,
    },
    /// Roles were added to a member.
    RolesGranted {
        /// Member who received the roles
        member: MemberInfo,
        /// Roles newly present on the member
        added_roles: Vec<RoleInfo>,
    },
    /// An account joined the community.
    MemberJoined {
        /// The joining account
        member: MemberInfo,
    },
    /// An account was banned.
    BanIssued {
        /// The banned account
        target: MemberInfo,
    },
    /// A message was posted.
    MessagePosted {
        /// The message
        message: MessageInfo,
    },
    /// A message was deleted.
    MessageDeleted {
        /// Channel that held the message
        channel: ChannelId,
        /// Deleted message
        message: MessageId,
        /// Author, if the message was cached
        author: Option<MemberInfo>,
        /// Content, if the message was cached
        content: Option<String>,
    },
    /// A message was edited.
    MessageEdited {
        /// Channel that holds the message
        channel: ChannelId,
        /// Edited message
        message: MessageId,
        /// Author of the message
        author: MemberInfo,
        /// Content before the edit, if cached
        before: Option<String>,
        /// Content after the edit
        after: String,
    },
    /// A member's voice state changed.
    VoiceStateChanged {
        /// The transition
        change: VoiceStateChange,
    },
}

impl EventKind {
    /// Short snake_case label, used in logs and records.
    pub fn label(&self) -> &'static str {
        self.into()
    }

    /// Audit action that would credit an actor with this event.
    ///
    /// `None` means the actor is known from the event itself (message author)
    /// or the event is never attributed.
    pub fn audit_action(&self) -> Option<AuditActionKind> {
        match self {
            Self::ChannelCreated { .. } => Some(AuditActionKind::ChannelCreate),
            Self::ChannelDeleted { .. } => Some(AuditActionKind::ChannelDelete),
            Self::RoleCreated { .. } => Some(AuditActionKind::RoleCreate),
            Self::RoleDeleted { .. } => Some(AuditActionKind::RoleDelete),
            Self::RoleModified { .. } => Some(AuditActionKind::RoleUpdate),
            Self::RolesGranted { .. } => Some(AuditActionKind::MemberRoleUpdate),
            Self::MemberJoined { member } if *member.is_bot() => Some(AuditActionKind::BotAdd),
            Self::MemberJoined { .. } => None,
            Self::BanIssued { .. } => Some(AuditActionKind::BanAdd),
            Self::MessageDeleted { author: Some(_), .. } => Some(AuditActionKind::MessageDelete),
            Self::MessageDeleted { .. } => None,
            Self::VoiceStateChanged { change } if change.is_moderated() => {
                Some(AuditActionKind::MemberUpdate)
            }
            Self::VoiceStateChanged { .. } => None,
            Self::MessagePosted { .. } | Self::MessageEdited { .. } => None,
        }
    }

    /// Entity id the matching audit entry must target, when the platform
    /// records one that can be checked.
    pub fn audit_subject(&self) -> Option<u64> {
        match self {
            Self::RolesGranted { member, .. } => Some(member.id().get()),
            Self::MemberJoined { member } => Some(member.id().get()),
            Self::BanIssued { target } => Some(target.id().get()),
            Self::MessageDeleted {
                author: Some(author),
                ..
            } => Some(author.id().get()),
            Self::VoiceStateChanged { change } => Some(change.member().id().get()),
            _ => None,
        }
    }

    /// Account affected by a mutation performed by someone else.
    pub fn beneficiary(&self) -> Option<&MemberInfo> {
        match self {
            Self::RolesGranted { member, .. } => Some(member),
            Self::MemberJoined { member } => Some(member),
            Self::BanIssued { target } => Some(target),
            Self::MessageDeleted { author, .. } => author.as_ref(),
            Self::VoiceStateChanged { change } => Some(change.member()),
            _ => None,
        }
    }

    /// One-line human readable description of the subject.
    pub fn describe(&self) -> String {
        match self {
            Self::ChannelCreated { channel } | Self::ChannelDeleted { channel } => {
                format!("#{} ({}, {})", channel.name(), channel.kind(), channel.id())
            }
            Self::RoleCreated { role } | Self::RoleDeleted { role } => {
                format!("@{} ({})", role.name(), role.id())
            }
            Self::RoleModified { before, after } => match before {
                Some(before) => format!(
                    "@{} ({}) permissions {} -> {}",
                    after.name(),
                    after.id(),
                    before.permission_bits(),
                    after.permission_bits()
                ),
                None => format!("@{} ({})", after.name(), after.id()),
            },
            Self::RolesGranted {
                member,
                added_roles,
            } => {
                let names: Vec<&str> = added_roles.iter().map(|r| r.name().as_str()).collect();
                format!("{} ({}) received {}", member.name(), member.id(), names.join(", "))
            }
            Self::MemberJoined { member } => {
                let kind = if *member.is_bot() { "bot" } else { "member" };
                format!("{} {} ({}) joined", kind, member.name(), member.id())
            }
            Self::BanIssued { target } => format!("{} ({}) banned", target.name(), target.id()),
            Self::MessagePosted { message } => format!(
                "message {} by {} in {}",
                message.id(),
                message.author().id(),
                message.channel()
            ),
            Self::MessageDeleted {
                channel,
                message,
                content,
                ..
            } => match content {
                Some(content) => format!("message {} in {}: '{}'", message, channel, content),
                None => format!("message {} in {}", message, channel),
            },
            Self::MessageEdited {
                channel,
                message,
                before,
                after,
                ..
            } => format!(
                "message {} in {}: '{}' -> '{}'",
                message,
                channel,
                before.as_deref().unwrap_or("<uncached>"),
                after
            ),
            Self::VoiceStateChanged { change } => {
                let mut parts = Vec::new();
                match (change.from_channel(), change.to_channel()) {
                    (None, Some(to)) => parts.push(format!("joined voice {}", to)),
                    (Some(from), None) => parts.push(format!("left voice {}", from)),
                    (Some(from), Some(to)) if from != to => {
                        parts.push(format!("moved voice {} -> {}", from, to))
                    }
                    _ => {}
                }
                if let Some(mute) = change.server_mute() {
                    parts.push(if *mute { "server muted" } else { "server unmuted" }.to_string());
                }
                if let Some(deaf) = change.server_deaf() {
                    parts.push(
                        if *deaf { "server deafened" } else { "server undeafened" }.to_string(),
                    );
                }
                format!("{} {}", change.member().name(), parts.join(", "))
            }
        }
    }
}

/// A platform event scoped to one community.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Event {
    community: CommunityId,
    occurred_at: DateTime<Utc>,
    kind: EventKind,
}

impl Event {
    /// Create an event.
    pub fn new(community: CommunityId, occurred_at: DateTime<Utc>, kind: EventKind) -> Self {
        Self {
            community,
            occurred_at,
            kind,
        }
    }

    /// Create an event stamped with the current time.
    pub fn now(community: CommunityId, kind: EventKind) -> Self {
        Self::new(community, Utc::now(), kind)
    }
}
