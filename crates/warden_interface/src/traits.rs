//! Outbound platform capabilities.

use async_trait::async_trait;
use std::time::Duration;
use warden_core::{
    ActorId, AuditActionKind, AuditEntry, ChannelDescriptor, ChannelId, ChannelInfo, CommunityId,
    DecisionRecord, MessageId, RoleDescriptor, RoleId, RoleInfo,
};
use warden_error::PlatformResult;

/// Read access to the platform's audit log.
#[async_trait]
pub trait AuditTrail: Send + Sync {
    /// Fetch up to `limit` entries of `action`, newest first.
    async fn fetch_audit_entries(
        &self,
        community: CommunityId,
        action: AuditActionKind,
        limit: u8,
    ) -> PlatformResult<Vec<AuditEntry>>;
}

/// Commands that revert mutations and sanction accounts.
///
/// Implementations report an already-applied state (already banned, entity
/// already gone) as `AlreadyInEffect` or `NotFound` rather than success, so
/// the caller can tell the difference in its report.
#[async_trait]
pub trait ModerationPlatform: Send + Sync {
    /// Delete a channel.
    async fn delete_channel(
        &self,
        community: CommunityId,
        channel: ChannelId,
        reason: &str,
    ) -> PlatformResult<()>;

    /// Delete a role.
    async fn delete_role(
        &self,
        community: CommunityId,
        role: RoleId,
        reason: &str,
    ) -> PlatformResult<()>;

    /// Delete a message.
    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        reason: &str,
    ) -> PlatformResult<()>;

    /// Remove specific roles from a member.
    async fn remove_roles(
        &self,
        community: CommunityId,
        member: ActorId,
        roles: &[RoleId],
        reason: &str,
    ) -> PlatformResult<()>;

    /// Remove every role from a member.
    async fn strip_all_roles(
        &self,
        community: CommunityId,
        member: ActorId,
        reason: &str,
    ) -> PlatformResult<()>;

    /// Ban an account.
    async fn ban_actor(
        &self,
        community: CommunityId,
        actor: ActorId,
        reason: &str,
    ) -> PlatformResult<()>;

    /// Kick a member.
    async fn kick_actor(
        &self,
        community: CommunityId,
        actor: ActorId,
        reason: &str,
    ) -> PlatformResult<()>;

    /// Prevent a member from communicating for `duration`.
    async fn timeout_actor(
        &self,
        community: CommunityId,
        actor: ActorId,
        duration: Duration,
        reason: &str,
    ) -> PlatformResult<()>;

    /// Send a direct notice to an account before it is sanctioned.
    async fn notify_actor(
        &self,
        community: CommunityId,
        actor: ActorId,
        reason: &str,
    ) -> PlatformResult<()>;
}

/// A role present in a community.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingRole {
    role: RoleInfo,
    managed: bool,
}

impl ExistingRole {
    /// Role the community's members can recreate.
    pub fn regular(role: RoleInfo) -> Self {
        Self {
            role,
            managed: false,
        }
    }

    /// Role owned by the platform itself: the default role or an
    /// integration role.
    pub fn managed(role: RoleInfo) -> Self {
        Self {
            role,
            managed: true,
        }
    }

    /// The role.
    pub fn role(&self) -> &RoleInfo {
        &self.role
    }

    /// Whether the platform manages the role, so it cannot be recreated.
    pub fn is_managed(&self) -> bool {
        self.managed
    }
}

/// Enumeration and creation of community structure.
#[async_trait]
pub trait StructurePlatform: Send + Sync {
    /// Current roles, including the implicit default role and managed roles.
    async fn list_roles(&self, community: CommunityId) -> PlatformResult<Vec<ExistingRole>>;

    /// Current channels.
    async fn list_channels(&self, community: CommunityId) -> PlatformResult<Vec<ChannelInfo>>;

    /// Create a new role.
    async fn create_role(
        &self,
        community: CommunityId,
        role: &RoleDescriptor,
    ) -> PlatformResult<RoleId>;

    /// Create a new channel.
    async fn create_channel(
        &self,
        community: CommunityId,
        channel: &ChannelDescriptor,
    ) -> PlatformResult<ChannelId>;
}

/// Destination for decision records and operator notices.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Publish the record of one pipeline run.
    async fn emit(&self, record: &DecisionRecord) -> PlatformResult<()>;

    /// Publish a free-form notice (whitelist changes, restore progress).
    async fn notice(
        &self,
        community: CommunityId,
        title: &str,
        fields: &[(String, String)],
    ) -> PlatformResult<()>;
}
