//! In-memory platform that simulates a set of communities.

use crate::{AuditTrail, ExistingRole, ModerationPlatform, NotificationSink, StructurePlatform};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::time::Duration;
use tracing::debug;
use warden_core::{
    ActorId, AuditActionKind, AuditEntry, ChannelDescriptor, ChannelId, ChannelInfo, CommunityId,
    DecisionRecord, MessageId, RoleDescriptor, RoleId, RoleInfo,
};
use warden_error::{PlatformError, PlatformErrorKind, PlatformResult};

/// Command observed by [`InMemoryPlatform`], in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuedCommand {
    /// `delete_channel`
    DeleteChannel(ChannelId),
    /// `delete_role`
    DeleteRole(RoleId),
    /// `delete_message`
    DeleteMessage(MessageId),
    /// `remove_roles`
    RemoveRoles(ActorId, Vec<RoleId>),
    /// `strip_all_roles`
    StripAllRoles(ActorId),
    /// `ban_actor`
    Ban(ActorId),
    /// `kick_actor`
    Kick(ActorId),
    /// `timeout_actor`
    Timeout(ActorId, Duration),
    /// `notify_actor`
    Notify(ActorId),
    /// `create_role`
    CreateRole(String),
    /// `create_channel`
    CreateChannel(String),
}

#[derive(Debug, Default)]
struct CommunityState {
    roles: BTreeMap<RoleId, ExistingRole>,
    channels: BTreeMap<ChannelId, ChannelInfo>,
    members: HashMap<ActorId, BTreeSet<RoleId>>,
    banned: HashSet<ActorId>,
    timeouts: HashMap<ActorId, Duration>,
    audit: Vec<AuditEntry>,
}

#[derive(Debug, Default)]
struct State {
    communities: HashMap<CommunityId, CommunityState>,
    messages: HashSet<(ChannelId, MessageId)>,
    protected: HashSet<ActorId>,
    denied: HashSet<&'static str>,
    audit_unavailable: bool,
    issued: Vec<IssuedCommand>,
    records: Vec<DecisionRecord>,
    notices: Vec<(CommunityId, String)>,
    next_id: u64,
}

impl State {
    fn community(&mut self, community: CommunityId) -> &mut CommunityState {
        self.communities.entry(community).or_default()
    }

    fn check(&self, command: &'static str, target: Option<ActorId>) -> PlatformResult<()> {
        if self.denied.contains(command) {
            return Err(PlatformError::new(PlatformErrorKind::PermissionDenied(
                format!("missing permission for {}", command),
            )));
        }
        if let Some(target) = target
            && self.protected.contains(&target)
        {
            return Err(PlatformError::new(PlatformErrorKind::PermissionDenied(
                format!("{} is above the bot in the role hierarchy", target),
            )));
        }
        Ok(())
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        900_000 + self.next_id
    }
}

/// Platform double backed by in-memory state.
///
/// Sanctions are idempotent the way the real platform is: banning a banned
/// account reports `AlreadyInEffect`, deleting a missing entity reports
/// `NotFound`. Accounts marked protected reject sanctions with
/// `PermissionDenied`, and whole commands can be denied to simulate missing
/// bot permissions.
///
/// # Example
///
/// ```
/// use warden_core::{ActorId, CommunityId};
/// use warden_interface::{InMemoryPlatform, ModerationPlatform};
///
/// # tokio_test_block_on(async {
/// let platform = InMemoryPlatform::new();
/// let guild = CommunityId::new(1);
/// platform.add_member(guild, ActorId::new(7));
/// platform.ban_actor(guild, ActorId::new(7), "test").await.unwrap();
/// assert!(platform.is_banned(guild, ActorId::new(7)));
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryPlatform {
    state: Mutex<State>,
}

impl InMemoryPlatform {
    /// Empty platform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member with no roles.
    pub fn add_member(&self, community: CommunityId, member: ActorId) {
        self.state
            .lock()
            .community(community)
            .members
            .entry(member)
            .or_default();
    }

    /// Add a role to the community.
    pub fn add_role(&self, community: CommunityId, role: RoleInfo) {
        self.insert_role(community, ExistingRole::regular(role));
    }

    /// Add a role the platform manages (default role, integration role).
    pub fn add_managed_role(&self, community: CommunityId, role: RoleInfo) {
        self.insert_role(community, ExistingRole::managed(role));
    }

    fn insert_role(&self, community: CommunityId, role: ExistingRole) {
        self.state
            .lock()
            .community(community)
            .roles
            .insert(*role.role().id(), role);
    }

    /// Give a member a role.
    pub fn grant_role(&self, community: CommunityId, member: ActorId, role: RoleId) {
        self.state
            .lock()
            .community(community)
            .members
            .entry(member)
            .or_default()
            .insert(role);
    }

    /// Add a channel to the community.
    pub fn add_channel(&self, community: CommunityId, channel: ChannelInfo) {
        self.state
            .lock()
            .community(community)
            .channels
            .insert(*channel.id(), channel);
    }

    /// Add a message that can later be deleted.
    pub fn add_message(&self, channel: ChannelId, message: MessageId) {
        self.state.lock().messages.insert((channel, message));
    }

    /// Append an entry to the community's audit trail.
    pub fn push_audit_entry(&self, community: CommunityId, entry: AuditEntry) {
        self.state.lock().community(community).audit.push(entry);
    }

    /// Reject sanctions targeting `actor` with `PermissionDenied`.
    pub fn protect(&self, actor: ActorId) {
        self.state.lock().protected.insert(actor);
    }

    /// Reject every invocation of `command` (trait method name) with
    /// `PermissionDenied`.
    pub fn deny_command(&self, command: &'static str) {
        self.state.lock().denied.insert(command);
    }

    /// Make audit queries fail.
    pub fn set_audit_unavailable(&self, unavailable: bool) {
        self.state.lock().audit_unavailable = unavailable;
    }

    /// Whether `actor` is banned.
    pub fn is_banned(&self, community: CommunityId, actor: ActorId) -> bool {
        self.state.lock().community(community).banned.contains(&actor)
    }

    /// Whether `actor` is currently a member.
    pub fn is_member(&self, community: CommunityId, actor: ActorId) -> bool {
        self.state
            .lock()
            .community(community)
            .members
            .contains_key(&actor)
    }

    /// Roles held by a member.
    pub fn member_roles(&self, community: CommunityId, member: ActorId) -> Vec<RoleId> {
        self.state
            .lock()
            .community(community)
            .members
            .get(&member)
            .map(|roles| roles.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Active timeout of a member.
    pub fn timeout_of(&self, community: CommunityId, member: ActorId) -> Option<Duration> {
        self.state
            .lock()
            .community(community)
            .timeouts
            .get(&member)
            .copied()
    }

    /// Whether a message still exists.
    pub fn has_message(&self, channel: ChannelId, message: MessageId) -> bool {
        self.state.lock().messages.contains(&(channel, message))
    }

    /// Channels currently present.
    pub fn channels(&self, community: CommunityId) -> Vec<ChannelInfo> {
        self.state
            .lock()
            .community(community)
            .channels
            .values()
            .cloned()
            .collect()
    }

    /// Roles currently present.
    pub fn roles(&self, community: CommunityId) -> Vec<RoleInfo> {
        self.state
            .lock()
            .community(community)
            .roles
            .values()
            .map(|existing| existing.role().clone())
            .collect()
    }

    /// Every command issued so far.
    pub fn issued(&self) -> Vec<IssuedCommand> {
        self.state.lock().issued.clone()
    }

    /// Decision records emitted so far.
    pub fn records(&self) -> Vec<DecisionRecord> {
        self.state.lock().records.clone()
    }

    /// Titles of notices emitted so far.
    pub fn notices(&self) -> Vec<(CommunityId, String)> {
        self.state.lock().notices.clone()
    }
}

#[async_trait]
impl AuditTrail for InMemoryPlatform {
    async fn fetch_audit_entries(
        &self,
        community: CommunityId,
        action: AuditActionKind,
        limit: u8,
    ) -> PlatformResult<Vec<AuditEntry>> {
        let mut state = self.state.lock();
        if state.audit_unavailable {
            return Err(PlatformError::new(PlatformErrorKind::Api(
                "audit log unavailable".to_string(),
            )));
        }
        let mut entries: Vec<AuditEntry> = state
            .community(community)
            .audit
            .iter()
            .filter(|e| *e.action() == action)
            .cloned()
            .collect();
        // Newest first; later insertions win ties.
        entries.reverse();
        entries.sort_by(|a, b| b.occurred_at().cmp(a.occurred_at()));
        entries.truncate(limit as usize);
        debug!(%community, %action, found = entries.len(), "Audit query");
        Ok(entries)
    }
}

#[async_trait]
impl ModerationPlatform for InMemoryPlatform {
    async fn delete_channel(
        &self,
        community: CommunityId,
        channel: ChannelId,
        _reason: &str,
    ) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.check("delete_channel", None)?;
        state.issued.push(IssuedCommand::DeleteChannel(channel));
        match state.community(community).channels.remove(&channel) {
            Some(_) => Ok(()),
            None => Err(PlatformError::new(PlatformErrorKind::NotFound(format!(
                "channel {}",
                channel
            )))),
        }
    }

    async fn delete_role(
        &self,
        community: CommunityId,
        role: RoleId,
        _reason: &str,
    ) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.check("delete_role", None)?;
        state.issued.push(IssuedCommand::DeleteRole(role));
        let guild = state.community(community);
        match guild.roles.remove(&role) {
            Some(_) => {
                for roles in guild.members.values_mut() {
                    roles.remove(&role);
                }
                Ok(())
            }
            None => Err(PlatformError::new(PlatformErrorKind::NotFound(format!(
                "role {}",
                role
            )))),
        }
    }

    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        _reason: &str,
    ) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.check("delete_message", None)?;
        state.issued.push(IssuedCommand::DeleteMessage(message));
        if state.messages.remove(&(channel, message)) {
            Ok(())
        } else {
            Err(PlatformError::new(PlatformErrorKind::NotFound(format!(
                "message {}",
                message
            ))))
        }
    }

    async fn remove_roles(
        &self,
        community: CommunityId,
        member: ActorId,
        roles: &[RoleId],
        _reason: &str,
    ) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.check("remove_roles", Some(member))?;
        state
            .issued
            .push(IssuedCommand::RemoveRoles(member, roles.to_vec()));
        match state.community(community).members.get_mut(&member) {
            Some(held) => {
                for role in roles {
                    held.remove(role);
                }
                Ok(())
            }
            None => Err(PlatformError::new(PlatformErrorKind::NotFound(format!(
                "member {}",
                member
            )))),
        }
    }

    async fn strip_all_roles(
        &self,
        community: CommunityId,
        member: ActorId,
        _reason: &str,
    ) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.check("strip_all_roles", Some(member))?;
        state.issued.push(IssuedCommand::StripAllRoles(member));
        match state.community(community).members.get_mut(&member) {
            Some(held) => {
                held.clear();
                Ok(())
            }
            None => Err(PlatformError::new(PlatformErrorKind::NotFound(format!(
                "member {}",
                member
            )))),
        }
    }

    async fn ban_actor(
        &self,
        community: CommunityId,
        actor: ActorId,
        _reason: &str,
    ) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.check("ban_actor", Some(actor))?;
        state.issued.push(IssuedCommand::Ban(actor));
        let guild = state.community(community);
        if !guild.banned.insert(actor) {
            return Err(PlatformError::new(PlatformErrorKind::AlreadyInEffect(
                format!("{} is already banned", actor),
            )));
        }
        guild.members.remove(&actor);
        Ok(())
    }

    async fn kick_actor(
        &self,
        community: CommunityId,
        actor: ActorId,
        _reason: &str,
    ) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.check("kick_actor", Some(actor))?;
        state.issued.push(IssuedCommand::Kick(actor));
        match state.community(community).members.remove(&actor) {
            Some(_) => Ok(()),
            None => Err(PlatformError::new(PlatformErrorKind::NotFound(format!(
                "member {}",
                actor
            )))),
        }
    }

    async fn timeout_actor(
        &self,
        community: CommunityId,
        actor: ActorId,
        duration: Duration,
        _reason: &str,
    ) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.check("timeout_actor", Some(actor))?;
        state.issued.push(IssuedCommand::Timeout(actor, duration));
        let guild = state.community(community);
        if !guild.members.contains_key(&actor) {
            return Err(PlatformError::new(PlatformErrorKind::NotFound(format!(
                "member {}",
                actor
            ))));
        }
        guild.timeouts.insert(actor, duration);
        Ok(())
    }

    async fn notify_actor(
        &self,
        _community: CommunityId,
        actor: ActorId,
        _reason: &str,
    ) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.check("notify_actor", None)?;
        state.issued.push(IssuedCommand::Notify(actor));
        Ok(())
    }
}

#[async_trait]
impl StructurePlatform for InMemoryPlatform {
    async fn list_roles(&self, community: CommunityId) -> PlatformResult<Vec<ExistingRole>> {
        Ok(self
            .state
            .lock()
            .community(community)
            .roles
            .values()
            .cloned()
            .collect())
    }

    async fn list_channels(&self, community: CommunityId) -> PlatformResult<Vec<ChannelInfo>> {
        Ok(self.channels(community))
    }

    async fn create_role(
        &self,
        community: CommunityId,
        role: &RoleDescriptor,
    ) -> PlatformResult<RoleId> {
        let mut state = self.state.lock();
        state.check("create_role", None)?;
        state.issued.push(IssuedCommand::CreateRole(role.name().clone()));
        let id = RoleId::new(state.allocate_id());
        let info = RoleInfo::new(id, role.name().clone(), *role.permission_bits());
        state
            .community(community)
            .roles
            .insert(id, ExistingRole::regular(info));
        Ok(id)
    }

    async fn create_channel(
        &self,
        community: CommunityId,
        channel: &ChannelDescriptor,
    ) -> PlatformResult<ChannelId> {
        let mut state = self.state.lock();
        state.check("create_channel", None)?;
        if !channel.kind().is_restorable() {
            return Err(PlatformError::new(PlatformErrorKind::Unsupported(format!(
                "channel kind {}",
                channel.kind()
            ))));
        }
        state
            .issued
            .push(IssuedCommand::CreateChannel(channel.name().clone()));
        let id = ChannelId::new(state.allocate_id());
        let info = ChannelInfo::new(id, channel.name().clone(), *channel.kind());
        state.community(community).channels.insert(id, info);
        Ok(id)
    }
}

#[async_trait]
impl NotificationSink for InMemoryPlatform {
    async fn emit(&self, record: &DecisionRecord) -> PlatformResult<()> {
        self.state.lock().records.push(record.clone());
        Ok(())
    }

    async fn notice(
        &self,
        community: CommunityId,
        title: &str,
        _fields: &[(String, String)],
    ) -> PlatformResult<()> {
        self.state
            .lock()
            .notices
            .push((community, title.to_string()));
        Ok(())
    }
}
