//! Trusted actor registry.

use parking_lot::RwLock;
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};
use warden_core::ActorId;
use warden_error::{CommandError, CommandErrorKind};

/// Set of actors whose mutations are always authorized.
///
/// The owner is inserted at construction and can never be removed. System
/// identities (the bot's own account) are protected the same way, so the
/// engine's own reverts are never treated as violations.
#[derive(Debug)]
pub struct Whitelist {
    owner: ActorId,
    protected: RwLock<BTreeSet<ActorId>>,
    members: RwLock<BTreeSet<ActorId>>,
}

impl Whitelist {
    /// Whitelist containing only the owner.
    pub fn new(owner: ActorId) -> Self {
        Self {
            owner,
            protected: RwLock::new(BTreeSet::from([owner])),
            members: RwLock::new(BTreeSet::from([owner])),
        }
    }

    /// The configured owner.
    pub fn owner(&self) -> ActorId {
        self.owner
    }

    /// Whether `actor` is the owner.
    pub fn is_owner(&self, actor: ActorId) -> bool {
        self.owner == actor
    }

    /// Whether `actor` is trusted.
    pub fn contains(&self, actor: ActorId) -> bool {
        self.members.read().contains(&actor)
    }

    /// Trust `actor`. Returns false if it was already trusted.
    #[instrument(skip(self), fields(actor = %actor))]
    pub fn add(&self, actor: ActorId) -> bool {
        let added = self.members.write().insert(actor);
        if added {
            info!("Actor whitelisted");
        } else {
            debug!("Actor already whitelisted");
        }
        added
    }

    /// Register a protected system identity.
    #[instrument(skip(self), fields(actor = %actor))]
    pub fn register_system(&self, actor: ActorId) {
        self.protected.write().insert(actor);
        self.members.write().insert(actor);
        info!("System identity registered");
    }

    /// Whether `actor` is the owner or a system identity.
    pub fn is_protected(&self, actor: ActorId) -> bool {
        self.protected.read().contains(&actor)
    }

    /// Stop trusting `actor`. Returns false if it was not trusted.
    ///
    /// # Errors
    ///
    /// `ProtectedIdentity` when `actor` is the owner or a system identity.
    #[instrument(skip(self), fields(actor = %actor))]
    pub fn remove(&self, actor: ActorId) -> Result<bool, CommandError> {
        if self.is_protected(actor) {
            return Err(CommandError::new(CommandErrorKind::ProtectedIdentity(
                actor.get(),
            )));
        }
        let removed = self.members.write().remove(&actor);
        if removed {
            info!("Actor removed from whitelist");
        }
        Ok(removed)
    }

    /// Trusted actors in ascending id order.
    pub fn members(&self) -> Vec<ActorId> {
        self.members.read().iter().copied().collect()
    }

    /// Number of trusted actors.
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    /// Never true; the owner is always present.
    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }
}
