//! Latest snapshot per community.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use warden_core::{CommunityId, SnapshotDescriptor};

/// Copy-on-write map from community to its latest descriptor.
///
/// Readers clone the `Arc` and release the lock immediately, so a restore
/// running concurrently with a capture sees either the old or the new
/// descriptor, never a mix.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    descriptors: RwLock<HashMap<CommunityId, Arc<SnapshotDescriptor>>>,
}

impl SnapshotStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest descriptor of `community`.
    pub fn get(&self, community: CommunityId) -> Option<Arc<SnapshotDescriptor>> {
        self.descriptors.read().get(&community).cloned()
    }

    /// Replace the descriptor of its community.
    pub fn replace(&self, descriptor: SnapshotDescriptor) -> Arc<SnapshotDescriptor> {
        let descriptor = Arc::new(descriptor);
        self.descriptors
            .write()
            .insert(*descriptor.community(), Arc::clone(&descriptor));
        descriptor
    }

    /// Copy of every descriptor, ordered by community.
    pub fn to_map(&self) -> BTreeMap<CommunityId, SnapshotDescriptor> {
        self.descriptors
            .read()
            .iter()
            .map(|(id, d)| (*id, SnapshotDescriptor::clone(d)))
            .collect()
    }

    /// Insert every descriptor of `map`, replacing existing ones.
    pub fn extend(&self, map: BTreeMap<CommunityId, SnapshotDescriptor>) {
        let mut descriptors = self.descriptors.write();
        for (id, descriptor) in map {
            descriptors.insert(id, Arc::new(descriptor));
        }
    }

    /// Number of communities with a snapshot.
    pub fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    /// True when nothing was captured yet.
    pub fn is_empty(&self) -> bool {
        self.descriptors.read().is_empty()
    }
}
