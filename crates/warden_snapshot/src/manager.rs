//! Capture and restore of community structure.

use crate::{JsonSnapshotPersistence, SnapshotDocument, SnapshotStore};
use chrono::Utc;
use derive_getters::Getters;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};
use warden_core::{ChannelDescriptor, CommunityId, RoleDescriptor, SnapshotDescriptor};
use warden_error::{SnapshotError, SnapshotErrorKind, StorageError};
use warden_interface::StructurePlatform;

/// What a restore recreated.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct RestoreReport {
    community: CommunityId,
    roles_created: Vec<String>,
    channels_created: Vec<String>,
    skipped: Vec<String>,
    failed: Vec<(String, String)>,
}

impl RestoreReport {
    fn new(community: CommunityId) -> Self {
        Self {
            community,
            roles_created: Vec::new(),
            channels_created: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Whether every restorable entity was recreated.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// One-line summary for operators.
    pub fn summary(&self) -> String {
        format!(
            "{} roles and {} channels recreated, {} skipped, {} failed",
            self.roles_created.len(),
            self.channels_created.len(),
            self.skipped.len(),
            self.failed.len()
        )
    }
}

/// Timer-driven capture and on-demand restore of role/channel topology.
pub struct SnapshotManager {
    platform: Arc<dyn StructurePlatform>,
    store: SnapshotStore,
    persistence: Option<JsonSnapshotPersistence>,
}

impl std::fmt::Debug for SnapshotManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotManager")
            .field("store", &self.store)
            .field("persistence", &self.persistence)
            .finish_non_exhaustive()
    }
}

impl SnapshotManager {
    /// Manager that keeps snapshots in memory only.
    pub fn new(platform: Arc<dyn StructurePlatform>) -> Self {
        Self {
            platform,
            store: SnapshotStore::new(),
            persistence: None,
        }
    }

    /// Manager that persists the store after every capture cycle.
    pub fn with_persistence(
        platform: Arc<dyn StructurePlatform>,
        persistence: JsonSnapshotPersistence,
    ) -> Self {
        Self {
            platform,
            store: SnapshotStore::new(),
            persistence: Some(persistence),
        }
    }

    /// Latest descriptors.
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Enumerate the community and replace its stored descriptor.
    ///
    /// The implicit default role and roles managed by integrations are left
    /// out, since the platform does not allow recreating them.
    #[instrument(skip(self), fields(community = %community))]
    pub async fn capture(
        &self,
        community: CommunityId,
    ) -> Result<Arc<SnapshotDescriptor>, SnapshotError> {
        debug!("Capturing snapshot");
        let failed = |reason: String| {
            SnapshotError::new(SnapshotErrorKind::CaptureFailed {
                community: community.get(),
                reason,
            })
        };

        let roles = self
            .platform
            .list_roles(community)
            .await
            .map_err(|e| failed(e.to_string()))?
            .into_iter()
            .filter(|existing| !existing.is_managed())
            .map(|existing| {
                let role = existing.role();
                RoleDescriptor::new(role.name().clone(), *role.permission_bits())
            })
            .collect::<Vec<_>>();

        let channels = self
            .platform
            .list_channels(community)
            .await
            .map_err(|e| failed(e.to_string()))?
            .into_iter()
            .map(|channel| ChannelDescriptor::new(channel.name().clone(), *channel.kind()))
            .collect::<Vec<_>>();

        let descriptor = SnapshotDescriptor::new(community, Utc::now(), roles, channels);
        let descriptor = self.store.replace(descriptor);
        info!(
            roles = descriptor.roles().len(),
            channels = descriptor.channels().len(),
            "Snapshot captured"
        );
        Ok(descriptor)
    }

    /// Recreate every captured role, then every captured channel.
    ///
    /// # Errors
    ///
    /// `Unavailable` when the community was never captured; nothing is
    /// created in that case.
    #[instrument(skip(self), fields(community = %community))]
    pub async fn restore(&self, community: CommunityId) -> Result<RestoreReport, SnapshotError> {
        let Some(descriptor) = self.store.get(community) else {
            warn!("No snapshot available");
            return Err(SnapshotError::new(SnapshotErrorKind::Unavailable(
                community.get(),
            )));
        };
        info!(captured_at = %descriptor.captured_at(), "Restoring snapshot");

        let mut report = RestoreReport::new(community);
        for role in descriptor.roles() {
            match self.platform.create_role(community, role).await {
                Ok(id) => {
                    debug!(role = %role.name(), %id, "Role recreated");
                    report.roles_created.push(role.name().clone());
                }
                Err(e) => {
                    warn!(role = %role.name(), error = %e, "Role restore failed");
                    report.failed.push((format!("@{}", role.name()), e.kind().to_string()));
                }
            }
        }

        for channel in descriptor.channels() {
            if !channel.kind().is_restorable() {
                debug!(channel = %channel.name(), kind = %channel.kind(), "Channel kind not restorable");
                report
                    .skipped
                    .push(format!("#{} ({})", channel.name(), channel.kind()));
                continue;
            }
            match self.platform.create_channel(community, channel).await {
                Ok(id) => {
                    debug!(channel = %channel.name(), %id, "Channel recreated");
                    report.channels_created.push(channel.name().clone());
                }
                Err(e) => {
                    warn!(channel = %channel.name(), error = %e, "Channel restore failed");
                    report
                        .failed
                        .push((format!("#{}", channel.name()), e.kind().to_string()));
                }
            }
        }

        info!(summary = %report.summary(), "Restore finished");
        Ok(report)
    }

    /// Capture every community, then persist the store.
    ///
    /// Failures are logged per community; the cycle always runs to the end.
    /// Returns the number of communities captured.
    #[instrument(skip(self, communities), fields(communities = communities.len()))]
    pub async fn run_cycle(&self, communities: &[CommunityId]) -> usize {
        let mut captured = 0;
        for community in communities {
            match self.capture(*community).await {
                Ok(_) => captured += 1,
                Err(e) => error!(error = %e, "Snapshot capture failed"),
            }
        }
        if let Err(e) = self.persist().await {
            error!(error = %e, "Snapshot persistence failed");
        }
        info!(captured, "Snapshot cycle complete");
        captured
    }

    /// Write the store to the configured document, if any.
    pub async fn persist(&self) -> Result<(), StorageError> {
        match &self.persistence {
            Some(persistence) => {
                persistence
                    .save(&SnapshotDocument::new(self.store.to_map()))
                    .await
            }
            None => Ok(()),
        }
    }

    /// Populate the store from the configured document.
    ///
    /// Returns the number of descriptors loaded.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<usize, StorageError> {
        let Some(persistence) = &self.persistence else {
            return Ok(0);
        };
        match persistence.load().await? {
            Some(document) => {
                let communities = document.into_communities();
                let loaded = communities.len();
                self.store.extend(communities);
                info!(loaded, "Snapshots restored from disk");
                Ok(loaded)
            }
            None => Ok(0),
        }
    }

    /// Run [`run_cycle`](Self::run_cycle) every `interval`, starting one
    /// interval from now, over the communities `communities` returns.
    pub fn spawn_capture_loop<F>(self: Arc<Self>, interval: Duration, communities: F) -> JoinHandle<()>
    where
        F: Fn() -> Vec<CommunityId> + Send + Sync + 'static,
    {
        debug!(?interval, "Scheduling snapshot loop");
        tokio::spawn(async move {
            let mut timer = tokio::time::interval_at(Instant::now() + interval, interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                let targets = communities();
                self.run_cycle(&targets).await;
            }
        })
    }
}
