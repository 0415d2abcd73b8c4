//! JSON file persistence of the snapshot store.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use warden_core::{CommunityId, SnapshotDescriptor};
use warden_error::{StorageError, StorageErrorKind};

/// On-disk document: every community's latest descriptor, keyed by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct SnapshotDocument {
    saved_at: DateTime<Utc>,
    communities: BTreeMap<CommunityId, SnapshotDescriptor>,
}

impl SnapshotDocument {
    /// Document stamped with the current time.
    pub fn new(communities: BTreeMap<CommunityId, SnapshotDescriptor>) -> Self {
        Self {
            saved_at: Utc::now(),
            communities,
        }
    }

    /// Take the descriptors out of the document.
    pub fn into_communities(self) -> BTreeMap<CommunityId, SnapshotDescriptor> {
        self.communities
    }
}

/// Reads and writes a [`SnapshotDocument`] at a fixed path.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a crash mid-write never leaves a truncated document behind.
#[derive(Debug, Clone)]
pub struct JsonSnapshotPersistence {
    file_path: PathBuf,
}

impl JsonSnapshotPersistence {
    /// Persistence at `file_path`.
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    /// Target path.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .file_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }

    /// Write `document`, replacing any previous one.
    #[instrument(skip(self, document), fields(path = %self.file_path.display(), communities = document.communities().len()))]
    pub async fn save(&self, document: &SnapshotDocument) -> Result<(), StorageError> {
        debug!("Saving snapshot document");
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| StorageError::new(StorageErrorKind::Serialize(e.to_string())))?;

        if let Some(parent) = self.file_path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp.display(),
                e
            )))
        })?;
        tokio::fs::rename(&temp, &self.file_path)
            .await
            .map_err(|e| {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "{}: {}",
                    self.file_path.display(),
                    e
                )))
            })?;
        info!("Snapshot document saved");
        Ok(())
    }

    /// Read the document, or `None` if none was written yet.
    #[instrument(skip(self), fields(path = %self.file_path.display()))]
    pub async fn load(&self) -> Result<Option<SnapshotDocument>, StorageError> {
        debug!("Loading snapshot document");
        let json = match tokio::fs::read_to_string(&self.file_path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No snapshot document on disk");
                return Ok(None);
            }
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    self.file_path.display(),
                    e
                ))));
            }
        };
        let document: SnapshotDocument = serde_json::from_str(&json)?;
        info!(communities = document.communities().len(), "Snapshot document loaded");
        Ok(Some(document))
    }
}
