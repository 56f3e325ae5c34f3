use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use splitledger_application::{GroupId, GroupRecord, GroupStore, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to access snapshot file: {0}")]
    Io(#[from] io::Error),
    #[error("Snapshot file is not valid JSON: {0}")]
    Codec(#[from] serde_json::Error),
}

impl From<SnapshotError> for StoreError {
    fn from(err: SnapshotError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// File-backed group storage holding all groups in one JSON document.
///
/// The full table lives in memory behind a mutex; every `save` rewrites the
/// document on disk before returning. BTreeMap keeps groups ordered by id so
/// consecutive snapshots stay diffable.
#[derive(Debug)]
pub struct JsonSnapshotStore {
    path: PathBuf,
    groups: Mutex<BTreeMap<GroupId, GroupRecord>>,
}

impl JsonSnapshotStore {
    /// Load the snapshot at `path`, starting empty when no file exists yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SnapshotError> {
        let path = path.into();
        let groups = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(path = %path.display(), group_count = groups.len(), "opened snapshot");
        Ok(Self {
            path,
            groups: Mutex::new(groups),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, groups: &BTreeMap<GroupId, GroupRecord>) -> Result<(), SnapshotError> {
        let json = serde_json::to_vec_pretty(groups)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl GroupStore for JsonSnapshotStore {
    fn load(&self, group_id: &GroupId) -> Result<Option<GroupRecord>, StoreError> {
        let groups = self
            .groups
            .lock()
            .map_err(|_| StoreError::Backend("snapshot mutex poisoned".to_owned()))?;
        Ok(groups.get(group_id).cloned())
    }

    fn save(&self, record: &GroupRecord) -> Result<(), StoreError> {
        let mut groups = self
            .groups
            .lock()
            .map_err(|_| StoreError::Backend("snapshot mutex poisoned".to_owned()))?;
        groups.insert(record.id.clone(), record.clone());
        self.flush(&groups)?;
        Ok(())
    }
}
