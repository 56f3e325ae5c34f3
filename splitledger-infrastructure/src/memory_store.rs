use std::sync::Arc;

use dashmap::DashMap;
use splitledger_application::{GroupId, GroupRecord, GroupStore, StoreError};

/// In-memory group storage backed by a concurrent map.
///
/// # Invariant
/// `load` hands out a clone of the stored record, so callers mutate a private
/// copy and nothing is visible to other readers until `save` writes it back.
/// Last save wins when two callers race on the same group.
#[derive(Clone, Default)]
pub struct InMemoryGroupStore {
    groups: Arc<DashMap<GroupId, GroupRecord>>,
}

impl InMemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of groups currently held.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl GroupStore for InMemoryGroupStore {
    fn load(&self, group_id: &GroupId) -> Result<Option<GroupRecord>, StoreError> {
        Ok(self.groups.get(group_id).map(|entry| entry.value().clone()))
    }

    fn save(&self, record: &GroupRecord) -> Result<(), StoreError> {
        self.groups.insert(record.id.clone(), record.clone());
        Ok(())
    }
}
