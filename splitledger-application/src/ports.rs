use crate::{
    error::StoreError,
    model::{GroupId, GroupRecord, LedgerEvent},
};

/// Group-scoped persistence boundary.
///
/// Implementations hand out whole group records as snapshots; callers mutate
/// a copy and write back a full replacement through `save`.
pub trait GroupStore: Send + Sync {
    fn load(&self, group_id: &GroupId) -> Result<Option<GroupRecord>, StoreError>;

    fn save(&self, record: &GroupRecord) -> Result<(), StoreError>;
}

/// Outbound event boundary. Publishing must not block the mutation path and
/// must not fail it; delivery problems belong to the consuming side.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: LedgerEvent);
}
