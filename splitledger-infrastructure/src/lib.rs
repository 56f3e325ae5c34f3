#![warn(clippy::uninlined_format_args)]

pub mod memory_store;
pub mod notifier;
pub mod snapshot_store;

pub use memory_store::InMemoryGroupStore;
pub use notifier::{ChannelEventBus, DeliveryError, MessageChannel, NotificationRelay, event_bus};
pub use snapshot_store::{JsonSnapshotStore, SnapshotError};
