// ── Entity store ──
//
// Snapshot-swapped storage for proxies, clients and mappings.

mod collection;
mod data_store;
mod refresh;

pub use collection::EntityCollection;
pub use data_store::{DataStore, StoreSnapshot, StoreStats};
