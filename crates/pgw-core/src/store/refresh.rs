// ── Full refresh application ──
//
// Turns one complete set of listings into a snapshot and swaps it in.
// Callers only reach this after all three fetches succeeded.

use chrono::Utc;
use tracing::debug;

use super::collection::EntityCollection;
use super::data_store::{DataStore, StoreSnapshot};
use crate::model::{Client, Mapping, Proxy};

impl DataStore {
    /// Replace all three collections in one step.
    pub(crate) fn apply_full_refresh(
        &self,
        proxies: Vec<Proxy>,
        clients: Vec<Client>,
        mappings: Vec<Mapping>,
    ) {
        debug!(
            proxies = proxies.len(),
            clients = clients.len(),
            mappings = mappings.len(),
            "applying full refresh"
        );

        self.swap(StoreSnapshot {
            proxies: EntityCollection::from_vec(proxies),
            clients: EntityCollection::from_vec(clients),
            mappings: EntityCollection::from_vec(mappings),
            refreshed_at: Some(Utc::now()),
        });
    }
}
