// ── Central data store ──
//
// Holds the three server collections as one immutable snapshot behind an
// `ArcSwap`. Readers take a cheap `Arc` and never block; a refresh builds
// a new snapshot and swaps it in whole. Subscribers get each new snapshot
// through a `watch` channel.

use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use super::collection::EntityCollection;
use crate::model::{Client, EntityId, Mapping, Proxy, ProxyStatus};

/// Counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub proxies: usize,
    pub proxies_ok: usize,
    pub clients: usize,
    pub active_mappings: usize,
}

/// One consistent view of server state.
#[derive(Debug, Default)]
pub struct StoreSnapshot {
    pub proxies: EntityCollection<Proxy>,
    pub clients: EntityCollection<Client>,
    pub mappings: EntityCollection<Mapping>,
    /// When this snapshot was fetched. `None` until the first refresh.
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl StoreSnapshot {
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            proxies: self.proxies.len(),
            proxies_ok: self
                .proxies
                .iter()
                .filter(|p| p.status == ProxyStatus::Ok)
                .count(),
            clients: self.clients.len(),
            active_mappings: self.mappings.iter().filter(|m| is_active(m)).count(),
        }
    }

    /// Proxies no mapping points at, in server order.
    pub fn available_proxies(&self) -> Vec<Arc<Proxy>> {
        let taken: HashSet<&EntityId> = self
            .mappings
            .iter()
            .filter_map(|m| m.proxy_id.as_ref())
            .collect();

        self.proxies
            .iter()
            .filter(|p| !taken.contains(&p.id))
            .map(Arc::clone)
            .collect()
    }

    /// Exact match on the stored CIDR string.
    pub fn client_by_cidr(&self, cidr: &str) -> Option<Arc<Client>> {
        self.clients
            .iter()
            .find(|c| c.ip_cidr == cidr)
            .map(Arc::clone)
    }
}

/// A mapping counts as active when both of its resolved ends are enabled.
fn is_active(mapping: &Mapping) -> bool {
    let client_enabled = mapping.client.as_ref().is_some_and(|c| c.enabled);
    let proxy_enabled = mapping.proxy.as_ref().is_some_and(|p| p.enabled);
    client_enabled && proxy_enabled
}

/// Shared store for proxies, clients and mappings.
pub struct DataStore {
    current: ArcSwap<StoreSnapshot>,
    snapshot_tx: watch::Sender<Arc<StoreSnapshot>>,
}

impl DataStore {
    pub fn new() -> Self {
        let initial = Arc::new(StoreSnapshot::default());
        let (snapshot_tx, _) = watch::channel(Arc::clone(&initial));
        Self {
            current: ArcSwap::new(initial),
            snapshot_tx,
        }
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<StoreSnapshot> {
        self.current.load_full()
    }

    /// Receive every snapshot swapped in from now on.
    pub fn subscribe(&self) -> watch::Receiver<Arc<StoreSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    // ── Collection accessors ─────────────────────────────────────────

    pub fn proxies(&self) -> Vec<Arc<Proxy>> {
        self.current.load().proxies.to_vec()
    }

    pub fn clients(&self) -> Vec<Arc<Client>> {
        self.current.load().clients.to_vec()
    }

    pub fn mappings(&self) -> Vec<Arc<Mapping>> {
        self.current.load().mappings.to_vec()
    }

    pub fn proxy(&self, id: &EntityId) -> Option<Arc<Proxy>> {
        self.current.load().proxies.get(id)
    }

    pub fn mapping(&self, id: &EntityId) -> Option<Arc<Mapping>> {
        self.current.load().mappings.get(id)
    }

    pub fn client_by_cidr(&self, cidr: &str) -> Option<Arc<Client>> {
        self.current.load().client_by_cidr(cidr)
    }

    // ── Derivations ──────────────────────────────────────────────────

    pub fn stats(&self) -> StoreStats {
        self.current.load().stats()
    }

    pub fn available_proxies(&self) -> Vec<Arc<Proxy>> {
        self.current.load().available_proxies()
    }

    pub fn last_full_refresh(&self) -> Option<DateTime<Utc>> {
        self.current.load().refreshed_at
    }

    // ── Mutation (crate-internal) ────────────────────────────────────

    pub(crate) fn swap(&self, next: StoreSnapshot) {
        let next = Arc::new(next);
        self.current.store(Arc::clone(&next));
        self.snapshot_tx.send_replace(next);
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
