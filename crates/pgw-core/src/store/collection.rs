// ── Ordered entity collection ──
//
// Immutable once built: a refresh constructs fresh collections and the
// store swaps them in together. Iteration follows server order; lookups
// by id are O(1).

use std::sync::Arc;

use indexmap::IndexMap;

use crate::model::{EntityId, Identified};

/// One entity type's worth of server state, keyed by id.
#[derive(Debug)]
pub struct EntityCollection<T> {
    by_id: IndexMap<EntityId, Arc<T>>,
}

impl<T> Default for EntityCollection<T> {
    fn default() -> Self {
        Self {
            by_id: IndexMap::new(),
        }
    }
}

impl<T: Identified> EntityCollection<T> {
    /// Build from a server listing.
    ///
    /// A duplicate id keeps its first position and takes the later value.
    pub fn from_vec(items: Vec<T>) -> Self {
        let mut by_id = IndexMap::with_capacity(items.len());
        for item in items {
            by_id.insert(item.id().clone(), Arc::new(item));
        }
        Self { by_id }
    }

    pub fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.by_id.get(id).map(Arc::clone)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.by_id.values()
    }

    /// Cheap clone of every entity, in server order.
    pub fn to_vec(&self) -> Vec<Arc<T>> {
        self.by_id.values().map(Arc::clone).collect()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
