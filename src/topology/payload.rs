use slotmap::{Key, SecondaryMap};

use super::{SegmentId, SurfaceId, TopologyStore, TriangleId, VertexId};

/// An entity ID whose liveness can be asked of the store.
pub trait StoreEntity: Key {
    /// Whether the entity still exists in `store`.
    fn is_live(self, store: &TopologyStore) -> bool;
}

impl StoreEntity for VertexId {
    fn is_live(self, store: &TopologyStore) -> bool {
        store.contains_vertex(self)
    }
}

impl StoreEntity for SegmentId {
    fn is_live(self, store: &TopologyStore) -> bool {
        store.contains_segment(self)
    }
}

impl StoreEntity for TriangleId {
    fn is_live(self, store: &TopologyStore) -> bool {
        store.contains_triangle(self)
    }
}

impl StoreEntity for SurfaceId {
    fn is_live(self, store: &TopologyStore) -> bool {
        store.contains_surface(self)
    }
}

/// User data attached to mesh entities without touching the store.
///
/// Lookups go through the store so that values attached to destroyed
/// entities are never observed.
#[derive(Debug, Clone)]
pub struct PayloadMap<K: StoreEntity, T> {
    inner: SecondaryMap<K, T>,
}

impl<K: StoreEntity, T> Default for PayloadMap<K, T> {
    fn default() -> Self {
        Self {
            inner: SecondaryMap::new(),
        }
    }
}

impl<K: StoreEntity, T> PayloadMap<K, T> {
    /// Creates an empty payload map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `value` to `id`, returning the previous value.
    pub fn insert(&mut self, id: K, value: T) -> Option<T> {
        self.inner.insert(id, value)
    }

    /// Value attached to a live entity.
    #[must_use]
    pub fn get(&self, store: &TopologyStore, id: K) -> Option<&T> {
        if id.is_live(store) {
            self.inner.get(id)
        } else {
            None
        }
    }

    /// Mutable value attached to a live entity.
    pub fn get_mut(&mut self, store: &TopologyStore, id: K) -> Option<&mut T> {
        if id.is_live(store) {
            self.inner.get_mut(id)
        } else {
            None
        }
    }

    /// Detaches and returns the value of `id`.
    pub fn remove(&mut self, id: K) -> Option<T> {
        self.inner.remove(id)
    }

    /// Drops values whose entity has been destroyed.
    pub fn prune(&mut self, store: &TopologyStore) {
        self.inner.retain(|id, _| id.is_live(store));
    }

    /// Number of stored values, live or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether no value is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
