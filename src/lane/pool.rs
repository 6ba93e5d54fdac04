//! Pool: the set of active items across all lanes.

use super::item::ItemId;
use std::collections::HashSet;

/// Capacity-limited set of active item ids. Gates admission only.
#[derive(Debug, Clone)]
pub struct Pool {
    active: HashSet<ItemId>,
    capacity: usize,
}

impl Pool {
    /// Create an empty pool holding at most `capacity` items.
    pub fn new(capacity: usize) -> Self {
        Self {
            active: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of active items.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of active items.
    #[inline]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Check if no items are active.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Check if admission must wait.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.active.len() >= self.capacity
    }

    /// Check whether `id` is active.
    #[inline]
    pub fn contains(&self, id: ItemId) -> bool {
        self.active.contains(&id)
    }

    /// Track `id`. Returns `false` when the pool is full or `id` is already present.
    pub fn insert(&mut self, id: ItemId) -> bool {
        !self.is_full() && self.active.insert(id)
    }

    /// Stop tracking `id`.
    pub fn remove(&mut self, id: ItemId) -> bool {
        self.active.remove(&id)
    }

    /// Forget every active item.
    pub fn clear(&mut self) {
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity() {
        let mut pool = Pool::new(2);
        assert!(pool.insert(ItemId(1)));
        assert!(pool.insert(ItemId(2)));
        assert!(pool.is_full());
        assert!(!pool.insert(ItemId(3)));
        assert_eq!(pool.len(), 2);

        assert!(pool.remove(ItemId(1)));
        assert!(!pool.is_full());
        assert!(pool.insert(ItemId(3)));
    }

    #[test]
    fn test_clear() {
        let mut pool = Pool::new(4);
        pool.insert(ItemId(1));
        pool.clear();
        assert!(pool.is_empty());
        assert!(!pool.contains(ItemId(1)));
    }
}
