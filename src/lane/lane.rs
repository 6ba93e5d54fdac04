//! Lane: one horizontal track and its occupancy budget.

use super::item::Item;
use std::vec::Drain;

/// A horizontal track holding items in admission order.
///
/// `occupied_width` is the distance budget left before the lane can take
/// another item without the newcomer crowding the last one. It is driven
/// only by the most recently admitted item.
#[derive(Debug)]
pub struct Lane<T, H> {
    items: Vec<Item<T, H>>,
    occupied_width: f32,
}

impl<T, H> Lane<T, H> {
    /// Create an empty lane.
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            occupied_width: 0.0,
        }
    }

    /// Items in admission order.
    #[inline]
    pub fn items(&self) -> &[Item<T, H>] {
        &self.items
    }

    #[inline]
    pub(crate) fn items_mut(&mut self) -> &mut [Item<T, H>] {
        &mut self.items
    }

    /// The most recently admitted item.
    #[inline]
    pub fn last(&self) -> Option<&Item<T, H>> {
        self.items.last()
    }

    /// Number of items in the lane.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the lane has no items.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remaining occupancy budget.
    #[inline]
    pub const fn occupied_width(&self) -> f32 {
        self.occupied_width
    }

    pub(crate) const fn set_occupied_width(&mut self, width: f32) {
        self.occupied_width = width;
    }

    /// Append a newly admitted item.
    pub fn push(&mut self, item: Item<T, H>) {
        self.items.push(item);
    }

    /// Remove the item at `index`. Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<Item<T, H>> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Empty the lane and zero its budget, yielding the removed items.
    pub fn reset(&mut self) -> Drain<'_, Item<T, H>> {
        self.occupied_width = 0.0;
        self.items.drain(..)
    }

    /// Shrink the budget by one tick of the last item's travel.
    ///
    /// No-op when empty or when the last item is paused.
    pub fn advance_occupancy(&mut self, dt_secs: f32) {
        if let Some(last) = self.items.last() {
            if !last.is_paused() {
                self.occupied_width -= last.speed() * dt_secs;
            }
        }
    }
}

impl<T, H> Default for Lane<T, H> {
    fn default() -> Self {
        Self::new()
    }
}
