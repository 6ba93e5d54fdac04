//! Item: one floating text instance in flight.

use crate::render::Size;

/// Identifier assigned to an item at admission, unique per scheduler.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct ItemId(pub u64);

/// An active item travelling right-to-left across its lane.
///
/// `offset` is the distance between the item's left edge and the lane's left
/// edge. It starts at the display width and only ever decreases. Size is fixed
/// at admission.
#[derive(Debug)]
pub struct Item<T, H> {
    id: ItemId,
    content: T,
    visual: H,
    size: Size,
    offset: f32,
    speed: f32,
    paused: bool,
}

impl<T, H> Item<T, H> {
    /// Create an item at `offset` moving at `speed` units per second.
    ///
    /// Negative or NaN speeds are treated as zero.
    pub fn new(id: ItemId, content: T, visual: H, size: Size, offset: f32, speed: f32) -> Self {
        Self {
            id,
            content,
            visual,
            size,
            offset,
            speed: speed.max(0.0),
            paused: false,
        }
    }

    /// Item identifier.
    #[inline]
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// The content this item was materialized from.
    #[inline]
    pub const fn content(&self) -> &T {
        &self.content
    }

    /// Handle to the external visual.
    #[inline]
    pub const fn visual(&self) -> &H {
        &self.visual
    }

    /// Measured width.
    #[inline]
    pub const fn width(&self) -> f32 {
        self.size.width
    }

    /// Measured height.
    #[inline]
    pub const fn height(&self) -> f32 {
        self.size.height
    }

    /// Current horizontal offset.
    #[inline]
    pub const fn offset(&self) -> f32 {
        self.offset
    }

    /// Speed in units per second.
    #[inline]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Whether the item is paused.
    #[inline]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    pub(crate) const fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Move left by `speed * dt_secs`. Paused items stay put.
    #[inline]
    pub fn advance(&mut self, dt_secs: f32) {
        if !self.paused {
            self.offset -= self.speed * dt_secs;
        }
    }

    /// True once the trailing edge is more than `margin` past the left edge.
    #[inline]
    pub fn is_exhausted(&self, margin: f32) -> bool {
        self.offset <= 0.0 && self.offset.abs() > self.size.width + margin
    }

    /// Give up the visual handle, dropping the rest.
    pub fn into_visual(self) -> H {
        self.visual
    }
}
