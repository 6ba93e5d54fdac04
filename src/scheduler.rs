//! Scheduler: lane selection, speed assignment and the per-tick simulation.
//!
//! The scheduler is single-threaded. It owns the pending queue, the lanes and
//! the pool, and talks to the visual layer only through [`Renderer`]. The
//! threaded runner in [`crate::actor`] wraps it; tests and embedders with
//! their own frame loop can drive it directly with [`Scheduler::tick`].
//!
//! # Speed assignment
//!
//! An item entering an empty lane gets `base_speed * c` with `c` drawn from
//! `[1.1, 2.1)`. An item entering an occupied lane chases the one ahead:
//!
//! ```text
//! speed = display_width * previous_speed / occupied_width
//! ```
//!
//! `occupied_width` is the distance the previous item still has to cover
//! before the lane frees up, so the newcomer crosses the full display no
//! faster than the previous item clears it. Every speed is clamped to
//! `2 * base_speed`.

use crate::config::{LaneLayout, QueuePolicy, SchedulerConfig};
use crate::lane::{Item, ItemId, Lane, Pool};
use crate::render::{Placement, Renderer, Size, Translation};
use crate::rng::{DetRng, RandomSource};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Range of the speed coefficient for items entering an empty lane.
const SPEED_COEFFICIENT: (f32, f32) = (1.1, 2.1);

/// Occupancy reserved per unit of item width, on top of the display width.
const OCCUPANCY_WIDTH_FACTOR: f32 = 1.1;

/// Upper bound (exclusive) of the random slack added to a lane's occupancy.
const OCCUPANCY_JITTER: f32 = 20.0;

/// Pixel bounds of the display area.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct DisplayBounds {
    /// Width of the display area.
    pub width: f32,
    /// Height of the display area.
    pub height: f32,
}

impl DisplayBounds {
    /// Create new bounds.
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Item admitted during this tick, if any.
    pub admitted: Option<ItemId>,
    /// Number of items retired during this tick.
    pub retired: usize,
}

/// Point-in-time view of one active item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemSnapshot {
    /// Item identifier.
    pub id: ItemId,
    /// Horizontal offset.
    pub offset: f32,
    /// Speed in units per second.
    pub speed: f32,
    /// Measured width.
    pub width: f32,
    /// Whether the item is paused.
    pub paused: bool,
}

/// Point-in-time view of one lane.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneSnapshot {
    /// Items in admission order.
    pub items: Vec<ItemSnapshot>,
    /// Remaining occupancy budget.
    pub occupied_width: f32,
}

/// Point-in-time view of the whole scheduler.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchedulerSnapshot {
    /// Lanes, top to bottom.
    pub lanes: Vec<LaneSnapshot>,
    /// Active items across all lanes.
    pub pool_len: usize,
    /// Content waiting for admission.
    pub pending: usize,
    /// Content dropped by the queue policy so far.
    pub dropped: u64,
    /// Whether the scheduler is paused.
    pub paused: bool,
}

/// Speed for an item entering a lane whose last item moves at `previous_speed`
/// with `occupied_width` budget left, clamped to `[0, max_speed]`.
///
/// A spent budget (`occupied_width <= 0`) yields `max_speed`, the limit of
/// the formula as the budget approaches zero.
pub fn chase_speed(
    display_width: f32,
    previous_speed: f32,
    occupied_width: f32,
    max_speed: f32,
) -> f32 {
    if occupied_width <= 0.0 {
        return max_speed;
    }
    let speed = display_width * previous_speed / occupied_width;
    if speed.is_nan() {
        return max_speed;
    }
    speed.clamp(0.0, max_speed)
}

/// Lane allocator and simulation core.
pub struct Scheduler<T, R: Renderer<T>> {
    config: SchedulerConfig,
    renderer: R,
    random: Box<dyn RandomSource>,
    lanes: Vec<Lane<T, R::Handle>>,
    pending: VecDeque<T>,
    pool: Pool,
    display: DisplayBounds,
    layout: LaneLayout,
    next_id: u64,
    dropped: u64,
    paused: bool,
}

impl<T, R: Renderer<T>> Scheduler<T, R> {
    /// Create a scheduler with no lanes. Call [`configure_lanes`](Self::configure_lanes)
    /// before expecting admissions.
    pub fn new(config: SchedulerConfig, renderer: R) -> Self {
        let random = config.seed.map_or_else(DetRng::from_clock, DetRng::new);
        Self {
            pool: Pool::new(config.max_pool_size),
            layout: config.layout,
            config,
            renderer,
            random: Box::new(random),
            lanes: Vec::new(),
            pending: VecDeque::new(),
            display: DisplayBounds::default(),
            next_id: 0,
            dropped: 0,
            paused: false,
        }
    }

    /// Replace the random source used for speed coefficients and jitter.
    #[must_use]
    pub fn with_random_source(mut self, source: impl RandomSource + 'static) -> Self {
        self.random = Box::new(source);
        self
    }

    /// Configuration this scheduler runs with.
    #[inline]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The render collaborator.
    #[inline]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable access to the render collaborator.
    #[inline]
    pub const fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Lanes, top to bottom.
    #[inline]
    pub fn lanes(&self) -> &[Lane<T, R::Handle>] {
        &self.lanes
    }

    /// The active item pool.
    #[inline]
    pub const fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Display bounds from the last [`configure_lanes`](Self::configure_lanes).
    #[inline]
    pub const fn display(&self) -> DisplayBounds {
        self.display
    }

    /// Number of content items waiting for admission.
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Content dropped by the queue policy so far.
    #[inline]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Whether movement and admission are suspended.
    #[inline]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Carve the display into lanes.
    ///
    /// `lane_height = item_height + 2 * vertical_gap` and the lane count is
    /// `min(floor(display_height / lane_height), max_lane_count)`. Any active
    /// items are disposed first. Returns the number of lanes created.
    pub fn configure_lanes(&mut self, bounds: DisplayBounds, layout: LaneLayout) -> usize {
        self.halt();

        let count = layout.lane_count(bounds.height);
        self.display = bounds;
        self.layout = layout;
        self.lanes = (0..count).map(|_| Lane::new()).collect();

        info!(
            lanes = count,
            lane_height = layout.lane_height(),
            display_width = bounds.width,
            display_height = bounds.height,
            "configured lanes"
        );
        count
    }

    /// Queue content for admission, applying the queue policy.
    ///
    /// Returns `false` if the content itself was rejected.
    pub fn put_data(&mut self, content: T) -> bool {
        match self.config.queue {
            QueuePolicy::Unbounded => {}
            QueuePolicy::DropOldest { capacity } => {
                while self.pending.len() >= capacity.max(1) {
                    self.pending.pop_front();
                    self.dropped += 1;
                    warn!(capacity, dropped = self.dropped, "pending queue full, dropped oldest");
                }
            }
            QueuePolicy::DropNewest { capacity } => {
                if self.pending.len() >= capacity.max(1) {
                    self.dropped += 1;
                    warn!(capacity, dropped = self.dropped, "pending queue full, dropped newest");
                    return false;
                }
            }
        }
        self.pending.push_back(content);
        true
    }

    /// Pick the lane with the smallest occupancy among those with
    /// `occupied_width <= display_width`. Ties go to the lowest index.
    pub fn select_lane(&self) -> Option<usize> {
        let limit = self.display.width;
        let mut best: Option<(usize, f32)> = None;
        for (index, lane) in self.lanes.iter().enumerate() {
            let occupied = lane.occupied_width();
            if occupied > limit {
                continue;
            }
            match best {
                Some((_, min)) if occupied >= min => {}
                _ => best = Some((index, occupied)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Move the head of the pending queue into a lane.
    ///
    /// Returns `None` when paused, when the pool is full, when nothing is
    /// pending, or when no lane has room. None of these are errors.
    #[allow(clippy::cast_precision_loss)]
    pub fn admit(&mut self) -> Option<ItemId> {
        if self.paused || self.pool.is_full() || self.pending.is_empty() {
            return None;
        }
        let lane_index = self.select_lane()?;
        let content = self.pending.pop_front()?;

        let placement = Placement {
            lane: lane_index,
            top: (lane_index as f32).mul_add(self.layout.lane_height(), self.layout.vertical_gap),
            height: self.layout.item_height,
        };
        let visual = self.renderer.materialize(&content, placement);
        let size = self.renderer.measure(&visual);
        let speed = self.assign_speed(lane_index);

        let display_width = self.display.width;
        let jitter = self.random.next_range(0.0, OCCUPANCY_JITTER);
        let occupied = OCCUPANCY_WIDTH_FACTOR.mul_add(size.width, display_width) + jitter;

        let id = ItemId(self.next_id);
        self.next_id += 1;

        let translation = Translation {
            from: display_width,
            to: -size.width,
            duration: Duration::try_from_secs_f32(occupied / speed).unwrap_or(Duration::ZERO),
        };
        self.renderer.animate_translation(&visual, translation);

        let lane = &mut self.lanes[lane_index];
        lane.set_occupied_width(occupied);
        lane.push(Item::new(id, content, visual, size, display_width, speed));
        self.pool.insert(id);

        debug!(
            lane = lane_index,
            item = id.0,
            speed,
            width = size.width,
            occupied,
            "admitted item"
        );
        Some(id)
    }

    /// Run one tick: admit at most one item, advance every item by one
    /// interval, then retire items that have left the display.
    pub fn tick(&mut self) -> TickReport {
        let admitted = self.admit();
        let retired = self.advance(self.config.tick_interval().as_secs_f32());
        TickReport { admitted, retired }
    }

    /// Cancel and dispose every active item, empty all lanes and the pool.
    ///
    /// Pending content is kept. Safe to call repeatedly.
    pub fn halt(&mut self) {
        let mut disposed = 0usize;
        for lane in &mut self.lanes {
            for item in lane.reset() {
                self.renderer.cancel_animation(item.visual());
                self.renderer.dispose(item.into_visual());
                disposed += 1;
            }
        }
        self.pool.clear();
        self.paused = false;

        if disposed > 0 {
            debug!(disposed, "halted scheduler");
        }
    }

    /// Freeze every active item and suspend admission.
    pub fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        for lane in &mut self.lanes {
            for item in lane.items_mut() {
                item.set_paused(true);
                self.renderer.pause_animation(item.visual());
            }
        }
    }

    /// Undo [`pause`](Self::pause).
    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        for lane in &mut self.lanes {
            for item in lane.items_mut() {
                item.set_paused(false);
                self.renderer.resume_animation(item.visual());
            }
        }
    }

    /// Capture the current lane, pool and queue state.
    pub fn snapshot(&self) -> SchedulerSnapshot {
        let lanes = self
            .lanes
            .iter()
            .map(|lane| LaneSnapshot {
                items: lane
                    .items()
                    .iter()
                    .map(|item| ItemSnapshot {
                        id: item.id(),
                        offset: item.offset(),
                        speed: item.speed(),
                        width: item.width(),
                        paused: item.is_paused(),
                    })
                    .collect(),
                occupied_width: lane.occupied_width(),
            })
            .collect();

        SchedulerSnapshot {
            lanes,
            pool_len: self.pool.len(),
            pending: self.pending.len(),
            dropped: self.dropped,
            paused: self.paused,
        }
    }

    /// Speed for the next item in `lane_index`.
    fn assign_speed(&mut self, lane_index: usize) -> f32 {
        let max_speed = self.config.max_speed();
        let lane = &self.lanes[lane_index];
        match lane.last() {
            None => {
                let (low, high) = SPEED_COEFFICIENT;
                let coefficient = self.random.next_range(low, high);
                (self.config.base_speed * coefficient).clamp(0.0, max_speed)
            }
            Some(previous) => chase_speed(
                self.display.width,
                previous.speed(),
                lane.occupied_width(),
                max_speed,
            ),
        }
    }

    /// Advance all lanes by `dt_secs` and retire exhausted items.
    ///
    /// Removal happens after each lane's pass so the item sequence is never
    /// mutated while it is being walked.
    fn advance(&mut self, dt_secs: f32) -> usize {
        let margin = self.config.retire_margin;
        let mut exhausted = Vec::new();
        let mut retired = 0;

        for (lane_index, lane) in self.lanes.iter_mut().enumerate() {
            exhausted.clear();
            for (index, item) in lane.items_mut().iter_mut().enumerate() {
                item.advance(dt_secs);
                if item.is_exhausted(margin) {
                    exhausted.push(index);
                }
            }
            lane.advance_occupancy(dt_secs);

            for &index in exhausted.iter().rev() {
                if let Some(item) = lane.remove(index) {
                    self.pool.remove(item.id());
                    trace!(lane = lane_index, item = item.id().0, "retired item");
                    self.renderer.dispose(item.into_visual());
                    retired += 1;
                }
            }
        }
        retired
    }
}
