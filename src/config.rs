//! Scheduler configuration.
//!
//! [`SchedulerConfig`] works as a plain struct with sensible defaults, and
//! can also be read from a (possibly partial) TOML document:
//!
//! ```toml
//! tick_interval_ms = 32
//! base_speed = 12.0
//!
//! [layout]
//! item_height = 1.0
//! vertical_gap = 0.0
//! max_lane_count = 8
//!
//! [queue]
//! policy = "drop_newest"
//! capacity = 64
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// How lanes are carved out of the display height.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LaneLayout {
    /// Height of a single item.
    pub item_height: f32,
    /// Gap kept above and below an item inside its lane.
    pub vertical_gap: f32,
    /// Upper bound on the number of lanes.
    pub max_lane_count: usize,
}

impl LaneLayout {
    /// Height of one lane: the item plus a gap on each side.
    #[inline]
    pub fn lane_height(&self) -> f32 {
        2.0f32.mul_add(self.vertical_gap, self.item_height)
    }

    /// Number of lanes that fit into `display_height`, capped at `max_lane_count`.
    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    pub fn lane_count(&self, display_height: f32) -> usize {
        let lane_height = self.lane_height();
        if !(lane_height.is_finite() && lane_height > 0.0 && display_height > 0.0) {
            return 0;
        }
        let fit = (display_height / lane_height).floor() as usize;
        fit.min(self.max_lane_count)
    }
}

impl Default for LaneLayout {
    fn default() -> Self {
        Self {
            item_height: 50.0,
            vertical_gap: 10.0,
            max_lane_count: 2,
        }
    }
}

/// What happens to new content when the pending queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum QueuePolicy {
    /// Never drop; the queue grows without limit.
    Unbounded,
    /// Evict the oldest pending item to make room.
    DropOldest {
        /// Maximum pending items.
        capacity: usize,
    },
    /// Reject the incoming item.
    DropNewest {
        /// Maximum pending items.
        capacity: usize,
    },
}

impl QueuePolicy {
    /// Queue capacity, or `None` when unbounded.
    pub const fn capacity(&self) -> Option<usize> {
        match *self {
            Self::Unbounded => None,
            Self::DropOldest { capacity } | Self::DropNewest { capacity } => Some(capacity),
        }
    }
}

impl Default for QueuePolicy {
    fn default() -> Self {
        Self::DropOldest { capacity: 256 }
    }
}

/// Configuration for the [`Scheduler`](crate::Scheduler) and its tick loop.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Tick cadence in milliseconds; also the simulated time step.
    pub tick_interval_ms: u64,
    /// Nominal traversal speed in display units per second.
    pub base_speed: f32,
    /// Maximum number of concurrently active items.
    pub max_pool_size: usize,
    /// Distance an item must travel past the left edge before it is retired.
    pub retire_margin: f32,
    /// Delay between `stop()` and the surface cleanup hook.
    pub cleanup_grace_ms: u64,
    /// Fixed seed for speed and jitter randomness. `None` seeds from the clock.
    pub seed: Option<u64>,
    /// Lane geometry.
    pub layout: LaneLayout,
    /// Pending queue policy.
    pub queue: QueuePolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 64,
            base_speed: 200.0,
            max_pool_size: 20,
            retire_margin: 5.0,
            cleanup_grace_ms: 1000,
            seed: None,
            layout: LaneLayout::default(),
            queue: QueuePolicy::default(),
        }
    }
}

impl SchedulerConfig {
    /// Parse and validate a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Tick interval as a [`Duration`].
    #[inline]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Grace delay before surface cleanup as a [`Duration`].
    #[inline]
    pub const fn cleanup_grace(&self) -> Duration {
        Duration::from_millis(self.cleanup_grace_ms)
    }

    /// Upper bound on any computed item speed.
    #[inline]
    pub fn max_speed(&self) -> f32 {
        self.base_speed * 2.0
    }

    /// Check every field against the ranges the scheduler relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });

        if self.tick_interval_ms == 0 {
            return invalid("tick_interval_ms", "must be greater than zero");
        }
        if !self.base_speed.is_finite() || self.base_speed <= 0.0 {
            return invalid("base_speed", "must be a positive finite number");
        }
        if self.max_pool_size == 0 {
            return invalid("max_pool_size", "must be greater than zero");
        }
        if !self.retire_margin.is_finite() || self.retire_margin < 0.0 {
            return invalid("retire_margin", "must be a non-negative finite number");
        }
        if !self.layout.item_height.is_finite() || self.layout.item_height <= 0.0 {
            return invalid("layout.item_height", "must be a positive finite number");
        }
        if !self.layout.vertical_gap.is_finite() || self.layout.vertical_gap < 0.0 {
            return invalid("layout.vertical_gap", "must be a non-negative finite number");
        }
        if self.queue.capacity() == Some(0) {
            return invalid("queue.capacity", "must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_millis(64));
        assert_eq!(config.max_pool_size, 20);
        assert!((config.retire_margin - 5.0).abs() < f32::EPSILON);
        assert!((config.max_speed() - 400.0).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_lane_count() {
        let layout = LaneLayout {
            item_height: 30.0,
            vertical_gap: 10.0,
            max_lane_count: 5,
        };
        assert!((layout.lane_height() - 50.0).abs() < f32::EPSILON);
        assert_eq!(layout.lane_count(120.0), 2);

        // Capped by max_lane_count
        assert_eq!(layout.lane_count(10_000.0), 5);

        // Too short for a single lane
        assert_eq!(layout.lane_count(49.0), 0);
    }

    #[test]
    fn test_lane_count_degenerate() {
        let layout = LaneLayout {
            item_height: 0.0,
            vertical_gap: 0.0,
            max_lane_count: 4,
        };
        assert_eq!(layout.lane_count(100.0), 0);
    }

    #[test]
    fn test_partial_toml() {
        let config = SchedulerConfig::from_toml_str(
            r#"
            tick_interval_ms = 32
            seed = 7

            [layout]
            max_lane_count = 8

            [queue]
            policy = "drop_newest"
            capacity = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.tick_interval_ms, 32);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.layout.max_lane_count, 8);
        assert!((config.layout.item_height - 50.0).abs() < f32::EPSILON);
        assert_eq!(config.queue, QueuePolicy::DropNewest { capacity: 4 });
        assert!((config.base_speed - 200.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_unbounded_queue_toml() {
        let config = SchedulerConfig::from_toml_str("[queue]\npolicy = \"unbounded\"\n").unwrap();
        assert_eq!(config.queue, QueuePolicy::Unbounded);
        assert_eq!(config.queue.capacity(), None);
    }

    #[test]
    fn test_validation_errors() {
        let err = SchedulerConfig::from_toml_str("tick_interval_ms = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "tick_interval_ms", .. }
        ));

        let err = SchedulerConfig::from_toml_str("base_speed = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "base_speed", .. }));

        let err =
            SchedulerConfig::from_toml_str("[queue]\npolicy = \"drop_oldest\"\ncapacity = 0\n")
                .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "queue.capacity", .. }));
    }

    #[test]
    fn test_parse_error() {
        let err = SchedulerConfig::from_toml_str("tick_interval_ms = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SchedulerConfig::load("/nonexistent/danmaku.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
