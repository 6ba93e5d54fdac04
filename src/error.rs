//! Error types for configuration loading and the threaded controller.
//!
//! Scheduling itself never fails: an empty queue, a full pool or a lane
//! without room are ordinary outcomes reported through return values.

use std::io;
use thiserror::Error;

/// Errors raised while loading or validating a [`SchedulerConfig`](crate::SchedulerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    /// The document is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field holds a value the scheduler cannot run with.
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        /// Dotted field path, e.g. `layout.item_height`.
        field: &'static str,
        /// Human readable constraint that was violated.
        reason: &'static str,
    },
}

/// Errors raised by [`DanmakuController`](crate::DanmakuController).
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Lane layout can only change while the tick loop is stopped.
    #[error("operation requires the tick loop to be stopped")]
    Running,

    /// The OS refused to spawn the tick thread.
    #[error("failed to spawn tick thread: {0}")]
    Spawn(#[source] io::Error),

    /// The tick thread panicked; scheduler state may be inconsistent.
    #[error("tick loop panicked")]
    TickLoopPanicked,

    /// Scheduler state was poisoned by an earlier panic.
    #[error("scheduler state poisoned by an earlier panic")]
    Poisoned,
}
