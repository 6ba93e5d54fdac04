//! # Danmaku
//!
//! Lane scheduling for bullet-comment overlays.
//!
//! A continuous stream of short text items drifts right-to-left across a
//! bounded set of horizontal lanes. The scheduler decides which lane each
//! item enters, picks a speed so it never catches the item ahead, tracks
//! when a lane frees up, and retires items once they leave the display.
//!
//! ## Core Concepts
//!
//! - **Lanes**: fixed horizontal tracks with an occupancy budget
//! - **Chase speeds**: later items are paced by the item ahead of them
//! - **Fixed-cadence tick**: one thread admits, advances and retires
//! - **Render collaborator**: the visual layer sits behind a small trait
//!
//! ## Example
//!
//! ```rust,ignore
//! use danmaku::{DanmakuController, SchedulerConfig, TerminalSurface};
//!
//! let surface = TerminalSurface::new(80, 10);
//! let mut controller = DanmakuController::new(SchedulerConfig::default(), surface.clone());
//! controller.configure_lanes(surface.bounds())?;
//! controller.start()?;
//! controller.put_data("hello".to_string());
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod config;
pub mod error;
pub mod lane;
pub mod render;
pub mod rng;
pub mod scheduler;
pub mod surface;

// Re-exports for convenience
pub use actor::{DanmakuController, Producer};
pub use config::{LaneLayout, QueuePolicy, SchedulerConfig};
pub use error::{ConfigError, ControllerError};
pub use lane::{Item, ItemId, Lane, Pool};
pub use render::{Placement, Renderer, Size, Translation};
pub use rng::{DetRng, RandomSource};
pub use scheduler::{DisplayBounds, Scheduler, SchedulerSnapshot, TickReport};
pub use surface::{FrameWriter, TerminalGuard, TerminalSurface};
