//! Actor Model: the scheduler on its own tick thread.
//!
//! This module runs a [`Scheduler`](crate::Scheduler) behind a small actor
//! system built on crossbeam channels:
//! - **Producers**: any thread holding a [`Producer`] sends content
//! - **Tick Loop**: drains commands, admits, advances and retires items
//! - **Controller**: owns the lifecycle (configure, start, stop, pause)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   Command::Put    ┌──────────────┐   Renderer calls   ┌──────────────┐
//! │  Producer(s) │ ────────────────▶ │  Tick Loop   │ ─────────────────▶ │ Visual layer │
//! └──────────────┘                   └──────────────┘                    └──────────────┘
//!                                           ▲
//!                        start/stop/pause   │ Arc<Mutex<Scheduler>>
//!                                    ┌──────────────┐
//!                                    │  Controller  │
//!                                    └──────────────┘
//! ```

mod controller;
mod messages;
mod ticker;

pub use controller::DanmakuController;
pub use messages::{Command, Producer};
