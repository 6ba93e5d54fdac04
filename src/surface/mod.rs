//! Surface module: a terminal implementation of the render collaborator.
//!
//! This module contains:
//! - [`TerminalSurface`]: shared visual layer driven by the scheduler and painted by the UI
//! - [`FrameWriter`]: single-write ANSI frame buffer
//! - [`TerminalGuard`]: raw mode / alternate screen for the lifetime of a UI

mod output;
mod terminal;

pub use output::{FrameWriter, Rgb};
pub use terminal::{clip_to_columns, TerminalGuard, TerminalSurface, VisualId};
