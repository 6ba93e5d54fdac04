//! Lane module: the data the scheduler moves around.
//!
//! This module contains:
//! - [`Item`]: a single floating text instance in flight
//! - [`Lane`]: an ordered track of items plus its occupancy budget
//! - [`Pool`]: the capacity-limited set of active items

mod item;
#[allow(clippy::module_inception)]
mod lane;
mod pool;

pub use item::{Item, ItemId};
pub use lane::Lane;
pub use pool::Pool;
