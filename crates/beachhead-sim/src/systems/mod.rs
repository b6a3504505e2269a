//! Systems that act on the match each tick.
//!
//! Free functions take `&mut World` (or `&World` for read-only); the few
//! systems that carry state across ticks (timer, spawner, placement,
//! registry, hazards) own it in a plain struct held by the engine.

pub mod enemy;
pub mod hazards;
pub mod obstacle_registry;
pub mod placement;
pub mod snapshot;
pub mod towers;
pub mod wave_spawner;
pub mod wave_timer;
