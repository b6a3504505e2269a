//! Simulation engine for Beachhead.
//!
//! Owns the hecs ECS world, runs systems at a fixed tick rate,
//! and produces MatchSnapshots for the presentation layer.

pub mod bus;
pub mod engine;
pub mod ids;
pub mod orchestrator;
pub mod pool;
pub mod scenario;
pub mod scheduler;
pub mod systems;
pub mod tasks;
pub mod world_setup;

pub use beachhead_core as core;
pub use engine::SimulationEngine;

#[cfg(test)]
mod tests;
