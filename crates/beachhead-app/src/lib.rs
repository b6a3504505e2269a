//! Beachhead host application.
//!
//! Drives the simulation engine from a fixed-rate game loop thread and
//! exposes the latest snapshot to whoever renders it.

pub mod error;
pub mod game_loop;
pub mod state;

pub use beachhead_core as core;
pub use error::AppError;
