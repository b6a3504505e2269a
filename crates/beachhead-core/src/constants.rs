//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

/// Remaining times within this distance of zero count as elapsed.
/// Absorbs the drift of summing `DT` in floating point.
pub const TIME_EPSILON: f64 = 1e-9;

// --- Enemies ---

/// Orientation period between activation and the first navigation order.
pub const ENEMY_ORIENTATION_SECS: f64 = 1.0;

/// Navigation acceleration as a fraction of the enemy's speed.
pub const ENEMY_ACCELERATION_FACTOR: f32 = 0.8;

// --- Obstacles ---

/// Interval between damage applications while an enemy presses against a wall.
pub const WALL_CONTACT_INTERVAL_SECS: f64 = 1.0;

/// Default interval between spike trap strikes.
pub const SPIKE_DEFAULT_INTERVAL_SECS: f64 = 1.0;

/// Preview rotation steps, in degrees about the vertical axis.
pub const PLACEMENT_ROTATION_STEPS: [f32; 2] = [0.0, 90.0];

// --- Defaults for the bundled beach scenario ---

/// Seconds between two enemy releases within a wave.
pub const DEFAULT_SPAWN_CADENCE_SECS: f64 = 0.5;

/// Surface layer that accepts obstacle placement.
pub const DEFAULT_PLACEMENT_LAYER: u32 = 6;

/// Default RNG seed.
pub const DEFAULT_SEED: u64 = 42;
