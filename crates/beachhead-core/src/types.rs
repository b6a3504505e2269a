//! Fundamental spatial, identity, and simulation-time types.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Opaque entity handle exchanged with external collaborators.
///
/// The simulation maps these to its internal entity handles; an id that no
/// longer resolves to a live entity is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Placement of an entity in the world.
/// x = East, y = Up, z = North. Rotation is about the vertical axis only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Transform at `position` with identity rotation.
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Yaw in whole degrees, normalised to `0..360`.
    pub fn yaw_degrees(&self) -> f32 {
        let (axis, angle) = self.rotation.to_axis_angle();
        let signed = if axis.y < 0.0 { -angle } else { angle };
        signed.to_degrees().rem_euclid(360.0).round() % 360.0
    }
}

/// Point where the placement cursor ray hit a surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceHit {
    pub point: Vec3,
    /// Layer index of the surface that was hit.
    pub layer: u32,
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Seconds per tick at the fixed tick rate.
    pub fn dt(&self) -> f64 {
        crate::constants::DT
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs = self.tick as f64 * self.dt();
    }
}
