//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems, not components.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Combat state of an enemy instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub category: EnemyCategory,
    /// Current health. Never increases while the enemy is alive.
    pub health: f32,
    /// Health restored on every activation.
    pub max_health: f32,
    /// Navigation speed (units per second).
    pub speed: f32,
    /// Damage dealt to towers and walls on contact.
    pub damage: f32,
    pub status: EnemyStatus,
}

/// Navigation intent of an enemy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Navigation {
    /// Candidate destinations. One is drawn per activation.
    pub destinations: Vec<Vec3>,
    /// Destination committed for the current activation, if any.
    pub target: Option<Vec3>,
    /// Bumped on every activation. Delayed orders carry the value they were
    /// issued under and are dropped if the instance was recycled since.
    pub activation: u32,
}

/// Marks a pooled instance as inert and available for reuse.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Dormant;

/// A placed obstacle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    /// Index of the obstacle template this instance was built from.
    pub template: usize,
    pub kind: ObstacleKind,
    pub health: f32,
    pub damage: f32,
    /// Seconds between spike strikes. Unused by walls.
    pub strike_interval_secs: f64,
}

/// Non-colliding placement preview following the cursor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Preview {
    pub template: usize,
    /// Whether the preview is currently shown (a valid placement spot).
    pub visible: bool,
}

/// A defended structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tower {
    pub health: f32,
    /// Set once when health first reaches zero.
    pub destroyed: bool,
}
