//! Events emitted by the simulation for presentation, audio, and navigation.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::EntityId;

/// Match notifications. Published on the event bus and mirrored into the
/// snapshot for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MatchEvent {
    /// A wave was sent. `wave_index` is zero-based.
    WaveStarted { wave_index: u32 },
    /// The wave countdown reached zero; the defenders survived it.
    WaveEnded { wave_number: u32 },
    /// An enemy was released onto the field.
    EnemySpawned {
        enemy: EntityId,
        category: EnemyCategory,
    },
    /// An enemy's health reached zero.
    EnemyKilled {
        enemy: EntityId,
        category: EnemyCategory,
    },
    /// An obstacle was placed.
    ObstaclePlaced { obstacle: EntityId, template: usize },
    /// An obstacle's health reached zero.
    ObstacleDestroyed { obstacle: EntityId },
    /// A tower fell. `remaining` counts towers still standing.
    TowerDestroyed { tower: EntityId, remaining: u32 },
    /// Every configured wave was survived.
    Won,
    /// Every tower was destroyed.
    Lost,
}

/// Instructions for the navigation collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NavigationOrder {
    /// Move the entity toward `destination`.
    MoveTo {
        entity: EntityId,
        destination: Vec3,
        speed: f32,
        acceleration: f32,
    },
    /// Stop moving the entity; it has become inert.
    Halt { entity: EntityId },
}
