//! Scenario definitions: bundled match configurations.
//!
//! Each scenario defines wave composition, countdowns, obstacle templates
//! with their per-wave quotas, enemy archetypes, and tower layout.

use std::collections::BTreeMap;

use glam::Vec3;

use beachhead_core::config::*;
use beachhead_core::constants::{DEFAULT_PLACEMENT_LAYER, DEFAULT_SEED, DEFAULT_SPAWN_CADENCE_SECS};
use beachhead_core::enums::{EnemyCategory, ObstacleKind};

/// "Beach Assault": 3 waves against three shoreline towers.
/// Runners first, then infantry, then armour behind a screen of runners.
pub fn beach_assault() -> MatchConfig {
    let towers = vec![
        Vec3::new(-12.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -4.0),
        Vec3::new(12.0, 0.0, 0.0),
    ];

    MatchConfig {
        seed: DEFAULT_SEED,
        waves: vec![
            // Wave 1: 6x Tiny
            WaveDescriptor {
                enemies: vec![(EnemyCategory::Tiny, 6)],
            },
            // Wave 2: 6x Tiny + 4x Medium
            WaveDescriptor {
                enemies: vec![(EnemyCategory::Tiny, 6), (EnemyCategory::Medium, 4)],
            },
            // Wave 3: 8x Tiny + 4x Medium + 2x Tank
            WaveDescriptor {
                enemies: vec![
                    (EnemyCategory::Tiny, 8),
                    (EnemyCategory::Medium, 4),
                    (EnemyCategory::Tank, 2),
                ],
            },
        ],
        wave_durations_secs: vec![45.0, 60.0, 75.0],
        spawn_cadence_secs: DEFAULT_SPAWN_CADENCE_SECS,
        spawn_position: Vec3::new(0.0, 0.0, 60.0),
        destinations: towers.clone(),
        enemy_templates: vec![
            EnemyTemplate {
                category: EnemyCategory::Tiny,
                health: 20.0,
                speed: 6.0,
                damage: 5.0,
            },
            EnemyTemplate {
                category: EnemyCategory::Medium,
                health: 50.0,
                speed: 4.0,
                damage: 10.0,
            },
            EnemyTemplate {
                category: EnemyCategory::Tank,
                health: 150.0,
                speed: 2.0,
                damage: 25.0,
            },
        ],
        obstacle_templates: vec![
            ObstacleTemplate {
                name: "Sandbag Wall".into(),
                description: "Blocks the path until it is pushed over.".into(),
                kind: ObstacleKind::Wall,
                health: 60.0,
                damage: 0.0,
                strike_interval_secs: 1.0,
                initial_max_count: 3,
            },
            ObstacleTemplate {
                name: "Spike Pit".into(),
                description: "Hurts everything standing in it.".into(),
                kind: ObstacleKind::Spikes,
                health: 40.0,
                damage: 8.0,
                strike_interval_secs: 1.0,
                initial_max_count: 5,
            },
            ObstacleTemplate {
                name: "Barbed Wire".into(),
                description: "Light, fast, and cheap.".into(),
                kind: ObstacleKind::Spikes,
                health: 25.0,
                damage: 3.0,
                strike_interval_secs: 0.5,
                initial_max_count: 5,
            },
        ],
        quota_schedule: BTreeMap::from([
            (1, vec![3, 5, 5]),
            (2, vec![5, 6, 8]),
            (3, vec![2, 1, 10]),
        ]),
        towers: towers
            .into_iter()
            .map(|position| TowerConfig {
                position,
                health: 200.0,
            })
            .collect(),
        placement_layer: DEFAULT_PLACEMENT_LAYER,
    }
}

/// "Drill": one short wave of runners against a single tower.
pub fn drill() -> MatchConfig {
    let mut config = beach_assault();
    config.waves.truncate(1);
    config.waves[0].enemies = vec![(EnemyCategory::Tiny, 3)];
    config.wave_durations_secs = vec![10.0];
    config.quota_schedule.retain(|&wave, _| wave == 1);
    config.towers.truncate(1);
    config.destinations = vec![config.towers[0].position];
    config
}

/// Look up a bundled scenario by name.
pub fn by_name(name: &str) -> Option<MatchConfig> {
    match name {
        "beach_assault" => Some(beach_assault()),
        "drill" => Some(drill()),
        _ => None,
    }
}
