//! Entity factories for setting up a match world.
//!
//! Creates tower entities, builds one enemy prefab per configured category,
//! and prewarms the enemy pool so no wave allocates mid-release.

use std::collections::HashMap;

use hecs::{Entity, World};
use log::warn;

use beachhead_core::components::Tower;
use beachhead_core::config::MatchConfig;
use beachhead_core::enums::EnemyCategory;
use beachhead_core::types::Transform;

use crate::pool::ObjectPool;
use crate::systems::enemy::EnemyPrefab;

/// Spawn every configured tower at full health.
pub fn spawn_towers(world: &mut World, config: &MatchConfig) -> Vec<Entity> {
    config
        .towers
        .iter()
        .map(|tower| {
            world.spawn((
                Tower {
                    health: tower.health,
                    destroyed: false,
                },
                Transform::at(tower.position),
            ))
        })
        .collect()
}

/// One prefab per enemy category that has a template.
///
/// Categories used by a wave but lacking a template are logged; their
/// releases are skipped at spawn time.
pub fn build_enemy_prefabs(config: &MatchConfig) -> HashMap<EnemyCategory, EnemyPrefab> {
    let mut prefabs = HashMap::new();
    for category in EnemyCategory::ALL {
        match config.enemy_template(category) {
            Some(template) => {
                prefabs.insert(
                    category,
                    EnemyPrefab {
                        template: template.clone(),
                        destinations: config.destinations.clone(),
                    },
                );
            }
            None if config.peak_count(category) > 0 => {
                warn!("waves use {category:?} enemies but no template is configured");
            }
            None => {}
        }
    }
    prefabs
}

/// Prewarm the pool with each category's largest single-wave count.
pub fn prewarm_enemies(
    world: &mut World,
    pool: &mut ObjectPool<EnemyCategory>,
    prefabs: &HashMap<EnemyCategory, EnemyPrefab>,
    config: &MatchConfig,
) {
    for category in EnemyCategory::ALL {
        pool.prewarm(world, prefabs.get(&category), config.peak_count(category));
    }
}
