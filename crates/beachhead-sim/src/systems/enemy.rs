//! Enemy lifecycle: pooled activation, damage, death, recall, and the
//! delayed navigation order issued after orientation.

use glam::Vec3;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use beachhead_core::components::{Dormant, Enemy, Navigation};
use beachhead_core::config::EnemyTemplate;
use beachhead_core::constants::ENEMY_ACCELERATION_FACTOR;
use beachhead_core::enums::{EnemyCategory, EnemyStatus};
use beachhead_core::events::NavigationOrder;
use beachhead_core::types::Transform;

use crate::ids::entity_id;
use crate::pool::Prefab;

/// Builds and resets enemy instances of one category.
#[derive(Debug, Clone)]
pub struct EnemyPrefab {
    pub template: EnemyTemplate,
    pub destinations: Vec<Vec3>,
}

impl Prefab for EnemyPrefab {
    type Key = EnemyCategory;

    fn key(&self) -> EnemyCategory {
        self.template.category
    }

    fn instantiate(&self, world: &mut World) -> Entity {
        world.spawn((
            Enemy {
                category: self.template.category,
                health: self.template.health,
                max_health: self.template.health,
                speed: self.template.speed,
                damage: self.template.damage,
                status: EnemyStatus::Alive,
            },
            Navigation {
                destinations: self.destinations.clone(),
                target: None,
                activation: 0,
            },
            Transform::default(),
        ))
    }

    fn reactivate(&self, world: &mut World, entity: Entity) {
        if let Ok(mut enemy) = world.get::<&mut Enemy>(entity) {
            enemy.health = enemy.max_health;
            enemy.status = EnemyStatus::Alive;
        }
        if let Ok(mut nav) = world.get::<&mut Navigation>(entity) {
            nav.target = None;
            nav.activation = nav.activation.wrapping_add(1);
        }
    }
}

/// Result of applying damage to an enemy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Not an active enemy, or a negative amount.
    Ignored,
    Wounded { remaining: f32 },
    /// Health reached zero on this hit.
    Killed,
}

pub fn is_alive(world: &World, entity: Entity) -> bool {
    world
        .get::<&Enemy>(entity)
        .map(|e| e.status == EnemyStatus::Alive)
        .unwrap_or(false)
}

pub fn category_of(world: &World, entity: Entity) -> Option<EnemyCategory> {
    world.get::<&Enemy>(entity).ok().map(|e| e.category)
}

pub fn damage_of(world: &World, entity: Entity) -> Option<f32> {
    world.get::<&Enemy>(entity).ok().map(|e| e.damage)
}

pub fn activation_of(world: &World, entity: Entity) -> Option<u32> {
    world.get::<&Navigation>(entity).ok().map(|n| n.activation)
}

/// Subtract `amount` from an active enemy's health, killing it at zero.
pub fn receive_damage(world: &mut World, entity: Entity, amount: f32) -> DamageOutcome {
    let killed = {
        let Ok(mut enemy) = world.get::<&mut Enemy>(entity) else {
            return DamageOutcome::Ignored;
        };
        if enemy.status != EnemyStatus::Alive || amount.is_nan() || amount < 0.0 {
            return DamageOutcome::Ignored;
        }
        enemy.health -= amount;
        if enemy.health > 0.0 {
            return DamageOutcome::Wounded {
                remaining: enemy.health,
            };
        }
        enemy.health = 0.0;
        true
    };

    if killed && die(world, entity) {
        DamageOutcome::Killed
    } else {
        DamageOutcome::Ignored
    }
}

/// Deactivate an enemy whose health ran out. Returns `false` if it was not
/// active.
pub fn die(world: &mut World, entity: Entity) -> bool {
    deactivate(world, entity, EnemyStatus::Killed)
}

/// Pull an active enemy off the field at wave end.
pub fn recall(world: &mut World, entity: Entity) -> bool {
    deactivate(world, entity, EnemyStatus::Recalled)
}

fn deactivate(world: &mut World, entity: Entity, status: EnemyStatus) -> bool {
    {
        let Ok(mut enemy) = world.get::<&mut Enemy>(entity) else {
            return false;
        };
        if enemy.status != EnemyStatus::Alive {
            return false;
        }
        enemy.status = status;
    }
    let _ = world.insert_one(entity, Dormant);
    true
}

/// End the orientation period: draw a destination uniformly at random and
/// issue the navigation order.
///
/// Dropped when the enemy is no longer alive, already has a target, or was
/// recycled since the order was scheduled.
pub fn choose_destination(
    world: &mut World,
    entity: Entity,
    activation: u32,
    rng: &mut ChaCha8Rng,
) -> Option<NavigationOrder> {
    let (speed, alive) = {
        let enemy = world.get::<&Enemy>(entity).ok()?;
        (enemy.speed, enemy.status == EnemyStatus::Alive)
    };
    if !alive {
        return None;
    }

    let mut nav = world.get::<&mut Navigation>(entity).ok()?;
    if nav.activation != activation || nav.target.is_some() || nav.destinations.is_empty() {
        return None;
    }
    let destination = nav.destinations[rng.gen_range(0..nav.destinations.len())];
    nav.target = Some(destination);

    Some(NavigationOrder::MoveTo {
        entity: entity_id(entity),
        destination,
        speed,
        acceleration: speed * ENEMY_ACCELERATION_FACTOR,
    })
}
