//! Obstacle contact behaviour.
//!
//! Walls lose health while an enemy presses against them: one hit on
//! contact, then one every wall contact interval until the enemy
//! leaves, either party becomes inactive, or the wall breaks. Spike traps
//! strike every enemy inside them on their own interval, starting on entry.

use std::collections::HashMap;

use hecs::{Entity, World};
use log::debug;

use beachhead_core::components::Obstacle;
use beachhead_core::enums::ObstacleKind;

use crate::scheduler::{CancelToken, Scheduler};
use crate::systems::enemy::{self, DamageOutcome};
use crate::tasks::Task;

/// Outcome of one wall contact step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WallStep {
    /// Wall took damage and stands; run again after the contact interval.
    Pressed { remaining: f32 },
    /// Wall health reached zero and it was removed.
    Broken,
    /// Wall or enemy is gone; the contact is over.
    Finished,
}

/// Outcome of one spike strike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpikeStep {
    /// Enemy survived; strike again after `interval_secs`.
    Struck { interval_secs: f64 },
    /// Enemy was killed by this strike.
    Killed,
    /// Trap or enemy is gone; the contact is over.
    Finished,
}

/// Live obstacle contacts, one repeating task per (obstacle, enemy) pair.
#[derive(Debug, Default)]
pub struct Hazards {
    contacts: HashMap<(Entity, Entity), CancelToken>,
}

impl Hazards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the contact loop for an enemy entering an obstacle.
    /// Ignored if the pair is already in contact or either side is inactive.
    pub fn engage(
        &mut self,
        world: &World,
        scheduler: &mut Scheduler<Task>,
        obstacle: Entity,
        enemy: Entity,
    ) -> bool {
        if self.contacts.contains_key(&(obstacle, enemy)) {
            return false;
        }
        let Ok(kind) = world.get::<&Obstacle>(obstacle).map(|o| o.kind) else {
            debug!("contact with non-obstacle {obstacle:?} ignored");
            return false;
        };
        if !enemy::is_alive(world, enemy) {
            return false;
        }

        let task = match kind {
            ObstacleKind::Wall => Task::WallContact {
                wall: obstacle,
                enemy,
            },
            ObstacleKind::Spikes => Task::SpikeStrike {
                trap: obstacle,
                enemy,
            },
        };
        let token = scheduler.schedule(0.0, task);
        self.contacts.insert((obstacle, enemy), token);
        true
    }

    /// Stop the contact loop for an enemy leaving an obstacle.
    pub fn disengage(&mut self, obstacle: Entity, enemy: Entity) -> bool {
        match self.contacts.remove(&(obstacle, enemy)) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Stop every contact involving `enemy`.
    pub fn release_enemy(&mut self, enemy: Entity) {
        self.contacts.retain(|&(_, e), token| {
            if e == enemy {
                token.cancel();
            }
            e != enemy
        });
    }

    /// Stop every contact involving `obstacle`.
    pub fn release_obstacle(&mut self, obstacle: Entity) {
        self.contacts.retain(|&(o, _), token| {
            if o == obstacle {
                token.cancel();
            }
            o != obstacle
        });
    }

    pub fn cancel_all(&mut self) {
        for (_, token) in self.contacts.drain() {
            token.cancel();
        }
    }

    pub fn active_contacts(&self) -> usize {
        self.contacts.len()
    }
}

/// One round of enemy pressure on a wall.
pub fn wall_contact_step(world: &mut World, wall: Entity, enemy: Entity) -> WallStep {
    if !enemy::is_alive(world, enemy) {
        return WallStep::Finished;
    }
    let Some(damage) = enemy::damage_of(world, enemy) else {
        return WallStep::Finished;
    };

    let remaining = {
        let Ok(mut obstacle) = world.get::<&mut Obstacle>(wall) else {
            return WallStep::Finished;
        };
        obstacle.health -= damage;
        obstacle.health
    };

    if remaining > 0.0 {
        WallStep::Pressed { remaining }
    } else {
        let _ = world.despawn(wall);
        WallStep::Broken
    }
}

/// One spike strike against an enemy standing in the trap.
pub fn spike_strike_step(world: &mut World, trap: Entity, enemy: Entity) -> SpikeStep {
    let Ok((damage, interval_secs)) = world
        .get::<&Obstacle>(trap)
        .map(|o| (o.damage, o.strike_interval_secs))
    else {
        return SpikeStep::Finished;
    };

    match enemy::receive_damage(world, enemy, damage) {
        DamageOutcome::Wounded { .. } => SpikeStep::Struck { interval_secs },
        DamageOutcome::Killed => SpikeStep::Killed,
        DamageOutcome::Ignored => SpikeStep::Finished,
    }
}
