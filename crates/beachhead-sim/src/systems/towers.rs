//! Tower damage from breaching enemies.

use hecs::{Entity, World};

use beachhead_core::components::Tower;

use crate::systems::enemy;

/// Result of an enemy reaching a tower.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreachOutcome {
    /// Tower already down, or the intruder is not an active enemy.
    Ignored,
    Damaged { remaining: f32 },
    /// Health reached zero on this breach. Reported once per tower.
    Destroyed,
}

/// Apply the breaching enemy's damage to the tower.
pub fn breach(world: &mut World, tower: Entity, intruder: Entity) -> BreachOutcome {
    if !enemy::is_alive(world, intruder) {
        return BreachOutcome::Ignored;
    }
    let Some(damage) = enemy::damage_of(world, intruder) else {
        return BreachOutcome::Ignored;
    };
    let Ok(mut state) = world.get::<&mut Tower>(tower) else {
        return BreachOutcome::Ignored;
    };
    if state.destroyed {
        return BreachOutcome::Ignored;
    }

    state.health -= damage;
    if state.health > 0.0 {
        return BreachOutcome::Damaged {
            remaining: state.health,
        };
    }
    state.health = 0.0;
    state.destroyed = true;
    BreachOutcome::Destroyed
}
