//! Scheduled continuations run by the engine.

use hecs::Entity;

/// One step of a long-running sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Release the next enemy of the current wave roster.
    ReleaseNext,
    /// End an enemy's orientation period and pick its destination.
    Orient { enemy: Entity, activation: u32 },
    /// Apply one round of enemy pressure to a wall.
    WallContact { wall: Entity, enemy: Entity },
    /// Strike an enemy standing in a spike trap.
    SpikeStrike { trap: Entity, enemy: Entity },
}
