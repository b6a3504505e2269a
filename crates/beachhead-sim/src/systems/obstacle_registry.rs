//! Placed obstacles awaiting end-of-wave cleanup.

use hecs::{Entity, World};

#[derive(Debug, Default)]
pub struct ObstacleRegistry {
    tracked: Vec<Entity>,
}

impl ObstacleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a placed obstacle. Registering twice is a no-op.
    pub fn register(&mut self, obstacle: Entity) {
        if !self.tracked.contains(&obstacle) {
            self.tracked.push(obstacle);
        }
    }

    /// Destroy every tracked obstacle still alive and forget all of them.
    /// Returns how many were destroyed.
    pub fn clear_all(&mut self, world: &mut World) -> usize {
        self.tracked
            .drain(..)
            .filter(|&e| world.despawn(e).is_ok())
            .count()
    }

    pub fn tracked(&self) -> &[Entity] {
        &self.tracked
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }
}
