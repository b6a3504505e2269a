//! Mapping between hecs entities and the opaque ids exchanged with
//! collaborators.

use hecs::{Entity, World};

use beachhead_core::types::EntityId;

pub fn entity_id(entity: Entity) -> EntityId {
    EntityId(entity.to_bits().get())
}

/// Resolve an id to a live entity.
pub fn resolve(world: &World, id: EntityId) -> Option<Entity> {
    Entity::from_bits(id.0).filter(|&e| world.contains(e))
}
