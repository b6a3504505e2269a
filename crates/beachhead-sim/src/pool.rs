//! Keyed object pool over ECS entities.
//!
//! Instances are never despawned. Deactivating one means tagging it
//! [`Dormant`]; acquiring reuses the first dormant instance of the requested
//! kind and allocates a new one only when all of them are in use.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use hecs::{Entity, World};
use log::debug;

use beachhead_core::components::Dormant;
use beachhead_core::types::Transform;

/// Something the pool can build and reset instances of.
pub trait Prefab {
    type Key: Copy + Eq + Hash + Debug;

    /// Pool key of this prefab. Instances are shared among prefabs with the
    /// same key.
    fn key(&self) -> Self::Key;

    /// Spawn a fresh instance. The pool tags it dormant or active itself.
    fn instantiate(&self, world: &mut World) -> Entity;

    /// Restore a reused instance to its just-spawned state.
    fn reactivate(&self, world: &mut World, entity: Entity);
}

/// Inventories of pooled entities, one per prefab key.
#[derive(Debug)]
pub struct ObjectPool<K> {
    inventory: HashMap<K, Vec<Entity>>,
}

impl<K> Default for ObjectPool<K> {
    fn default() -> Self {
        Self {
            inventory: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash + Debug> ObjectPool<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `count` dormant instances of `prefab`.
    ///
    /// A missing prefab creates nothing.
    pub fn prewarm<P: Prefab<Key = K>>(&mut self, world: &mut World, prefab: Option<&P>, count: u32) {
        let Some(prefab) = prefab else {
            debug!("prewarm skipped: no prefab");
            return;
        };
        let slots = self.inventory.entry(prefab.key()).or_default();
        for _ in 0..count {
            let entity = prefab.instantiate(world);
            let _ = world.insert_one(entity, Dormant);
            slots.push(entity);
        }
    }

    /// Hand out an active instance of `prefab` placed at `transform`.
    ///
    /// Reuses the first dormant instance in inventory order, otherwise
    /// allocates a new one. Returns `None` only for a missing prefab.
    pub fn acquire<P: Prefab<Key = K>>(
        &mut self,
        world: &mut World,
        prefab: Option<&P>,
        transform: Transform,
    ) -> Option<Entity> {
        let Some(prefab) = prefab else {
            debug!("acquire skipped: no prefab");
            return None;
        };
        let slots = self.inventory.entry(prefab.key()).or_default();

        let reused = slots
            .iter()
            .copied()
            .find(|&e| world.get::<&Dormant>(e).is_ok());

        let entity = match reused {
            Some(entity) => {
                let _ = world.remove_one::<Dormant>(entity);
                prefab.reactivate(world, entity);
                entity
            }
            None => {
                let entity = prefab.instantiate(world);
                slots.push(entity);
                entity
            }
        };

        let _ = world.insert_one(entity, transform);
        Some(entity)
    }

    /// Dormant instances held for `key`.
    pub fn available(&self, world: &World, key: K) -> usize {
        self.inventory.get(&key).map_or(0, |slots| {
            slots
                .iter()
                .filter(|&&e| world.get::<&Dormant>(e).is_ok())
                .count()
        })
    }

    /// All instances ever created for `key`, active or dormant.
    pub fn instances(&self, key: K) -> usize {
        self.inventory.get(&key).map_or(0, Vec::len)
    }

    /// Inventory for `key` in allocation order.
    pub fn inventory(&self, key: K) -> &[Entity] {
        self.inventory.get(&key).map_or(&[], Vec::as_slice)
    }
}
