//! Id-keyed entity storage
//!
//! Grids hold only ids; the arena owns every entity. Ids are handed out in
//! increasing order and never reused, so a stale id simply misses.

use std::collections::BTreeMap;

use crate::core::types::EntityId;
use crate::entity::model::{Entity, EntityBuilder};

#[derive(Debug)]
pub struct EntityArena {
    entities: BTreeMap<EntityId, Entity>,
    next_id: u64,
}

impl Default for EntityArena {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityArena {
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn spawn(&mut self, builder: EntityBuilder) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, builder.build(id));
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Check an entity out for exclusive use; pair with [`Self::restore`]
    pub fn take(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn restore(&mut self, entity: Entity) {
        self.entities.insert(entity.id, entity);
    }

    /// Drop an entity for good
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }
}
