use std::collections::BTreeMap;

use bevy_ecs::entity::Entity;
use bevy_ecs::resource::Resource;

/// Bidirectional mapping between simulation ids and Bevy entities, plus the
/// order entities were created in.
///
/// Ids come from one monotonic counter shared with betrothal and marriage
/// records, so no two objects of any type share an id.
#[derive(Resource, Debug, Clone, Default)]
pub struct EntityRegistry {
    last_id: u64,
    to_bevy: BTreeMap<u64, Entity>,
    to_sim: BTreeMap<Entity, u64>,
    order: Vec<Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id without registering an entity.
    pub fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    /// Register a freshly spawned entity and return its sim id.
    pub fn register(&mut self, entity: Entity) -> u64 {
        let id = self.next_id();
        self.to_bevy.insert(id, entity);
        self.to_sim.insert(entity, id);
        self.order.push(entity);
        id
    }

    pub fn get_bevy(&self, sim_id: u64) -> Option<Entity> {
        self.to_bevy.get(&sim_id).copied()
    }

    pub fn get_sim(&self, entity: Entity) -> Option<u64> {
        self.to_sim.get(&entity).copied()
    }

    /// Entities in creation order.
    pub fn order(&self) -> &[Entity] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use bevy_ecs::world::World;

    use super::*;

    #[test]
    fn register_assigns_sequential_ids_and_keeps_order() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let mut registry = EntityRegistry::new();
        assert_eq!(registry.register(b), 1);
        assert_eq!(registry.register(a), 2);
        assert_eq!(registry.order(), &[b, a]);
        assert_eq!(registry.get_bevy(2), Some(a));
        assert_eq!(registry.get_sim(b), Some(1));
    }

    #[test]
    fn record_ids_share_the_counter() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let mut registry = EntityRegistry::new();
        assert_eq!(registry.next_id(), 1);
        assert_eq!(registry.register(a), 2);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get_bevy(1), None);
    }
}
