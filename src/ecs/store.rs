//! Entity/component store facade over the Bevy `World`.
//!
//! Every operation checks that the entity exists and reports problems as
//! `SimError` instead of panicking. Queries walk entities in creation order.

use bevy_ecs::change_detection::Mut;
use bevy_ecs::entity::Entity;
use bevy_ecs::world::{EntityRef, World};

use crate::ecs::components::{Active, ComponentKind, SimComponent, SimEntity};
use crate::ecs::error::SimError;
use crate::ecs::events::{SimEvent, publish};
use crate::ecs::resources::EntityRegistry;

/// Spawn a new active entity with an identity component and register it.
pub fn create_entity(world: &mut World, name: impl Into<String>) -> Entity {
    let entity = world.spawn(Active).id();
    let id = world
        .get_resource_or_insert_with(EntityRegistry::default)
        .register(entity);
    world.entity_mut(entity).insert(SimEntity {
        id,
        name: name.into(),
    });
    publish(world, SimEvent::EntityCreated { entity });
    entity
}

fn entity_ref(world: &World, entity: Entity) -> Result<EntityRef<'_>, SimError> {
    world
        .get_entity(entity)
        .map_err(|_| SimError::UnknownEntity(entity))
}

pub fn exists(world: &World, entity: Entity) -> bool {
    world.get_entity(entity).is_ok()
}

/// Attach a component. Fails if one of the same kind is already present.
pub fn add_component<C: SimComponent>(
    world: &mut World,
    entity: Entity,
    component: C,
) -> Result<(), SimError> {
    if entity_ref(world, entity)?.contains::<C>() {
        return Err(SimError::DuplicateComponent {
            entity,
            kind: C::KIND,
        });
    }
    world.entity_mut(entity).insert(component);
    Ok(())
}

/// Overwrite an existing component, returning the previous value.
pub fn replace_component<C: SimComponent>(
    world: &mut World,
    entity: Entity,
    component: C,
) -> Result<C, SimError> {
    get_component::<C>(world, entity)?.ensure_writable(entity)?;
    let previous = {
        let mut slot = get_component_mut::<C>(world, entity)?;
        std::mem::replace(&mut *slot, component)
    };
    publish(
        world,
        SimEvent::ComponentReplaced {
            entity,
            kind: C::KIND,
        },
    );
    Ok(previous)
}

pub fn get_component<C: SimComponent>(world: &World, entity: Entity) -> Result<&C, SimError> {
    entity_ref(world, entity)?
        .get::<C>()
        .ok_or(SimError::MissingComponent {
            entity,
            kind: C::KIND,
        })
}

pub fn get_component_mut<C: SimComponent>(
    world: &mut World,
    entity: Entity,
) -> Result<Mut<'_, C>, SimError> {
    entity_ref(world, entity)?;
    world.get_mut::<C>(entity).ok_or(SimError::MissingComponent {
        entity,
        kind: C::KIND,
    })
}

/// Detach a component and hand it back.
pub fn remove_component<C: SimComponent>(world: &mut World, entity: Entity) -> Result<C, SimError> {
    get_component::<C>(world, entity)?.ensure_writable(entity)?;
    let mut entity_mut = world
        .get_entity_mut(entity)
        .map_err(|_| SimError::UnknownEntity(entity))?;
    entity_mut.take::<C>().ok_or(SimError::MissingComponent {
        entity,
        kind: C::KIND,
    })
}

pub fn is_active(world: &World, entity: Entity) -> bool {
    world.get::<Active>(entity).is_some()
}

/// Drop the active tag. Returns whether the entity was active before.
/// All other components stay, so lookups by id keep working.
pub fn deactivate(world: &mut World, entity: Entity) -> Result<bool, SimError> {
    let was_active = entity_ref(world, entity)?.contains::<Active>();
    if was_active {
        world.entity_mut(entity).remove::<Active>();
        publish(world, SimEvent::EntityDeactivated { entity });
    }
    Ok(was_active)
}

pub fn activate(world: &mut World, entity: Entity) -> Result<(), SimError> {
    entity_ref(world, entity)?;
    world.entity_mut(entity).insert(Active);
    Ok(())
}

/// Entities holding every kind in `kinds`, in creation order.
///
/// The iterator is lazy and `Clone`, so it can be restarted from a saved copy.
pub fn query<'w>(world: &'w World, kinds: &[ComponentKind]) -> KindQuery<'w> {
    let order = world
        .get_resource::<EntityRegistry>()
        .map(|r| r.order())
        .unwrap_or(&[]);
    KindQuery {
        world,
        order: order.iter(),
        kinds: kinds.to_vec(),
    }
}

/// Like [`query`], restricted to entities carrying the active tag.
pub fn query_active<'w>(world: &'w World, kinds: &[ComponentKind]) -> KindQuery<'w> {
    let mut kinds = kinds.to_vec();
    if !kinds.contains(&ComponentKind::Active) {
        kinds.push(ComponentKind::Active);
    }
    query(world, &kinds)
}

#[derive(Clone)]
pub struct KindQuery<'w> {
    world: &'w World,
    order: std::slice::Iter<'w, Entity>,
    kinds: Vec<ComponentKind>,
}

impl Iterator for KindQuery<'_> {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        let Self {
            world,
            order,
            kinds,
        } = self;
        order
            .find(|entity| match world.get_entity(**entity) {
                Ok(entity_ref) => kinds.iter().all(|kind| kind.present_on(entity_ref)),
                Err(_) => false,
            })
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Character, Family, Kinship, Scheme, SchemeTarget};
    use crate::ecs::time::SimDate;
    use crate::model::{SchemeKind, SchemeOutcome, SchemeStatus, Sex};

    fn character() -> Character {
        Character::new("Edith", "Ashford", Sex::Female, SimDate::from_year(1))
    }

    #[test]
    fn create_entity_is_active_and_registered() {
        let mut world = World::new();
        let e = create_entity(&mut world, "Edith");
        assert!(is_active(&world, e));
        assert_eq!(get_component::<SimEntity>(&world, e).unwrap().id, 1);
        assert_eq!(world.resource::<EntityRegistry>().get_bevy(1), Some(e));
    }

    #[test]
    fn add_component_twice_is_rejected() {
        let mut world = World::new();
        let e = create_entity(&mut world, "Edith");
        add_component(&mut world, e, character()).unwrap();
        let err = add_component(&mut world, e, character()).unwrap_err();
        assert_eq!(
            err,
            SimError::DuplicateComponent {
                entity: e,
                kind: ComponentKind::Character
            }
        );
    }

    #[test]
    fn replace_requires_existing_component() {
        let mut world = World::new();
        let e = create_entity(&mut world, "Edith");
        assert!(matches!(
            replace_component(&mut world, e, Kinship::default()),
            Err(SimError::MissingComponent { .. })
        ));
        add_component(&mut world, e, character()).unwrap();
        let mut renamed = character();
        renamed.first_name = "Edda".into();
        let old = replace_component(&mut world, e, renamed).unwrap();
        assert_eq!(old.first_name, "Edith");
        assert_eq!(get_component::<Character>(&world, e).unwrap().first_name, "Edda");
    }

    #[test]
    fn get_missing_component_fails() {
        let mut world = World::new();
        let e = create_entity(&mut world, "Edith");
        assert_eq!(
            get_component::<Family>(&world, e).unwrap_err(),
            SimError::MissingComponent {
                entity: e,
                kind: ComponentKind::Family
            }
        );
    }

    #[test]
    fn unknown_entity_is_a_lookup_error() {
        let mut world = World::new();
        let e = create_entity(&mut world, "Ghost");
        world.despawn(e);
        assert_eq!(
            get_component::<SimEntity>(&world, e).unwrap_err(),
            SimError::UnknownEntity(e)
        );
        assert!(deactivate(&mut world, e).is_err());
    }

    #[test]
    fn remove_component_returns_value() {
        let mut world = World::new();
        let e = create_entity(&mut world, "Edith");
        add_component(&mut world, e, character()).unwrap();
        let removed = remove_component::<Character>(&mut world, e).unwrap();
        assert_eq!(removed.surname, "Ashford");
        assert!(remove_component::<Character>(&mut world, e).is_err());
    }

    #[test]
    fn resolved_scheme_cannot_be_replaced_or_removed() {
        let mut world = World::new();
        let initiator = create_entity(&mut world, "Plotter");
        let target = create_entity(&mut world, "Mark");
        let e = create_entity(&mut world, "Plot");
        let started = SimDate::from_year(3);
        let mut scheme = Scheme::new(
            SchemeKind::Assassination,
            initiator,
            SchemeTarget::Character(target),
            1.0,
            started,
        );
        add_component(&mut world, e, scheme.clone()).unwrap();
        scheme.resolve(SchemeOutcome::Discovered, SimDate::from_year(4));
        // Writing the resolution itself is allowed while the stored copy is open.
        replace_component(&mut world, e, scheme.clone()).unwrap();

        let blank = Scheme::new(
            SchemeKind::Assassination,
            initiator,
            SchemeTarget::Character(target),
            1.0,
            started,
        );
        let err = replace_component(&mut world, e, blank).unwrap_err();
        assert_eq!(
            err,
            SimError::SchemeAlreadyResolved {
                scheme: e,
                status: SchemeStatus::Discovered
            }
        );
        assert!(matches!(
            remove_component::<Scheme>(&mut world, e),
            Err(SimError::SchemeAlreadyResolved { .. })
        ));
        assert_eq!(get_component::<Scheme>(&world, e).unwrap(), &scheme);
    }

    #[test]
    fn query_iterates_in_creation_order_and_restarts() {
        let mut world = World::new();
        let a = create_entity(&mut world, "a");
        let b = create_entity(&mut world, "b");
        let c = create_entity(&mut world, "c");
        for e in [c, a] {
            add_component(&mut world, e, character()).unwrap();
        }
        add_component(&mut world, b, Kinship::default()).unwrap();

        let q = query(&world, &[ComponentKind::Character]);
        let saved = q.clone();
        assert_eq!(q.collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(saved.collect::<Vec<_>>(), vec![a, c]);
    }

    #[test]
    fn deactivation_hides_from_active_queries_only() {
        let mut world = World::new();
        let a = create_entity(&mut world, "a");
        let b = create_entity(&mut world, "b");
        for e in [a, b] {
            add_component(&mut world, e, character()).unwrap();
        }
        assert!(deactivate(&mut world, a).unwrap());
        assert!(!deactivate(&mut world, a).unwrap());

        let active: Vec<_> = query_active(&world, &[ComponentKind::Character]).collect();
        assert_eq!(active, vec![b]);
        let all: Vec<_> = query(&world, &[ComponentKind::Character]).collect();
        assert_eq!(all, vec![a, b]);
        assert!(get_component::<Character>(&world, a).is_ok());
    }
}
