use bevy_ecs::entity::Entity;
use bevy_ecs::world::World;
use rand::Rng;

use crate::ecs::clock::current_date;
use crate::ecs::commands::{join_family, set_family_head, transfer_territory};
use crate::ecs::components::*;
use crate::ecs::error::SimError;
use crate::ecs::resources::{Names, SimRng};
use crate::ecs::store;
use crate::ecs::time::SimDate;
use crate::model::{LifeStage, Sex};

/// Lifespans drawn by `generate_character`, in years.
const LIFESPAN_RANGE: std::ops::RangeInclusive<u32> = 45..=85;

/// Spawn a character with every per-character component attached.
pub fn spawn_character(
    world: &mut World,
    first_name: &str,
    surname: &str,
    sex: Sex,
    born: SimDate,
    life_stage: LifeStage,
) -> Entity {
    let mut character = Character::new(first_name, surname, sex, born);
    character.life_stage = life_stage;
    let entity = store::create_entity(world, character.full_name());
    world.entity_mut(entity).insert((
        character,
        Kinship::default(),
        Disposition::default(),
        BetrothalTracker::default(),
        MarriageTracker::default(),
        SchemeMembership::default(),
        CharacterMetrics::default(),
    ));
    entity
}

/// Spawn a character with a pooled first name, random traits, and a lifespan.
/// Life stage follows the age at the current date.
pub fn generate_character(world: &mut World, sex: Sex, surname: &str, born: SimDate) -> Entity {
    let now = current_date(world);
    let life_stage = LifeStage::from_age(now.years_since(born));
    let names = world.get_resource::<Names>().cloned().unwrap_or_default();
    let (first_name, disposition, lifespan) = {
        let mut sim_rng = world.get_resource_or_insert_with(|| SimRng::new(0));
        let rng = &mut sim_rng.rng;
        let first_name = names.0.pick_name(sex, rng).to_string();
        let secrecy = rng.random_range(0.0..=1.0);
        let disposition = Disposition::new(secrecy, rng.random_range(0.0..=1.0));
        (first_name, disposition, rng.random_range(LIFESPAN_RANGE))
    };

    let entity = spawn_character(world, &first_name, surname, sex, born, life_stage);
    world.entity_mut(entity).insert(disposition);
    if let Some(mut record) = world.get_mut::<Character>(entity) {
        record.lifespan = Some(lifespan);
    }
    entity
}

/// Create a family with `founder` as its first member and head.
pub fn found_family(world: &mut World, name: &str, founder: Entity) -> Result<Entity, SimError> {
    store::get_component::<Character>(world, founder)?;
    let founded = current_date(world);
    let family = store::create_entity(world, name);
    store::add_component(world, family, Family::new(name, founded))?;
    join_family(world, founder, family)?;
    set_family_head(world, family, Some(founder))?;
    Ok(family)
}

/// Create a territory, optionally handing it straight to `controller`.
pub fn spawn_territory(
    world: &mut World,
    name: &str,
    controller: Option<Entity>,
) -> Result<Entity, SimError> {
    let territory = store::create_entity(world, name);
    store::add_component(
        world,
        territory,
        Territory {
            name: name.to_string(),
            controller: None,
        },
    )?;
    if controller.is_some() {
        transfer_territory(world, territory, controller)?;
    }
    Ok(territory)
}

fn push_unique(list: &mut Vec<Entity>, entity: Entity) {
    if !list.contains(&entity) {
        list.push(entity);
    }
}

pub fn link_parent_child(world: &mut World, parent: Entity, child: Entity) -> Result<(), SimError> {
    store::get_component::<Kinship>(world, child)?;
    push_unique(
        &mut store::get_component_mut::<Kinship>(world, parent)?.children,
        child,
    );
    push_unique(
        &mut store::get_component_mut::<Kinship>(world, child)?.parents,
        parent,
    );
    Ok(())
}

pub fn link_siblings(world: &mut World, a: Entity, b: Entity) -> Result<(), SimError> {
    if a == b {
        return Err(SimError::Precondition(format!(
            "{a:?} cannot be their own sibling"
        )));
    }
    store::get_component::<Kinship>(world, b)?;
    push_unique(&mut store::get_component_mut::<Kinship>(world, a)?.siblings, b);
    push_unique(&mut store::get_component_mut::<Kinship>(world, b)?.siblings, a);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::clock::SimClock;
    use crate::model::RoleFlags;

    #[test]
    fn found_family_makes_founder_head() {
        let mut world = World::new();
        let founder = spawn_character(
            &mut world,
            "Hale",
            "Brook",
            Sex::Male,
            SimDate::from_year(1),
            LifeStage::Adult,
        );
        let family = found_family(&mut world, "Brook", founder).unwrap();
        let record = world.get::<Family>(family).unwrap();
        assert_eq!(record.head, Some(founder));
        assert_eq!(record.members, vec![founder]);
        let character = world.get::<Character>(founder).unwrap();
        assert!(character.roles.contains(RoleFlags::FAMILY_HEAD));
        assert_eq!(character.birth_family, Some(family));
    }

    #[test]
    fn generated_characters_get_names_and_stage() {
        let mut world = World::new();
        world.insert_resource(SimClock::new(100, 1));
        world.insert_resource(SimRng::new(7));
        let c = generate_character(&mut world, Sex::Female, "Ash", SimDate::from_year(75));
        let record = world.get::<Character>(c).unwrap();
        assert!(!record.first_name.is_empty());
        assert_eq!(record.life_stage, LifeStage::YoungAdult);
        assert!(record.lifespan.is_some_and(|l| LIFESPAN_RANGE.contains(&l)));
    }

    #[test]
    fn links_are_symmetric_and_unique() {
        let mut world = World::new();
        let born = SimDate::from_year(1);
        let p = spawn_character(&mut world, "P", "X", Sex::Male, born, LifeStage::Adult);
        let c = spawn_character(&mut world, "C", "X", Sex::Male, born, LifeStage::Child);
        link_parent_child(&mut world, p, c).unwrap();
        link_parent_child(&mut world, p, c).unwrap();
        assert_eq!(world.get::<Kinship>(p).unwrap().children, vec![c]);
        assert_eq!(world.get::<Kinship>(c).unwrap().parents, vec![p]);
        assert!(link_siblings(&mut world, c, c).is_err());
    }

    #[test]
    fn territory_follows_controller() {
        let mut world = World::new();
        let founder = spawn_character(
            &mut world,
            "Rolf",
            "Keld",
            Sex::Male,
            SimDate::from_year(1),
            LifeStage::Adult,
        );
        let family = found_family(&mut world, "Keld", founder).unwrap();
        let territory = spawn_territory(&mut world, "Keldmark", Some(family)).unwrap();
        assert_eq!(world.get::<Family>(family).unwrap().territories, vec![territory]);
        assert_eq!(world.get::<Territory>(territory).unwrap().controller, Some(family));
    }
}
