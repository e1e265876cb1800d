use bevy_ecs::entity::Entity;
use bevy_ecs::world::World;
use rand::Rng;

use crate::ecs::clock::current_date;
use crate::ecs::components::{Character, Family, Kinship, MarriageTracker, Pregnancy};
use crate::ecs::error::SimError;
use crate::ecs::events::{SimEvent, publish};
use crate::ecs::relationships::RelationshipGraph;
use crate::ecs::resources::{Realm, SimRng, sim_config};
use crate::ecs::spawn::{generate_character, link_parent_child, link_siblings};
use crate::ecs::store;
use crate::model::{LifeStage, RoleFlags, Sex};

use super::apply_courtship::end_courtship_for;
use super::apply_family::{
    join_family, set_current_ruler, set_family_head, transfer_territory, vacate_throne,
};
use super::apply_scheme::{terminate_schemes_targeting, withdraw_from_all_schemes};

/// Take a character out of play and unwind everything that referenced them.
///
/// Returns `false` when the character was already out of play; the second call
/// changes nothing and publishes nothing.
pub fn remove_character_from_play(
    world: &mut World,
    character: Entity,
    cause: &str,
) -> Result<bool, SimError> {
    store::get_component::<Character>(world, character)?;
    if !store::deactivate(world, character)? {
        return Ok(false);
    }
    let date = current_date(world);
    let (was_head, family) = {
        let mut record = store::get_component_mut::<Character>(world, character)?;
        record.died = Some(date);
        record.roles.remove(RoleFlags::HEIR);
        (record.is_head(), record.family)
    };

    end_courtship_for(world, character)?;
    world.entity_mut(character).remove::<Pregnancy>();
    if let Some(mut graph) = world.get_resource_mut::<RelationshipGraph>() {
        graph.deactivate_relationships(character);
    }
    withdraw_from_all_schemes(world, character)?;
    terminate_schemes_targeting(world, character)?;

    if was_head && let Some(family) = family {
        set_family_head(world, family, None)?;
    }
    vacate_throne(world, character);

    tracing::debug!(?character, cause, "character removed from play");
    publish(
        world,
        SimEvent::CharacterRemovedFromPlay {
            character,
            cause: cause.to_string(),
        },
    );
    Ok(true)
}

/// Retire a family and clear every reference to it from members, the throne,
/// its territory, and schemes aimed at it. Idempotent like
/// [`remove_character_from_play`].
pub fn remove_family_from_play(world: &mut World, family: Entity) -> Result<bool, SimError> {
    store::get_component::<Family>(world, family)?;
    if !store::deactivate(world, family)? {
        return Ok(false);
    }

    let rules = world
        .get_resource::<Realm>()
        .is_some_and(|r| r.ruling_family() == Some(family));
    if rules {
        set_current_ruler(world, None)?;
    }

    let (members, territories) = {
        let record = store::get_component::<Family>(world, family)?;
        (record.members.clone(), record.territories.clone())
    };
    for &member in &members {
        if store::is_active(world, member) {
            withdraw_from_all_schemes(world, member)?;
        }
        if let Some(mut record) = world.get_mut::<Character>(member)
            && record.family == Some(family)
        {
            record.family = None;
            record.roles.remove(RoleFlags::FAMILY_HEAD | RoleFlags::HEIR);
        }
    }
    {
        let mut record = store::get_component_mut::<Family>(world, family)?;
        record.head = None;
        record.vacated_by = None;
        record.crisis_since = None;
        record.members.clear();
    }
    for territory in territories {
        transfer_territory(world, territory, None)?;
    }
    terminate_schemes_targeting(world, family)?;

    tracing::debug!(?family, members = members.len(), "family removed from play");
    publish(world, SimEvent::FamilyRemovedFromPlay { family });
    Ok(true)
}

/// Start a pregnancy for `mother` by her husband `father`.
pub fn conceive(world: &mut World, mother: Entity, father: Entity) -> Result<(), SimError> {
    let now = current_date(world);
    let config = sim_config(world);
    let record = store::get_component::<Character>(world, mother)?;
    let refuse = |reason: &str| {
        Err(SimError::Precondition(format!(
            "{mother:?} cannot conceive: {reason}"
        )))
    };
    if record.sex != Sex::Female {
        return refuse("not a woman");
    }
    if record.life_stage < LifeStage::YoungAdult || record.age(now) > config.max_maternal_age {
        return refuse("outside childbearing age");
    }
    if store::get_component::<Character>(world, father)?.sex != Sex::Male {
        return refuse("the father is not a man");
    }
    if !store::is_active(world, mother) || !store::is_active(world, father) {
        return refuse("a parent is out of play");
    }
    let husband = world
        .get::<MarriageTracker>(mother)
        .and_then(|t| t.current())
        .map(|m| m.spouse);
    if husband != Some(father) {
        return refuse("not married to the father");
    }
    store::add_component(
        world,
        mother,
        Pregnancy {
            father,
            conceived: now,
            due: now.add_months(config.pregnancy_months),
        },
    )?;
    publish(world, SimEvent::PregnancyStarted { mother, father });
    Ok(())
}

/// Deliver `mother`'s child: a new character linked to both parents and their
/// other children, entered into the father's house or else the mother's.
pub fn give_birth(world: &mut World, mother: Entity) -> Result<Entity, SimError> {
    if !store::is_active(world, mother) {
        return Err(SimError::Precondition(format!(
            "{mother:?} is out of play and cannot give birth"
        )));
    }
    let pregnancy = store::remove_component::<Pregnancy>(world, mother)?;
    let father = pregnancy.father;

    let house_of = |world: &World, parent: Entity| {
        world
            .get::<Character>(parent)
            .and_then(|c| c.family)
            .filter(|f| store::is_active(world, *f))
    };
    let family = house_of(world, father).or_else(|| house_of(world, mother));
    let surname = match family {
        Some(f) => store::get_component::<Family>(world, f)?.name.clone(),
        None => store::get_component::<Character>(world, father)?.surname.clone(),
    };
    let sex = {
        let mut sim_rng = world.get_resource_or_insert_with(|| SimRng::new(0));
        if sim_rng.rng.random_bool(0.5) {
            Sex::Female
        } else {
            Sex::Male
        }
    };

    let mut siblings: Vec<Entity> = Vec::new();
    for parent in [mother, father] {
        let Some(kin) = world.get::<Kinship>(parent) else {
            continue;
        };
        for child in &kin.children {
            if !siblings.contains(child) {
                siblings.push(*child);
            }
        }
    }

    let now = current_date(world);
    let child = generate_character(world, sex, &surname, now);
    link_parent_child(world, mother, child)?;
    link_parent_child(world, father, child)?;
    for sibling in siblings {
        link_siblings(world, child, sibling)?;
    }
    if let Some(family) = family {
        join_family(world, child, family)?;
    }

    tracing::debug!(?child, ?mother, ?father, "child born");
    publish(
        world,
        SimEvent::CharacterBorn {
            child,
            mother,
            father,
            family,
        },
    );
    Ok(child)
}
