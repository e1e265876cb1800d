use bevy_ecs::entity::Entity;
use bevy_ecs::query::With;
use bevy_ecs::world::World;

use crate::ecs::clock::current_date;
use crate::ecs::components::{Active, Character, Family, Territory};
use crate::ecs::error::SimError;
use crate::ecs::events::{SimEvent, publish};
use crate::ecs::resources::{Dynasty, Realm};
use crate::ecs::store;
use crate::ecs::succession::{depth_chart_for, resolve_successor};
use crate::model::{LifeStage, RoleFlags};

/// Minimum life stage for holding the throne.
const MIN_RULER_STAGE: LifeStage = LifeStage::Adolescent;

/// Add `character` to `family`, leaving any previous family first.
pub fn join_family(world: &mut World, character: Entity, family: Entity) -> Result<(), SimError> {
    let current = store::get_component::<Character>(world, character)?.family;
    store::get_component::<Family>(world, family)?;
    if !store::is_active(world, family) {
        return Err(SimError::Precondition(format!(
            "family {family:?} is no longer in play"
        )));
    }
    if current == Some(family) {
        return Ok(());
    }
    if current.is_some() {
        leave_family(world, character)?;
    }
    store::get_component_mut::<Family>(world, family)?
        .members
        .push(character);
    let mut record = store::get_component_mut::<Character>(world, character)?;
    record.family = Some(family);
    if record.birth_family.is_none() {
        record.birth_family = Some(family);
    }
    Ok(())
}

/// Drop `character` from their family. A departing head leaves the family
/// headless and waiting on succession. Returns the family that was left.
pub fn leave_family(world: &mut World, character: Entity) -> Result<Option<Entity>, SimError> {
    let Some(family) = store::get_component::<Character>(world, character)?.family else {
        return Ok(None);
    };
    if store::get_component::<Family>(world, family)?.head == Some(character) {
        set_family_head(world, family, None)?;
    }
    store::get_component_mut::<Family>(world, family)?
        .members
        .retain(|m| *m != character);
    let mut record = store::get_component_mut::<Character>(world, character)?;
    record.family = None;
    record.roles.remove(RoleFlags::FAMILY_HEAD | RoleFlags::HEIR);
    Ok(Some(family))
}

/// Active characters other than `except` that carry the head flag for `family`.
fn stray_heads(world: &mut World, family: Entity, except: Option<Entity>) -> Vec<Entity> {
    let mut q = world.query_filtered::<(Entity, &Character), With<Active>>();
    q.iter(world)
        .filter(|(e, c)| Some(*e) != except && c.family == Some(family) && c.is_head())
        .map(|(e, _)| e)
        .collect()
}

/// Make `head` the head of `family`, or leave the family headless with `None`.
///
/// The previous head loses the flag and the new head gains it inside this one
/// call, so no observer ever sees two heads.
pub fn set_family_head(
    world: &mut World,
    family: Entity,
    head: Option<Entity>,
) -> Result<(), SimError> {
    let previous = store::get_component::<Family>(world, family)?.head;
    if previous == head {
        return Ok(());
    }
    if let Some(new_head) = head {
        let record = store::get_component::<Character>(world, new_head)?;
        if !store::is_active(world, new_head) || record.family != Some(family) {
            return Err(SimError::Precondition(format!(
                "{new_head:?} is not an active member of family {family:?}"
            )));
        }
    }
    let strays = stray_heads(world, family, previous);
    if !strays.is_empty() {
        return Err(SimError::Structural(format!(
            "family {family:?} has unrecorded heads {strays:?}"
        )));
    }

    if let Some(old) = previous
        && let Some(mut record) = world.get_mut::<Character>(old)
    {
        record.roles.remove(RoleFlags::FAMILY_HEAD);
    }
    if let Some(new_head) = head
        && let Some(mut record) = world.get_mut::<Character>(new_head)
    {
        record.roles.insert(RoleFlags::FAMILY_HEAD);
        record.roles.remove(RoleFlags::HEIR);
    }
    {
        let mut record = store::get_component_mut::<Family>(world, family)?;
        record.head = head;
        record.vacated_by = match head {
            Some(_) => None,
            None => previous.or(record.vacated_by),
        };
        if head.is_some() || previous.is_some() {
            record.crisis_since = None;
        }
    }

    match (head, previous) {
        (Some(head), previous) => publish(
            world,
            SimEvent::FamilyHeadChanged {
                family,
                previous,
                head,
            },
        ),
        (None, Some(former_head)) => publish(
            world,
            SimEvent::FamilyHeadVacated {
                family,
                former_head,
            },
        ),
        (None, None) => {}
    }
    Ok(())
}

/// Check the ruler candidate and return their family.
pub(crate) fn validate_ruler(world: &World, character: Entity) -> Result<Entity, SimError> {
    let record = store::get_component::<Character>(world, character)?;
    let invalid = |reason| SimError::InvalidRuler { character, reason };
    if !store::is_active(world, character) {
        return Err(invalid("not in play"));
    }
    let Some(family) = record.family else {
        return Err(invalid("not a member of a family"));
    };
    let in_family = world
        .get::<Family>(family)
        .is_some_and(|f| f.has_member(character));
    if !in_family || !store::is_active(world, family) {
        return Err(invalid("family is not in play"));
    }
    if record.life_stage < MIN_RULER_STAGE {
        return Err(invalid("too young to rule"));
    }
    Ok(family)
}

/// Change who sits on the throne. `None` leaves the throne empty and ends
/// the current dynasty.
///
/// A ruler from the reigning dynasty's family continues it; anyone else ends
/// it and founds a new one.
pub fn set_current_ruler(world: &mut World, ruler: Option<Entity>) -> Result<(), SimError> {
    world.init_resource::<Realm>();
    let new_family = ruler.map(|r| validate_ruler(world, r)).transpose()?;
    let (previous, vacated_by, ruling_family) = {
        let realm = world.resource::<Realm>();
        (realm.ruler, realm.vacated_by, realm.ruling_family)
    };
    if previous == ruler && (ruler.is_some() || vacated_by.is_none()) {
        return Ok(());
    }
    let date = current_date(world);
    let inherited = match (ruler, previous.or(vacated_by), ruling_family) {
        (Some(new_ruler), Some(last), Some(family)) => {
            depth_chart_for(world, family, last)?.first().map(|e| e.candidate) == Some(new_ruler)
        }
        (Some(new_ruler), Some(last), None) => resolve_successor(world, last)? == Some(new_ruler),
        _ => false,
    };

    if let Some(old) = previous
        && let Some(mut record) = world.get_mut::<Character>(old)
    {
        record.roles.remove(RoleFlags::RULER);
    }
    if let Some(new_ruler) = ruler
        && let Some(mut record) = world.get_mut::<Character>(new_ruler)
    {
        record.roles.insert(RoleFlags::RULER);
    }

    let mut dynasty_events = Vec::new();
    {
        let mut realm = world.resource_mut::<Realm>();
        if let Some(old) = previous {
            realm.previous_rulers.push(old);
        }
        realm.ruler = ruler;
        realm.ruling_family = new_family;
        realm.vacated_by = None;

        let continues = new_family.is_some()
            && realm.current_dynasty().map(|d| d.family) == new_family;
        if continues {
            if let (Some(dynasty), Some(new_ruler)) = (realm.current_dynasty_mut(), ruler) {
                dynasty.rulers.push(new_ruler);
            }
        } else {
            if let Some(dynasty) = realm.current_dynasty_mut() {
                dynasty.ended = Some(date);
                dynasty_events.push(SimEvent::DynastyEnded {
                    family: dynasty.family,
                });
            }
            if let (Some(founder), Some(family)) = (ruler, new_family) {
                realm.dynasties.push(Dynasty {
                    family,
                    founder,
                    started: date,
                    ended: None,
                    rulers: vec![founder],
                });
                dynasty_events.push(SimEvent::DynastyStarted { family, founder });
            }
        }
    }

    if previous != ruler {
        publish(
            world,
            SimEvent::RulerChanged {
                previous,
                ruler,
                inherited,
            },
        );
    }
    for event in dynasty_events {
        publish(world, event);
    }
    Ok(())
}

/// Empty the throne after the ruler leaves play. The dynasty stays open until
/// succession either continues it or gives up.
pub(crate) fn vacate_throne(world: &mut World, former_ruler: Entity) {
    world.init_resource::<Realm>();
    {
        let mut realm = world.resource_mut::<Realm>();
        if realm.ruler != Some(former_ruler) {
            return;
        }
        realm.ruler = None;
        realm.vacated_by = Some(former_ruler);
        realm.previous_rulers.push(former_ruler);
    }
    if let Some(mut record) = world.get_mut::<Character>(former_ruler) {
        record.roles.remove(RoleFlags::RULER);
    }
    publish(world, SimEvent::ThroneVacated { former_ruler });
}

/// Hand control of `territory` to `to`, or release it with `None`.
pub fn transfer_territory(
    world: &mut World,
    territory: Entity,
    to: Option<Entity>,
) -> Result<(), SimError> {
    let from = store::get_component::<Territory>(world, territory)?.controller;
    if from == to {
        return Ok(());
    }
    if let Some(new_owner) = to {
        store::get_component::<Family>(world, new_owner)?;
    }
    if let Some(old_owner) = from
        && let Some(mut family) = world.get_mut::<Family>(old_owner)
    {
        family.territories.retain(|t| *t != territory);
    }
    if let Some(new_owner) = to
        && let Some(mut family) = world.get_mut::<Family>(new_owner)
        && !family.holds(territory)
    {
        family.territories.push(territory);
    }
    store::get_component_mut::<Territory>(world, territory)?.controller = to;
    publish(world, SimEvent::TerritoryTransferred { territory, from, to });
    Ok(())
}

/// Scan every active family for head-flag inconsistencies.
pub fn check_family_heads(world: &mut World) -> Result<(), SimError> {
    let families: Vec<(Entity, Option<Entity>)> = {
        let mut q = world.query_filtered::<(Entity, &Family), With<Active>>();
        q.iter(world).map(|(e, f)| (e, f.head)).collect()
    };
    for (family, head) in families {
        if let Some(head) = head {
            let valid = store::is_active(world, head)
                && world
                    .get::<Character>(head)
                    .is_some_and(|c| c.family == Some(family) && c.is_head());
            if !valid {
                return Err(SimError::Structural(format!(
                    "family {family:?} records {head:?} as head, but they are not an active flagged member"
                )));
            }
        }
        let strays = stray_heads(world, family, head);
        if !strays.is_empty() {
            return Err(SimError::Structural(format!(
                "family {family:?} has more than one active head: {head:?} and {strays:?}"
            )));
        }
    }
    Ok(())
}
