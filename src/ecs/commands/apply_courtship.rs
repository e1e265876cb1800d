use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use bevy_ecs::entity::Entity;
use bevy_ecs::world::World;

use crate::ecs::clock::current_date;
use crate::ecs::components::{
    Betrothal, BetrothalTracker, Character, Kinship, Marriage, MarriageTracker,
};
use crate::ecs::error::SimError;
use crate::ecs::events::{SimEvent, publish};
use crate::ecs::resources::{EntityRegistry, sim_config};
use crate::ecs::store;
use crate::model::{BetrothalEnd, Ineligibility, LifeStage, MarriageEnd};

const PARENT_CHILD_WEIGHT: u32 = 1;
const SIBLING_WEIGHT: u32 = 2;

/// Shortest weighted path between two characters through the family tree,
/// or `None` when they are further apart than `limit`.
pub fn kinship_distance(world: &World, a: Entity, b: Entity, limit: u32) -> Option<u32> {
    if a == b {
        return Some(0);
    }
    let mut best: BTreeMap<Entity, u32> = BTreeMap::new();
    let mut frontier = BinaryHeap::new();
    best.insert(a, 0);
    frontier.push(Reverse((0u32, a)));

    while let Some(Reverse((distance, current))) = frontier.pop() {
        if current == b {
            return Some(distance);
        }
        if best.get(&current).is_some_and(|d| *d < distance) {
            continue;
        }
        let Some(kin) = world.get::<Kinship>(current) else {
            continue;
        };
        let neighbours = kin
            .parents
            .iter()
            .chain(&kin.children)
            .map(|e| (*e, PARENT_CHILD_WEIGHT))
            .chain(kin.siblings.iter().map(|e| (*e, SIBLING_WEIGHT)));
        for (next, weight) in neighbours {
            let candidate = distance + weight;
            if candidate > limit {
                continue;
            }
            if best.get(&next).is_none_or(|d| candidate < *d) {
                best.insert(next, candidate);
                frontier.push(Reverse((candidate, next)));
            }
        }
    }
    None
}

fn ensure_trackers(world: &mut World, character: Entity) {
    let mut entity = world.entity_mut(character);
    if !entity.contains::<BetrothalTracker>() {
        entity.insert(BetrothalTracker::default());
    }
    if !entity.contains::<MarriageTracker>() {
        entity.insert(MarriageTracker::default());
    }
}

fn current_betrothed(world: &World, character: Entity) -> Option<Entity> {
    world
        .get::<BetrothalTracker>(character)
        .and_then(|t| t.current())
        .map(|b| b.betrothed)
}

fn is_married(world: &World, character: Entity) -> bool {
    world
        .get::<MarriageTracker>(character)
        .is_some_and(|t| t.is_married())
}

/// Every check runs before anything is mutated, so a refusal leaves both
/// parties untouched.
fn check_pair(
    world: &World,
    a: Entity,
    b: Entity,
    min_stage: LifeStage,
    for_marriage: bool,
) -> Result<(), SimError> {
    let refuse = |reason| SimError::IneligiblePartner { a, b, reason };
    let stage_a = store::get_component::<Character>(world, a)?.life_stage;
    let stage_b = store::get_component::<Character>(world, b)?.life_stage;
    if a == b {
        return Err(refuse(Ineligibility::SameCharacter));
    }
    if !store::is_active(world, a) || !store::is_active(world, b) {
        return Err(refuse(Ineligibility::Inactive));
    }
    if is_married(world, a) || is_married(world, b) {
        return Err(refuse(Ineligibility::AlreadyMarried));
    }
    let (betrothed_a, betrothed_b) = (current_betrothed(world, a), current_betrothed(world, b));
    if for_marriage {
        let elsewhere = |who: Option<Entity>, other: Entity| who.is_some_and(|p| p != other);
        if elsewhere(betrothed_a, b) || elsewhere(betrothed_b, a) {
            return Err(refuse(Ineligibility::BetrothedToAnother));
        }
    } else if betrothed_a.is_some() || betrothed_b.is_some() {
        return Err(refuse(Ineligibility::AlreadyBetrothed));
    }
    if stage_a < min_stage || stage_b < min_stage {
        return Err(refuse(Ineligibility::LifeStage));
    }
    let limit = sim_config(world).kinship_distance_limit;
    if kinship_distance(world, a, b, limit).is_some() {
        return Err(refuse(Ineligibility::Kinship));
    }
    Ok(())
}

fn next_record_id(world: &mut World) -> u64 {
    world
        .get_resource_or_insert_with(EntityRegistry::default)
        .next_id()
}

/// Betroth `proposer` to `other`. Each side gets its own record.
pub fn form_betrothal(world: &mut World, proposer: Entity, other: Entity) -> Result<(), SimError> {
    check_pair(world, proposer, other, LifeStage::Adolescent, false)?;
    let started = current_date(world);
    for (holder, partner) in [(proposer, other), (other, proposer)] {
        ensure_trackers(world, holder);
        let id = next_record_id(world);
        store::get_component_mut::<BetrothalTracker>(world, holder)?.install(Betrothal {
            id,
            proposer,
            betrothed: partner,
            started,
        });
    }
    publish(
        world,
        SimEvent::BetrothalFormed {
            proposer,
            betrothed: other,
        },
    );
    Ok(())
}

fn end_betrothal(
    world: &mut World,
    character: Entity,
    reason: BetrothalEnd,
) -> Result<Option<Entity>, SimError> {
    let Some(partner) = current_betrothed(world, character) else {
        return Ok(None);
    };
    let ended = current_date(world);
    for holder in [character, partner] {
        if let Some(mut tracker) = world.get_mut::<BetrothalTracker>(holder) {
            tracker.terminate(ended, reason);
        }
    }
    publish(
        world,
        SimEvent::BetrothalEnded {
            character,
            partner,
            reason,
        },
    );
    Ok(Some(partner))
}

/// Call off `character`'s betrothal on both sides. Returns the former partner.
pub fn break_betrothal(world: &mut World, character: Entity) -> Result<Entity, SimError> {
    store::get_component::<Character>(world, character)?;
    end_betrothal(world, character, BetrothalEnd::Broken)?.ok_or_else(|| {
        SimError::Precondition(format!("{character:?} has no current betrothal"))
    })
}

/// Marry two characters. Both sides change in this one call.
pub fn form_marriage(world: &mut World, a: Entity, b: Entity) -> Result<(), SimError> {
    check_pair(world, a, b, LifeStage::YoungAdult, true)?;
    end_betrothal(world, a, BetrothalEnd::Married)?;
    let started = current_date(world);
    for (holder, spouse) in [(a, b), (b, a)] {
        ensure_trackers(world, holder);
        let id = next_record_id(world);
        store::get_component_mut::<MarriageTracker>(world, holder)?.install(Marriage {
            id,
            spouse,
            started,
        });
        if let Some(mut kin) = world.get_mut::<Kinship>(holder) {
            kin.spouse = Some(spouse);
        }
    }
    publish(world, SimEvent::MarriageFormed { a, b });
    Ok(())
}

fn end_marriage(
    world: &mut World,
    character: Entity,
    end: MarriageEnd,
) -> Result<Option<Entity>, SimError> {
    let Some(spouse) = world
        .get::<MarriageTracker>(character)
        .and_then(|t| t.current())
        .map(|m| m.spouse)
    else {
        return Ok(None);
    };
    let ended = current_date(world);
    for holder in [character, spouse] {
        if let Some(mut tracker) = world.get_mut::<MarriageTracker>(holder) {
            tracker.terminate(ended, end);
        }
        if let Some(mut kin) = world.get_mut::<Kinship>(holder) {
            kin.spouse = None;
        }
    }
    Ok(Some(spouse))
}

/// Dissolve `character`'s marriage. Returns the former spouse.
pub fn annul_marriage(world: &mut World, character: Entity) -> Result<Entity, SimError> {
    store::get_component::<Character>(world, character)?;
    let spouse = end_marriage(world, character, MarriageEnd::Annulled)?
        .ok_or_else(|| SimError::Precondition(format!("{character:?} is not married")))?;
    publish(
        world,
        SimEvent::MarriageEnded {
            character,
            spouse,
            end: MarriageEnd::Annulled,
        },
    );
    Ok(spouse)
}

/// Force-end both commitments of a character leaving play.
pub(crate) fn end_courtship_for(world: &mut World, character: Entity) -> Result<(), SimError> {
    end_betrothal(world, character, BetrothalEnd::PartnerLeftPlay)?;
    if let Some(survivor) = end_marriage(world, character, MarriageEnd::Widowed)? {
        publish(
            world,
            SimEvent::MarriageEnded {
                character: survivor,
                spouse: character,
                end: MarriageEnd::Widowed,
            },
        );
    }
    Ok(())
}
