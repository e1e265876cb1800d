use bevy_ecs::entity::Entity;
use bevy_ecs::world::World;

use crate::ecs::clock::current_date;
use crate::ecs::components::{
    Character, Disposition, Family, Scheme, SchemeMembership, SchemeTarget,
};
use crate::ecs::error::SimError;
use crate::ecs::events::{SimEvent, publish};
use crate::ecs::relationships::RelationshipGraph;
use crate::ecs::resources::sim_config;
use crate::ecs::store;
use crate::model::{RelationshipTag, SchemeKind, SchemeOutcome, SchemeStatus};

use super::scheme_effects::{EffectOutcome, SchemeEffects};

/// Opinion the target loses toward each participant of a discovered scheme.
const DISCOVERY_OPINION_PENALTY: i32 = -30;

/// Progress a participant contributes per month.
pub fn participant_weight(world: &World, character: Entity) -> f64 {
    let ambition = world
        .get::<Disposition>(character)
        .copied()
        .unwrap_or_default()
        .ambition;
    0.5 + ambition
}

fn require_active_character(world: &World, character: Entity) -> Result<(), SimError> {
    store::get_component::<Character>(world, character)?;
    if !store::is_active(world, character) {
        return Err(SimError::Precondition(format!(
            "{character:?} is no longer in play"
        )));
    }
    Ok(())
}

fn open_scheme(world: &World, scheme: Entity) -> Result<&Scheme, SimError> {
    let record = store::get_component::<Scheme>(world, scheme)?;
    record.ensure_open(scheme)?;
    Ok(record)
}

fn add_membership(world: &mut World, character: Entity, scheme: Entity) {
    let mut entity = world.entity_mut(character);
    match entity.get_mut::<SchemeMembership>() {
        Some(mut membership) => membership.schemes.push(scheme),
        None => {
            entity.insert(SchemeMembership {
                schemes: vec![scheme],
            });
        }
    }
}

fn drop_membership(world: &mut World, character: Entity, scheme: Entity) {
    if let Some(mut membership) = world.get_mut::<SchemeMembership>(character) {
        membership.schemes.retain(|s| *s != scheme);
    }
}

/// Promote a forming scheme once it has enough participants.
fn activate_if_ready(world: &mut World, scheme: Entity) -> Result<(), SimError> {
    let minimum = sim_config(world).scheme_min_participants;
    let activated = {
        let mut record = store::get_component_mut::<Scheme>(world, scheme)?;
        if record.status() == SchemeStatus::Forming && record.participants().len() >= minimum {
            record.activate();
            true
        } else {
            false
        }
    };
    if activated {
        publish(world, SimEvent::SchemeActivated { scheme });
    }
    Ok(())
}

/// Start a scheme with `initiator` as its first participant. The scheme lives
/// on a new entity, which is returned.
pub fn create_scheme(
    world: &mut World,
    kind: SchemeKind,
    initiator: Entity,
    target: SchemeTarget,
) -> Result<Entity, SimError> {
    require_active_character(world, initiator)?;
    match (kind, target) {
        (SchemeKind::Coup | SchemeKind::Assassination, SchemeTarget::Character(c)) => {
            require_active_character(world, c)?;
            if c == initiator {
                return Err(SimError::Precondition(format!(
                    "{initiator:?} cannot scheme against themselves"
                )));
            }
        }
        (SchemeKind::SeizeTerritory, SchemeTarget::Family(f)) => {
            store::get_component::<Family>(world, f)?;
            if !store::is_active(world, f) {
                return Err(SimError::Precondition(format!(
                    "family {f:?} is no longer in play"
                )));
            }
            if world.get::<Character>(initiator).and_then(|c| c.family) == Some(f) {
                return Err(SimError::Precondition(format!(
                    "{initiator:?} cannot scheme against their own family"
                )));
            }
        }
        (kind, target) => {
            return Err(SimError::Precondition(format!(
                "a {kind} scheme cannot target {target:?}"
            )));
        }
    }

    let weight = participant_weight(world, initiator);
    let created = current_date(world);
    let scheme = store::create_entity(world, format!("{kind} scheme"));
    store::add_component(
        world,
        scheme,
        Scheme::new(kind, initiator, target, weight, created),
    )?;
    add_membership(world, initiator, scheme);
    tracing::debug!(?scheme, %kind, ?initiator, "scheme created");
    publish(
        world,
        SimEvent::SchemeCreated {
            scheme,
            kind,
            initiator,
        },
    );
    activate_if_ready(world, scheme)?;
    Ok(scheme)
}

/// Add `character` to an open scheme as a member.
pub fn join_scheme(world: &mut World, scheme: Entity, character: Entity) -> Result<(), SimError> {
    require_active_character(world, character)?;
    let record = open_scheme(world, scheme)?;
    if record.is_participant(character) {
        return Err(SimError::Precondition(format!(
            "{character:?} already takes part in scheme {scheme:?}"
        )));
    }
    if record.target() == SchemeTarget::Character(character) {
        return Err(SimError::Precondition(format!(
            "{character:?} is the target of scheme {scheme:?}"
        )));
    }
    let weight = participant_weight(world, character);
    let joined = current_date(world);
    store::get_component_mut::<Scheme>(world, scheme)?.add_participant(character, weight, joined);
    add_membership(world, character, scheme);
    publish(world, SimEvent::SchemeJoined { scheme, character });
    activate_if_ready(world, scheme)
}

/// Withdraw `character` from an open scheme.
///
/// An emptied scheme is abandoned. A departing initiator hands over to the
/// designated successor, or abandons the scheme if there is none.
pub fn leave_scheme(
    world: &mut World,
    scheme: Entity,
    character: Entity,
) -> Result<SchemeStatus, SimError> {
    let record = open_scheme(world, scheme)?;
    if !record.is_participant(character) {
        return Err(SimError::Precondition(format!(
            "{character:?} is not part of scheme {scheme:?}"
        )));
    }
    let was_initiator = record.initiator() == character;
    let (remaining, successor) = {
        let mut record = store::get_component_mut::<Scheme>(world, scheme)?;
        record.remove_participant(character);
        (record.participants().len(), record.successor_leader())
    };
    drop_membership(world, character, scheme);
    publish(world, SimEvent::SchemeLeft { scheme, character });

    if remaining == 0 {
        resolve_scheme(world, scheme, SchemeOutcome::NoParticipants)?;
    } else if was_initiator {
        let promoted = match successor {
            Some(next) => store::get_component_mut::<Scheme>(world, scheme)?.promote(next),
            None => false,
        };
        if !promoted {
            resolve_scheme(world, scheme, SchemeOutcome::LeaderLeft)?;
        }
    }
    Ok(store::get_component::<Scheme>(world, scheme)?.status())
}

/// Name the member who takes over if the initiator leaves. `None` clears it.
pub fn designate_successor_leader(
    world: &mut World,
    scheme: Entity,
    successor: Option<Entity>,
) -> Result<(), SimError> {
    let record = open_scheme(world, scheme)?;
    if let Some(next) = successor
        && (!record.is_participant(next) || record.initiator() == next)
    {
        return Err(SimError::Precondition(format!(
            "{next:?} is not a member of scheme {scheme:?}"
        )));
    }
    store::get_component_mut::<Scheme>(world, scheme)?.set_successor_leader(successor);
    Ok(())
}

pub fn abandon_scheme(world: &mut World, scheme: Entity) -> Result<(), SimError> {
    resolve_scheme(world, scheme, SchemeOutcome::AbandonedByInitiator)
}

/// The character whose opinions suffer when `target` discovers a scheme.
fn offended_party(world: &World, target: SchemeTarget) -> Option<Entity> {
    match target {
        SchemeTarget::Character(c) => Some(c),
        SchemeTarget::Family(f) => world.get::<Family>(f).and_then(|f| f.head),
    }
}

/// Move a scheme to its terminal state. Fails with `SchemeAlreadyResolved`
/// on a scheme that already has one.
pub fn resolve_scheme(
    world: &mut World,
    scheme: Entity,
    outcome: SchemeOutcome,
) -> Result<(), SimError> {
    open_scheme(world, scheme)?;
    let date = current_date(world);
    let (kind, target, participants, status) = {
        let mut record = store::get_component_mut::<Scheme>(world, scheme)?;
        record.resolve(outcome, date);
        let participants: Vec<Entity> = record.participants().keys().copied().collect();
        (record.kind(), record.target(), participants, record.status())
    };
    for &participant in &participants {
        drop_membership(world, participant, scheme);
    }
    store::deactivate(world, scheme)?;

    if outcome == SchemeOutcome::Discovered
        && let Some(victim) = offended_party(world, target)
        && let Some(mut graph) = world.remove_resource::<RelationshipGraph>()
    {
        let penalised: Result<(), SimError> = participants
            .iter()
            .filter(|p| **p != victim)
            .try_for_each(|&p| {
                graph.adjust_opinion(victim, p, DISCOVERY_OPINION_PENALTY, date)?;
                graph.add_tag(victim, p, RelationshipTag::Rival, date)
            });
        world.insert_resource(graph);
        penalised?;
    }

    tracing::info!(?scheme, %kind, %outcome, "scheme resolved");
    publish(
        world,
        SimEvent::SchemeResolved {
            scheme,
            kind,
            status,
            outcome,
            participants,
        },
    );
    Ok(())
}

/// Run the kind's effect for an active scheme that reached its progress
/// threshold. Returns the terminal status.
pub fn complete_scheme(world: &mut World, scheme: Entity) -> Result<SchemeStatus, SimError> {
    let snapshot = open_scheme(world, scheme)?.clone();
    if snapshot.status() != SchemeStatus::Active {
        return Err(SimError::Precondition(format!(
            "scheme {scheme:?} is still {}",
            snapshot.status()
        )));
    }
    let effects = world.remove_resource::<SchemeEffects>().unwrap_or_default();
    let result = run_effect(world, &effects, scheme, &snapshot);
    world.insert_resource(effects);
    result?;
    Ok(store::get_component::<Scheme>(world, scheme)?.status())
}

fn run_effect(
    world: &mut World,
    effects: &SchemeEffects,
    scheme: Entity,
    snapshot: &Scheme,
) -> Result<(), SimError> {
    let Some(effect) = effects.get(snapshot.kind()) else {
        return resolve_scheme(world, scheme, SchemeOutcome::EffectFailed);
    };
    match effect.check(world, snapshot) {
        EffectOutcome::Failed(reason) => {
            tracing::debug!(?scheme, %reason, "scheme effect failed");
            resolve_scheme(world, scheme, SchemeOutcome::EffectFailed)
        }
        EffectOutcome::Applied => {
            // Resolved first so cascades triggered by the effect see it closed.
            resolve_scheme(world, scheme, SchemeOutcome::Completed)?;
            effect.apply(world, snapshot)
        }
    }
}

/// Pull `character` out of every open scheme they belong to.
pub fn withdraw_from_all_schemes(world: &mut World, character: Entity) -> Result<(), SimError> {
    let schemes = world
        .get::<SchemeMembership>(character)
        .map(|m| m.schemes.clone())
        .unwrap_or_default();
    for scheme in schemes {
        let still_member = world
            .get::<Scheme>(scheme)
            .is_some_and(|s| s.is_open() && s.is_participant(character));
        if still_member {
            leave_scheme(world, scheme, character)?;
        }
    }
    Ok(())
}

fn open_schemes(world: &mut World) -> Vec<(Entity, Scheme)> {
    let mut q = world.query::<(Entity, &Scheme)>();
    q.iter(world)
        .filter(|(_, s)| s.is_open())
        .map(|(e, s)| (e, s.clone()))
        .collect()
}

/// Close every open scheme aimed at `target`. Returns how many were closed.
pub fn terminate_schemes_targeting(world: &mut World, target: Entity) -> Result<usize, SimError> {
    let doomed: Vec<Entity> = open_schemes(world)
        .into_iter()
        .filter(|(_, s)| s.target().entity() == target)
        .map(|(e, _)| e)
        .collect();
    for &scheme in &doomed {
        resolve_scheme(world, scheme, SchemeOutcome::TargetRemoved)?;
    }
    Ok(doomed.len())
}

/// Every open scheme must have participants and an initiator among them.
pub fn check_schemes(world: &mut World) -> Result<(), SimError> {
    for (entity, scheme) in open_schemes(world) {
        if scheme.participants().is_empty() {
            return Err(SimError::Structural(format!(
                "open scheme {entity:?} has no participants"
            )));
        }
        if !scheme.is_participant(scheme.initiator()) {
            return Err(SimError::Structural(format!(
                "scheme {entity:?} is led by non-participant {:?}",
                scheme.initiator()
            )));
        }
    }
    Ok(())
}
