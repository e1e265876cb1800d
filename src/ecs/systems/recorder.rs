//! End-of-step event flush: metrics, the event log, and bus listeners.

use bevy_ecs::entity::Entity;
use bevy_ecs::message::Messages;
use bevy_ecs::world::World;
use serde_json::{Value, json};

use crate::ecs::clock::current_date;
use crate::ecs::components::{Character, CharacterMetrics, SimEntity};
use crate::ecs::events::{EventBus, SimEvent};
use crate::ecs::resources::{EntityRegistry, EventLog};
use crate::ecs::time::SimDate;
use crate::model::{BetrothalEnd, MarriageEnd, SchemeStatus};

/// Exclusive system in `SimPhase::Last`. Drains the event queue once and
/// hands each event to metrics, the log, and listeners in publication order.
pub fn flush_events(world: &mut World) {
    let events: Vec<SimEvent> = {
        let Some(mut messages) = world.get_resource_mut::<Messages<SimEvent>>() else {
            return;
        };
        messages.drain().collect()
    };
    if events.is_empty() {
        return;
    }
    let date = current_date(world);
    let mut bus = world.remove_resource::<EventBus>();

    for event in &events {
        record_metrics(world, event, date);
        let (description, data) = describe(world, event);
        world
            .get_resource_or_insert_with(EventLog::new)
            .push(event.kind(), date, description, data);
        if let Some(bus) = bus.as_mut() {
            bus.deliver(event);
        }
    }
    if let Some(bus) = bus {
        world.insert_resource(bus);
    }
    tracing::trace!(count = events.len(), %date, "events flushed");
}

fn bump(world: &mut World, character: Entity, update: impl FnOnce(&mut CharacterMetrics)) {
    if world.get::<Character>(character).is_none() {
        return;
    }
    match world.get_mut::<CharacterMetrics>(character) {
        Some(mut metrics) => update(&mut metrics),
        None => {
            let mut metrics = CharacterMetrics::default();
            update(&mut metrics);
            world.entity_mut(character).insert(metrics);
        }
    }
}

/// Single writer of `CharacterMetrics`.
fn record_metrics(world: &mut World, event: &SimEvent, date: SimDate) {
    match event {
        SimEvent::BetrothalFormed {
            proposer,
            betrothed,
        } => {
            for c in [*proposer, *betrothed] {
                bump(world, c, |m| m.times_betrothed += 1);
            }
        }
        SimEvent::BetrothalEnded {
            character,
            partner,
            reason: BetrothalEnd::Broken,
        } => {
            for c in [*character, *partner] {
                bump(world, c, |m| m.betrothals_broken += 1);
            }
        }
        SimEvent::MarriageFormed { a, b } => {
            for c in [*a, *b] {
                bump(world, c, |m| m.times_married += 1);
            }
        }
        SimEvent::MarriageEnded {
            character,
            end: MarriageEnd::Widowed,
            ..
        } => bump(world, *character, |m| m.times_widowed += 1),
        SimEvent::CharacterBorn { mother, father, .. } => {
            for c in [*mother, *father] {
                bump(world, c, |m| m.children_born += 1);
            }
        }
        SimEvent::FamilyHeadChanged { head, .. } => {
            bump(world, *head, |m| m.times_as_family_head += 1)
        }
        SimEvent::RulerChanged {
            previous,
            ruler,
            inherited,
        } => {
            if let Some(old) = previous {
                bump(world, *old, |m| m.last_ruled = Some(date));
            }
            if let Some(new) = ruler {
                bump(world, *new, |m| {
                    m.times_as_ruler += 1;
                    m.inherited_throne |= *inherited;
                    m.last_ruled = Some(date);
                });
            }
        }
        SimEvent::ThroneVacated { former_ruler } => {
            bump(world, *former_ruler, |m| m.last_ruled = Some(date))
        }
        SimEvent::SchemeCreated { initiator, .. } => {
            bump(world, *initiator, |m| m.schemes_started += 1)
        }
        SimEvent::SchemeJoined { character, .. } => {
            bump(world, *character, |m| m.schemes_joined += 1)
        }
        SimEvent::SchemeResolved {
            status,
            participants,
            ..
        } => {
            for c in participants {
                bump(world, *c, |m| match status {
                    SchemeStatus::Succeeded => m.schemes_succeeded += 1,
                    SchemeStatus::Failed => m.schemes_failed += 1,
                    SchemeStatus::Discovered => m.schemes_discovered += 1,
                    SchemeStatus::Abandoned => m.schemes_abandoned += 1,
                    SchemeStatus::Forming | SchemeStatus::Active => {}
                });
            }
        }
        _ => {}
    }
}

fn name(world: &World, entity: Entity) -> String {
    world
        .get::<SimEntity>(entity)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| "someone".to_string())
}

fn opt_name(world: &World, entity: Option<Entity>) -> String {
    entity.map_or_else(|| "nobody".to_string(), |e| name(world, e))
}

fn sim_id(world: &World, entity: Entity) -> Value {
    world
        .get_resource::<EntityRegistry>()
        .and_then(|r| r.get_sim(entity))
        .map_or(Value::Null, Value::from)
}

fn opt_id(world: &World, entity: Option<Entity>) -> Value {
    entity.map_or(Value::Null, |e| sim_id(world, e))
}

/// Human-readable line and structured payload for one event.
fn describe(world: &World, event: &SimEvent) -> (String, Value) {
    let n = |e: &Entity| name(world, *e);
    let id = |e: &Entity| sim_id(world, *e);
    match event {
        SimEvent::EntityCreated { entity } => (
            format!("{} came into being", n(entity)),
            json!({ "entity": id(entity) }),
        ),
        SimEvent::ComponentReplaced { entity, kind } => (
            format!("{} had its {kind} replaced", n(entity)),
            json!({ "entity": id(entity), "component": kind }),
        ),
        SimEvent::EntityDeactivated { entity } => (
            format!("{} left the active world", n(entity)),
            json!({ "entity": id(entity) }),
        ),
        SimEvent::LifeStageChanged {
            character,
            from,
            to,
        } => (
            format!("{} grew from {from} to {to}", n(character)),
            json!({ "character": id(character), "from": from, "to": to }),
        ),
        SimEvent::CharacterRemovedFromPlay { character, cause } => (
            format!("{} left play ({cause})", n(character)),
            json!({ "character": id(character), "cause": cause }),
        ),
        SimEvent::PregnancyStarted { mother, father } => (
            format!("{} is with child by {}", n(mother), n(father)),
            json!({ "mother": id(mother), "father": id(father) }),
        ),
        SimEvent::CharacterBorn {
            child,
            mother,
            father,
            family,
        } => (
            format!(
                "{} was born to {} and {} of {}",
                n(child),
                n(mother),
                n(father),
                family.map_or_else(|| "no house".to_string(), |f| n(&f))
            ),
            json!({
                "child": id(child),
                "mother": id(mother),
                "father": id(father),
                "family": opt_id(world, *family),
            }),
        ),
        SimEvent::BetrothalFormed {
            proposer,
            betrothed,
        } => (
            format!("{} was betrothed to {}", n(proposer), n(betrothed)),
            json!({ "proposer": id(proposer), "betrothed": id(betrothed) }),
        ),
        SimEvent::BetrothalEnded {
            character,
            partner,
            reason,
        } => (
            format!(
                "the betrothal of {} and {} ended: {reason}",
                n(character),
                n(partner)
            ),
            json!({ "character": id(character), "partner": id(partner), "reason": reason }),
        ),
        SimEvent::MarriageFormed { a, b } => (
            format!("{} married {}", n(a), n(b)),
            json!({ "a": id(a), "b": id(b) }),
        ),
        SimEvent::MarriageEnded {
            character,
            spouse,
            end,
        } => (
            format!("the marriage of {} and {} ended: {end}", n(character), n(spouse)),
            json!({ "character": id(character), "spouse": id(spouse), "end": end }),
        ),
        SimEvent::FamilyHeadChanged {
            family,
            previous,
            head,
        } => (
            format!(
                "{} became head of {} after {}",
                n(head),
                n(family),
                opt_name(world, *previous)
            ),
            json!({ "family": id(family), "previous": opt_id(world, *previous), "head": id(head) }),
        ),
        SimEvent::FamilyHeadVacated {
            family,
            former_head,
        } => (
            format!("{} no longer leads {}", n(former_head), n(family)),
            json!({ "family": id(family), "former_head": id(former_head) }),
        ),
        SimEvent::FamilyRemovedFromPlay { family } => (
            format!("{} passed out of history", n(family)),
            json!({ "family": id(family) }),
        ),
        SimEvent::TerritoryTransferred {
            territory,
            from,
            to,
        } => (
            format!(
                "{} passed from {} to {}",
                n(territory),
                opt_name(world, *from),
                opt_name(world, *to)
            ),
            json!({ "territory": id(territory), "from": opt_id(world, *from), "to": opt_id(world, *to) }),
        ),
        SimEvent::RulerChanged {
            previous,
            ruler,
            inherited,
        } => (
            format!(
                "{} succeeded {} on the throne",
                opt_name(world, *ruler),
                opt_name(world, *previous)
            ),
            json!({
                "previous": opt_id(world, *previous),
                "ruler": opt_id(world, *ruler),
                "inherited": inherited,
            }),
        ),
        SimEvent::ThroneVacated { former_ruler } => (
            format!("the throne of {} stands empty", n(former_ruler)),
            json!({ "former_ruler": id(former_ruler) }),
        ),
        SimEvent::DynastyStarted { family, founder } => (
            format!("{} founded a dynasty of {}", n(founder), n(family)),
            json!({ "family": id(family), "founder": id(founder) }),
        ),
        SimEvent::DynastyEnded { family } => (
            format!("the dynasty of {} ended", n(family)),
            json!({ "family": id(family) }),
        ),
        SimEvent::SuccessionCrisis { family, vacated_by } => (
            match family {
                Some(f) => format!("{} left no heir to {}", n(vacated_by), n(f)),
                None => format!("{} left no heir to the throne", n(vacated_by)),
            },
            json!({ "family": opt_id(world, *family), "vacated_by": id(vacated_by) }),
        ),
        SimEvent::SchemeCreated {
            scheme,
            kind,
            initiator,
        } => (
            format!("{} began a {kind} scheme", n(initiator)),
            json!({ "scheme": id(scheme), "kind": kind, "initiator": id(initiator) }),
        ),
        SimEvent::SchemeJoined { scheme, character } => (
            format!("{} joined {}", n(character), n(scheme)),
            json!({ "scheme": id(scheme), "character": id(character) }),
        ),
        SimEvent::SchemeLeft { scheme, character } => (
            format!("{} withdrew from {}", n(character), n(scheme)),
            json!({ "scheme": id(scheme), "character": id(character) }),
        ),
        SimEvent::SchemeActivated { scheme } => (
            format!("{} is under way", n(scheme)),
            json!({ "scheme": id(scheme) }),
        ),
        SimEvent::SchemeResolved {
            scheme,
            kind,
            status,
            outcome,
            participants,
        } => (
            format!("{} ended as {status} ({outcome})", n(scheme)),
            json!({
                "scheme": id(scheme),
                "kind": kind,
                "status": status,
                "outcome": outcome,
                "participants": participants.iter().map(id).collect::<Vec<_>>(),
            }),
        ),
    }
}
