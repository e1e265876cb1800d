//! Betrothal matchmaking, breakups, and weddings.

use bevy_app::App;
use bevy_ecs::entity::Entity;
use bevy_ecs::message::Messages;
use bevy_ecs::query::With;
use bevy_ecs::schedule::IntoScheduleConfigs;
use bevy_ecs::world::World;
use rand::Rng;

use crate::ecs::clock::current_date;
use crate::ecs::commands::{SimCommand, SimCommandKind, apply_sim_commands, kinship_distance};
use crate::ecs::components::{Active, BetrothalTracker, Character, MarriageTracker};
use crate::ecs::relationships::RelationshipGraph;
use crate::ecs::resources::{CourtshipRng, sim_config};
use crate::ecs::schedule::{DomainSet, SimTick};
use crate::model::{LifeStage, Sex};

/// Chance per step that a qualifying pair actually gets betrothed.
const MATCH_CHANCE: f64 = 0.25;

pub fn add_courtship_systems(app: &mut App) {
    app.add_systems(
        SimTick,
        (evaluate_betrothals, apply_sim_commands)
            .chain()
            .in_set(DomainSet::Courtship),
    );
}

struct Single {
    entity: Entity,
    name: String,
    sex: Sex,
}

/// The lower of the two directed opinions.
fn mutual_opinion(graph: Option<&RelationshipGraph>, a: Entity, b: Entity) -> i32 {
    graph.map_or(0, |g| g.opinion(a, b).min(g.opinion(b, a)))
}

fn name_of(world: &World, entity: Entity) -> String {
    world
        .get::<Character>(entity)
        .map(|c| c.full_name())
        .unwrap_or_else(|| format!("{entity:?}"))
}

/// Reads the world and queues betrothal commands.
fn evaluate_betrothals(world: &mut World) {
    let config = sim_config(world);
    let now = current_date(world);
    let mut commands = Vec::new();

    let mut betrothed: Vec<(Entity, Entity, u32)> = {
        let mut q = world.query_filtered::<(Entity, &BetrothalTracker), With<Active>>();
        q.iter(world)
            .filter_map(|(e, t)| t.current().map(|b| (e, b.betrothed, now.months_since(b.started))))
            .filter(|(e, partner, _)| e < partner)
            .collect()
    };
    betrothed.sort();

    let graph = world.get_resource::<RelationshipGraph>();
    for (a, b, months) in betrothed {
        let (name_a, name_b) = (name_of(world, a), name_of(world, b));
        if mutual_opinion(graph, a, b) < 0 {
            commands.push(SimCommand::new(
                SimCommandKind::BreakBetrothal { character: a },
                format!("{name_a} and {name_b} broke off their betrothal"),
            ));
            continue;
        }
        let grown = [a, b].iter().all(|e| {
            world
                .get::<Character>(*e)
                .is_some_and(|c| c.life_stage >= LifeStage::YoungAdult)
        });
        if grown && months >= config.betrothal_months_before_marriage {
            commands.push(SimCommand::new(
                SimCommandKind::FormMarriage { a, b },
                format!("{name_a} married {name_b}"),
            ));
        }
    }

    let mut singles: Vec<Single> = {
        let mut q = world.query_filtered::<(
            Entity,
            &Character,
            Option<&BetrothalTracker>,
            Option<&MarriageTracker>,
        ), With<Active>>();
        q.iter(world)
            .filter(|(_, c, b, m)| {
                c.life_stage >= LifeStage::YoungAdult
                    && b.is_none_or(|t| t.current().is_none())
                    && m.is_none_or(|t| !t.is_married())
            })
            .map(|(entity, c, _, _)| Single {
                entity,
                name: c.full_name(),
                sex: c.sex,
            })
            .collect()
    };
    singles.sort_by_key(|s| s.entity);

    let graph = world.get_resource::<RelationshipGraph>();
    let mut candidates = Vec::new();
    for (i, a) in singles.iter().enumerate() {
        for b in &singles[i + 1..] {
            if a.sex == b.sex
                || mutual_opinion(graph, a.entity, b.entity) < config.betrothal_opinion_threshold
                || kinship_distance(world, a.entity, b.entity, config.kinship_distance_limit)
                    .is_some()
            {
                continue;
            }
            candidates.push((a, b));
        }
    }

    if !candidates.is_empty() {
        let mut taken: Vec<Entity> = Vec::new();
        let mut rolls = Vec::new();
        {
            let mut rng = world.resource_mut::<CourtshipRng>();
            for _ in &candidates {
                rolls.push(rng.0.random_bool(MATCH_CHANCE));
            }
        }
        for ((a, b), hit) in candidates.into_iter().zip(rolls) {
            if !hit || taken.contains(&a.entity) || taken.contains(&b.entity) {
                continue;
            }
            taken.extend([a.entity, b.entity]);
            commands.push(SimCommand::new(
                SimCommandKind::FormBetrothal {
                    proposer: a.entity,
                    other: b.entity,
                },
                format!("{} became betrothed to {}", a.name, b.name),
            ));
        }
    }

    if let Some(mut queue) = world.get_resource_mut::<Messages<SimCommand>>() {
        for cmd in commands {
            queue.write(cmd);
        }
    }
}
