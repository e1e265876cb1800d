//! Conspirator recruitment and per-step scheme accrual.

use bevy_app::App;
use bevy_ecs::entity::Entity;
use bevy_ecs::message::MessageWriter;
use bevy_ecs::query::With;
use bevy_ecs::schedule::IntoScheduleConfigs;
use bevy_ecs::system::{Query, Res, ResMut};
use rand::Rng;

use crate::ecs::clock::SimClock;
use crate::ecs::commands::{SimCommand, SimCommandKind, apply_sim_commands};
use crate::ecs::components::{Active, Character, Disposition, Family, Scheme, SchemeTarget};
use crate::ecs::relationships::RelationshipGraph;
use crate::ecs::resources::{SchemeRng, SimConfig};
use crate::ecs::schedule::{DomainSet, SimTick};
use crate::model::{SchemeOutcome, SchemeStatus};

/// Opinion of the initiator a recruit must hold.
const RECRUIT_MIN_OPINION: i32 = 50;
const RECRUIT_CHANCE: f64 = 0.2;

const RISK_PER_PARTICIPANT: f64 = 2.0;
const SECRECY_DAMPING: f64 = 0.8;
const DISCOVERY_BASE_CHANCE: f64 = 0.1;

pub fn add_scheme_systems(app: &mut App) {
    app.add_systems(
        SimTick,
        (
            recruit_conspirators,
            apply_sim_commands,
            progress_schemes,
            apply_sim_commands,
        )
            .chain()
            .in_set(DomainSet::Schemes),
    );
}

/// Risk added per month for `participants` with the given mean secrecy.
pub fn discovery_risk_rate(participants: usize, mean_secrecy: f64) -> f64 {
    RISK_PER_PARTICIPANT * participants as f64 * (1.0 - mean_secrecy * SECRECY_DAMPING)
}

/// Per-step discovery roll once accumulated risk passes `threshold`.
pub fn discovery_chance(risk: f64, threshold: f64) -> f64 {
    if risk < threshold || threshold <= 0.0 {
        return 0.0;
    }
    (DISCOVERY_BASE_CHANCE + (risk - threshold) / threshold).min(1.0)
}

fn recruit_conspirators(
    schemes: Query<(Entity, &Scheme), With<Active>>,
    characters: Query<(Entity, &Character), With<Active>>,
    families: Query<&Family>,
    graph: Res<RelationshipGraph>,
    mut rng: ResMut<SchemeRng>,
    mut commands: MessageWriter<SimCommand>,
) {
    let mut open: Vec<(Entity, &Scheme)> = schemes.iter().filter(|(_, s)| s.is_open()).collect();
    open.sort_by_key(|(e, _)| *e);
    let mut pool: Vec<(Entity, &Character)> = characters.iter().collect();
    pool.sort_by_key(|(e, _)| *e);

    for (scheme_entity, scheme) in open {
        let initiator = scheme.initiator();
        let protected_family = match scheme.target() {
            SchemeTarget::Family(f) => Some(f),
            SchemeTarget::Character(c) => characters.get(c).ok().and_then(|(_, c)| c.family),
        };
        let recruit = pool.iter().find(|(candidate, record)| {
            *candidate != initiator
                && !scheme.is_participant(*candidate)
                && scheme.target().entity() != *candidate
                && (protected_family.is_none() || record.family != protected_family)
                && graph.opinion(*candidate, initiator) >= RECRUIT_MIN_OPINION
        });
        let Some((recruit, record)) = recruit else {
            continue;
        };
        if !rng.0.random_bool(RECRUIT_CHANCE) {
            continue;
        }
        let family_name = record
            .family
            .and_then(|f| families.get(f).ok())
            .map_or("no house", |f| f.name.as_str());
        commands.write(SimCommand::new(
            SimCommandKind::JoinScheme {
                scheme: scheme_entity,
                character: *recruit,
            },
            format!(
                "{} of {family_name} joined a {} scheme",
                record.full_name(),
                scheme.kind()
            ),
        ));
    }
}

fn progress_schemes(
    clock: Res<SimClock>,
    config: Res<SimConfig>,
    mut schemes: Query<(Entity, &mut Scheme), With<Active>>,
    dispositions: Query<&Disposition>,
    mut rng: ResMut<SchemeRng>,
    mut commands: MessageWriter<SimCommand>,
) {
    let months = clock.step_months as f64;
    let mut open: Vec<(Entity, bevy_ecs::change_detection::Mut<Scheme>)> =
        schemes.iter_mut().filter(|(_, s)| s.is_open()).collect();
    open.sort_by_key(|(e, _)| *e);

    for (entity, mut scheme) in open {
        if scheme.status() == SchemeStatus::Forming {
            if clock.date.months_since(scheme.created()) >= config.scheme_recruit_window_months {
                commands.write(SimCommand::new(
                    SimCommandKind::ResolveScheme {
                        scheme: entity,
                        outcome: SchemeOutcome::RecruitmentLapsed,
                    },
                    format!("a {} scheme failed to find enough conspirators", scheme.kind()),
                ));
            }
            continue;
        }

        let participants = scheme.participants().len();
        let mean_secrecy = scheme
            .participants()
            .keys()
            .map(|p| dispositions.get(*p).copied().unwrap_or_default().secrecy)
            .sum::<f64>()
            / participants.max(1) as f64;
        let progress = scheme.total_weight() * months;
        let risk = discovery_risk_rate(participants, mean_secrecy) * months;
        scheme.accrue(progress, risk);

        if scheme.progress() >= config.scheme_progress_threshold {
            commands.write(SimCommand::new(
                SimCommandKind::CompleteScheme { scheme: entity },
                format!("a {} scheme came to fruition", scheme.kind()),
            ));
            continue;
        }
        let chance = discovery_chance(scheme.discovery_risk(), config.scheme_discovery_threshold);
        if chance > 0.0 && rng.0.random_bool(chance) {
            commands.write(SimCommand::new(
                SimCommandKind::ResolveScheme {
                    scheme: entity,
                    outcome: SchemeOutcome::Discovered,
                },
                format!("a {} scheme was discovered", scheme.kind()),
            ));
        }
    }
}
