//! Yearly aging, natural death, conception, and births.

use bevy_app::App;
use bevy_ecs::entity::Entity;
use bevy_ecs::message::MessageWriter;
use bevy_ecs::query::{With, Without};
use bevy_ecs::schedule::IntoScheduleConfigs;
use bevy_ecs::system::{Query, Res, ResMut};
use rand::Rng;

use crate::ecs::clock::SimClock;
use crate::ecs::commands::{SimCommand, SimCommandKind, apply_sim_commands};
use crate::ecs::components::{Active, Character, MarriageTracker, Pregnancy};
use crate::ecs::conditions::yearly;
use crate::ecs::events::SimEvent;
use crate::ecs::resources::{LifecycleRng, SimConfig};
use crate::ecs::schedule::{DomainSet, SimTick};
use crate::model::{LifeStage, Sex};

pub fn add_lifecycle_systems(app: &mut App) {
    app.add_systems(
        SimTick,
        (
            (age_characters, check_mortality, check_conceptions)
                .chain()
                .run_if(yearly),
            deliver_births,
            apply_sim_commands,
        )
            .chain()
            .in_set(DomainSet::Lifecycle),
    );
}

fn age_characters(
    clock: Res<SimClock>,
    mut characters: Query<(Entity, &mut Character), With<Active>>,
    mut events: MessageWriter<SimEvent>,
) {
    for (entity, mut character) in characters.iter_mut() {
        let stage = LifeStage::from_age(character.age(clock.date));
        if stage != character.life_stage {
            events.write(SimEvent::LifeStageChanged {
                character: entity,
                from: character.life_stage,
                to: stage,
            });
            character.life_stage = stage;
        }
    }
}

fn check_mortality(
    clock: Res<SimClock>,
    characters: Query<(Entity, &Character), With<Active>>,
    mut commands: MessageWriter<SimCommand>,
) {
    let mut due: Vec<(Entity, String)> = characters
        .iter()
        .filter(|(_, c)| c.lifespan.is_some_and(|l| c.age(clock.date) >= l))
        .map(|(e, c)| (e, c.full_name()))
        .collect();
    due.sort_by_key(|(e, _)| *e);
    for (character, name) in due {
        commands.write(SimCommand::new(
            SimCommandKind::RemoveCharacter {
                character,
                cause: "old age".to_string(),
            },
            format!("{name} died of old age in {}", clock.date.year()),
        ));
    }
}

/// Married women of childbearing age roll once a year to conceive.
fn check_conceptions(
    clock: Res<SimClock>,
    config: Res<SimConfig>,
    women: Query<(Entity, &Character, &MarriageTracker), (With<Active>, Without<Pregnancy>)>,
    men: Query<&Character, With<Active>>,
    mut rng: ResMut<LifecycleRng>,
    mut commands: MessageWriter<SimCommand>,
) {
    let mut fertile: Vec<(Entity, Entity, String)> = women
        .iter()
        .filter(|(_, c, _)| {
            c.sex == Sex::Female
                && c.life_stage >= LifeStage::YoungAdult
                && c.age(clock.date) <= config.max_maternal_age
        })
        .filter_map(|(e, c, t)| {
            let husband = t.current()?.spouse;
            men.get(husband)
                .ok()
                .filter(|h| h.sex == Sex::Male)
                .map(|_| (e, husband, c.full_name()))
        })
        .collect();
    fertile.sort_by_key(|(e, _, _)| *e);

    for (mother, father, name) in fertile {
        if !rng.0.random_bool(config.conception_chance_per_year) {
            continue;
        }
        commands.write(SimCommand::new(
            SimCommandKind::Conceive { mother, father },
            format!("{name} conceived in {}", clock.date.year()),
        ));
    }
}

fn deliver_births(
    clock: Res<SimClock>,
    mothers: Query<(Entity, &Character, &Pregnancy), With<Active>>,
    mut commands: MessageWriter<SimCommand>,
) {
    let mut due: Vec<(Entity, String)> = mothers
        .iter()
        .filter(|(_, _, p)| p.due <= clock.date)
        .map(|(e, c, _)| (e, c.full_name()))
        .collect();
    due.sort_by_key(|(e, _)| *e);
    for (mother, name) in due {
        commands.write(SimCommand::new(
            SimCommandKind::GiveBirth { mother },
            format!("{name} gave birth"),
        ));
    }
}
