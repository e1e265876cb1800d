#![allow(dead_code)]

use bevy_app::App;
use bevy_ecs::entity::Entity;
use bevy_ecs::world::World;
use dynasty_sim::ecs::build_sim_app_deterministic;
use dynasty_sim::ecs::resources::SimConfig;
use dynasty_sim::ecs::spawn::{found_family, link_parent_child, link_siblings, spawn_character};
use dynasty_sim::ecs::commands::join_family;
use dynasty_sim::ecs::time::SimDate;
use dynasty_sim::model::{LifeStage, Sex};

pub const START_YEAR: u32 = 300;

/// Deterministic app at `START_YEAR` with opinion decay switched off, so tests
/// control every opinion they care about.
pub fn test_app() -> App {
    test_app_with(SimConfig::default())
}

pub fn test_app_with(config: SimConfig) -> App {
    build_sim_app_deterministic(SimConfig {
        start_year: START_YEAR,
        opinion_decay_per_step: 0,
        ..config
    })
    .unwrap()
}

pub fn adult(world: &mut World, first: &str, surname: &str, sex: Sex, born_year: u32) -> Entity {
    let age = START_YEAR - born_year;
    spawn_character(
        world,
        first,
        surname,
        sex,
        SimDate::from_year(born_year),
        LifeStage::from_age(age),
    )
}

/// A head with two children, the first older than the second.
pub struct House {
    pub family: Entity,
    pub head: Entity,
    pub elder: Entity,
    pub younger: Entity,
}

pub fn house(world: &mut World, surname: &str) -> House {
    let head = adult(world, "Head", surname, Sex::Male, START_YEAR - 50);
    let family = found_family(world, surname, head).unwrap();
    let elder = adult(world, "Elder", surname, Sex::Female, START_YEAR - 25);
    let younger = adult(world, "Younger", surname, Sex::Male, START_YEAR - 22);
    for child in [elder, younger] {
        join_family(world, child, family).unwrap();
        link_parent_child(world, head, child).unwrap();
    }
    link_siblings(world, elder, younger).unwrap();
    House {
        family,
        head,
        elder,
        younger,
    }
}

/// Number of active characters flagged as head of `family`.
pub fn active_heads(world: &mut World, family: Entity) -> usize {
    use dynasty_sim::ecs::components::{Active, Character};
    let mut q = world.query_filtered::<&Character, bevy_ecs::query::With<Active>>();
    q.iter(world)
        .filter(|c| c.family == Some(family) && c.is_head())
        .count()
}
