//! Multi-decade runs over a generated realm. `check_invariants` runs at the
//! end of every step, so a broken structural rule fails these tests outright.

mod common;

use bevy_app::App;
use bevy_ecs::entity::Entity;
use bevy_ecs::query::With;
use dynasty_sim::ecs::commands::{create_scheme, join_family, set_current_ruler};
use dynasty_sim::ecs::components::{
    Active, BetrothalTracker, Character, Family, Kinship, MarriageTracker, SchemeTarget,
};
use dynasty_sim::ecs::relationships::RelationshipGraph;
use dynasty_sim::ecs::spawn::{found_family, generate_character, link_parent_child, link_siblings};
use dynasty_sim::ecs::test_helpers::{current_year, tick};
use dynasty_sim::ecs::{EventLog, Realm, SimConfig, SimDate, store};
use dynasty_sim::model::{EventKind, SchemeKind, Sex};

use common::{START_YEAR, test_app_with};

const HOUSES: [&str; 4] = ["Ashgrove", "Blackmere", "Coldwater", "Dunmore"];

struct Seeded {
    families: Vec<Entity>,
    children: Vec<Vec<Entity>>,
}

fn seed_realm(app: &mut App) -> Seeded {
    let world = app.world_mut();
    let mut families = Vec::new();
    let mut children = Vec::new();
    for name in HOUSES {
        let founder = generate_character(world, Sex::Male, name, SimDate::from_year(START_YEAR - 45));
        let family = found_family(world, name, founder).unwrap();
        let kids: Vec<Entity> = [(Sex::Female, 20), (Sex::Male, 18), (Sex::Female, 15)]
            .into_iter()
            .map(|(sex, age)| {
                let kid = generate_character(world, sex, name, SimDate::from_year(START_YEAR - age));
                join_family(world, kid, family).unwrap();
                link_parent_child(world, founder, kid).unwrap();
                kid
            })
            .collect();
        for (i, a) in kids.iter().enumerate() {
            for b in &kids[i + 1..] {
                link_siblings(world, *a, *b).unwrap();
            }
        }
        families.push(family);
        children.push(kids);
    }

    let now = SimDate::from_year(START_YEAR);
    {
        let mut graph = world.resource_mut::<RelationshipGraph>();
        // Kids are born female, male, female; shifting by one pairs them
        // across sexes with the next house.
        for pair in children.windows(2) {
            let shifted = pair[1].iter().cycle().skip(1);
            for (a, b) in pair[0].iter().zip(shifted) {
                graph.adjust_opinion(*a, *b, 70, now).unwrap();
                graph.adjust_opinion(*b, *a, 70, now).unwrap();
            }
        }
    }

    let first_head = world.get::<Family>(families[0]).unwrap().head.unwrap();
    set_current_ruler(world, Some(first_head)).unwrap();
    let rebel = world.get::<Family>(families[1]).unwrap().head.unwrap();
    create_scheme(
        world,
        SchemeKind::Coup,
        rebel,
        SchemeTarget::Character(first_head),
    )
    .unwrap();
    create_scheme(
        world,
        SchemeKind::SeizeTerritory,
        children[2][0],
        SchemeTarget::Family(families[3]),
    )
    .unwrap();

    Seeded { families, children }
}

fn realm_app(seed: u64) -> (App, Seeded) {
    let mut app = test_app_with(SimConfig {
        seed,
        ..SimConfig::default()
    });
    let seeded = seed_realm(&mut app);
    (app, seeded)
}

#[test]
fn fifty_years_keep_structure_sound() {
    let (mut app, seeded) = realm_app(7);
    tick(&mut app, 600);
    assert_eq!(current_year(&app), START_YEAR + 50);

    let world = app.world_mut();
    let mut characters = world.query_filtered::<(Entity, &Character), With<Active>>();
    let living: Vec<(Entity, Character)> = characters
        .iter(world)
        .map(|(e, c)| (e, c.clone()))
        .collect();

    for family in &seeded.families {
        let heads = living
            .iter()
            .filter(|(_, c)| c.family == Some(*family) && c.is_head())
            .count();
        assert!(heads <= 1, "family {family:?} has {heads} heads");
        if let Some(head) = world.get::<Family>(*family).unwrap().head {
            assert!(store::is_active(world, head));
        }
    }

    let realm = world.resource::<Realm>();
    if let Some(ruler) = realm.ruler() {
        assert!(store::is_active(world, ruler));
    }
    assert!(realm.dynasties().iter().filter(|d| d.is_current()).count() <= 1);

    for (entity, _) in &living {
        if let Some(betrothed) = world
            .get::<BetrothalTracker>(*entity)
            .and_then(|t| t.current())
            .map(|b| b.betrothed)
        {
            let back = world.get::<BetrothalTracker>(betrothed).unwrap().current();
            assert_eq!(back.map(|b| b.betrothed), Some(*entity));
        }
        if let Some(spouse) = world
            .get::<MarriageTracker>(*entity)
            .and_then(|t| t.current())
            .map(|m| m.spouse)
        {
            let back = world.get::<MarriageTracker>(spouse).unwrap().current();
            assert_eq!(back.map(|m| m.spouse), Some(*entity));
        }
    }

    let graph = world.resource::<RelationshipGraph>();
    let range = graph.range();
    for kids in &seeded.children {
        for kid in kids {
            for edge in graph.edges_from(*kid) {
                assert!(graph.relationship(edge.target, *kid).is_some());
                assert!(edge.opinion() >= range.min && edge.opinion() <= range.max);
            }
        }
    }

    for (entity, record) in &living {
        if record.born > SimDate::from_year(START_YEAR) {
            let kin = world.get::<Kinship>(*entity).unwrap();
            assert_eq!(kin.parents.len(), 2, "newborn {entity:?} lacks parents");
        }
    }

    let log = world.resource::<EventLog>();
    assert!(log.of_kind(EventKind::CharacterRemoved).count() > 0);
    assert!(log.of_kind(EventKind::SchemeResolved).count() > 0);
    assert!(log.of_kind(EventKind::MarriageFormed).count() > 0);
    assert!(log.of_kind(EventKind::CharacterBorn).count() > 0);
}

#[test]
fn same_seed_same_history() {
    let history = |seed: u64| {
        let (mut app, _) = realm_app(seed);
        tick(&mut app, 240);
        app.world()
            .resource::<EventLog>()
            .records
            .iter()
            .map(|r| (r.kind, r.date, r.description.clone()))
            .collect::<Vec<_>>()
    };
    let first = history(11);
    assert!(!first.is_empty());
    assert_eq!(first, history(11));
}
