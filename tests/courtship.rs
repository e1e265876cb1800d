mod common;

use dynasty_sim::ecs::commands::{
    annul_marriage, break_betrothal, form_betrothal, form_marriage, remove_character_from_play,
};
use dynasty_sim::ecs::components::{BetrothalTracker, Kinship, MarriageTracker};
use dynasty_sim::ecs::spawn::link_parent_child;
use dynasty_sim::ecs::test_helpers::tick;
use dynasty_sim::ecs::{CharacterMetrics, EventLog, SimError};
use dynasty_sim::model::{BetrothalEnd, EventKind, Ineligibility, MarriageEnd, Sex};

use common::{adult, test_app};

#[test]
fn new_betrothal_archives_the_old_one_unchanged() {
    let mut app = test_app();
    let world = app.world_mut();
    let a = adult(world, "Ansel", "Crow", Sex::Male, 270);
    let b = adult(world, "Brisa", "Dove", Sex::Female, 272);
    let c = adult(world, "Cela", "Finch", Sex::Female, 274);

    form_betrothal(world, a, b).unwrap();
    let first = world
        .get::<BetrothalTracker>(a)
        .unwrap()
        .current()
        .cloned()
        .unwrap();
    assert_eq!(break_betrothal(world, b).unwrap(), a);
    form_betrothal(world, a, c).unwrap();

    let tracker = world.get::<BetrothalTracker>(a).unwrap();
    assert_eq!(tracker.current().unwrap().betrothed, c);
    assert_eq!(tracker.past().len(), 1);
    assert_eq!(tracker.past()[0].record, first);
    assert_eq!(tracker.past()[0].reason, BetrothalEnd::Broken);
    assert_eq!(tracker.past_by_id(first.id).unwrap().record, first);
    assert!(world.get::<BetrothalTracker>(b).unwrap().current().is_none());
}

#[test]
fn close_kin_cannot_wed() {
    let mut app = test_app();
    let world = app.world_mut();
    let parent = adult(world, "Orla", "Vey", Sex::Female, 250);
    let son = adult(world, "Per", "Vey", Sex::Male, 275);
    link_parent_child(world, parent, son).unwrap();
    let err = form_betrothal(world, parent, son).unwrap_err();
    assert_eq!(
        err,
        SimError::IneligiblePartner {
            a: parent,
            b: son,
            reason: Ineligibility::Kinship
        }
    );
}

#[test]
fn death_widows_the_spouse_and_frees_the_betrothed() {
    let mut app = test_app();
    let world = app.world_mut();
    let a = adult(world, "Hew", "Lark", Sex::Male, 270);
    let b = adult(world, "Ida", "Moss", Sex::Female, 271);
    let c = adult(world, "Jory", "Nash", Sex::Male, 272);
    let d = adult(world, "Kit", "Oake", Sex::Female, 273);
    form_marriage(world, a, b).unwrap();
    form_betrothal(world, c, d).unwrap();

    remove_character_from_play(world, a, "drowned").unwrap();
    remove_character_from_play(world, d, "drowned").unwrap();

    let widow = world.get::<MarriageTracker>(b).unwrap();
    assert!(!widow.is_married());
    assert_eq!(widow.past()[0].end, MarriageEnd::Widowed);
    assert_eq!(world.get::<Kinship>(b).unwrap().spouse, None);
    let jilted = world.get::<BetrothalTracker>(c).unwrap();
    assert!(jilted.current().is_none());
    assert_eq!(jilted.past()[0].reason, BetrothalEnd::PartnerLeftPlay);

    tick(&mut app, 1);
    let world = app.world();
    assert_eq!(world.get::<CharacterMetrics>(b).unwrap().times_widowed, 1);
    assert_eq!(world.get::<CharacterMetrics>(a).unwrap().times_widowed, 0);
    let log = world.resource::<EventLog>();
    assert_eq!(log.of_kind(EventKind::MarriageEnded).count(), 1);
    assert_eq!(log.of_kind(EventKind::BetrothalEnded).count(), 1);
}

#[test]
fn annulment_frees_both_parties() {
    let mut app = test_app();
    let world = app.world_mut();
    let a = adult(world, "Lorn", "Pike", Sex::Male, 270);
    let b = adult(world, "Mira", "Quill", Sex::Female, 271);
    form_marriage(world, a, b).unwrap();
    assert_eq!(annul_marriage(world, b).unwrap(), a);
    assert!(!world.get::<MarriageTracker>(a).unwrap().is_married());
    assert_eq!(
        world.get::<MarriageTracker>(a).unwrap().past()[0].end,
        MarriageEnd::Annulled
    );
    assert!(annul_marriage(world, a).is_err());
    form_marriage(world, a, b).unwrap();
    assert_eq!(world.get::<MarriageTracker>(a).unwrap().past().len(), 1);
}

#[test]
fn married_characters_are_not_eligible() {
    let mut app = test_app();
    let world = app.world_mut();
    let a = adult(world, "Ned", "Rye", Sex::Male, 270);
    let b = adult(world, "Ona", "Sill", Sex::Female, 271);
    let c = adult(world, "Pia", "Teel", Sex::Female, 272);
    form_marriage(world, a, b).unwrap();
    assert!(matches!(
        form_betrothal(world, a, c),
        Err(SimError::IneligiblePartner {
            reason: Ineligibility::AlreadyMarried,
            ..
        })
    ));
}
