//! Heir resolution from the family tree.
//!
//! A depth chart lists every relative of the vacating holder who could take
//! the role, nearest group first and earliest birth first within a group.
//! An empty chart is a normal outcome and leads to a succession crisis.

use bevy_ecs::entity::Entity;
use bevy_ecs::query::With;
use bevy_ecs::world::World;

use crate::ecs::clock::current_date;
use crate::ecs::commands::{set_current_ruler, set_family_head};
use crate::ecs::components::{Active, Character, Family, Kinship, MarriageTracker};
use crate::ecs::error::SimError;
use crate::ecs::events::{SimEvent, publish};
use crate::ecs::resources::{Realm, sim_config};
use crate::ecs::store;
use crate::ecs::time::SimDate;
use crate::model::{KinGroup, LifeStage, MarriageEnd, RoleFlags};

/// Youngest life stage that may inherit.
const MIN_HEIR_STAGE: LifeStage = LifeStage::Adolescent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthChartEntry {
    pub candidate: Entity,
    pub group: KinGroup,
    /// Rank of `group` in the configured order. 0 is the nearest.
    pub distance: u32,
    pub born: SimDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepthChart {
    entries: Vec<DepthChartEntry>,
}

impl DepthChart {
    pub fn entries(&self) -> &[DepthChartEntry] {
        &self.entries
    }

    pub fn first(&self) -> Option<&DepthChartEntry> {
        self.entries.first()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn position(&self, candidate: Entity) -> Option<usize> {
        self.entries.iter().position(|e| e.candidate == candidate)
    }
}

fn kin(world: &World, character: Entity) -> Kinship {
    world.get::<Kinship>(character).cloned().unwrap_or_default()
}

/// The living spouse, or the one the vacator's departure left widowed.
fn spouse_of(world: &World, vacator: Entity) -> Option<Entity> {
    let tracker = world.get::<MarriageTracker>(vacator)?;
    if let Some(current) = tracker.current() {
        return Some(current.spouse);
    }
    tracker
        .past()
        .last()
        .filter(|p| p.end == MarriageEnd::Widowed && !store::is_active(world, vacator))
        .map(|p| p.record.spouse)
}

/// Relatives of `vacator` that fall in `group`, before any filtering.
fn relatives(world: &World, vacator: Entity, group: KinGroup) -> Vec<Entity> {
    let own = kin(world, vacator);
    match group {
        KinGroup::Children => own.children,
        KinGroup::Spouse => spouse_of(world, vacator).into_iter().collect(),
        KinGroup::Siblings => own.siblings,
        KinGroup::Collateral => {
            let nephews = own
                .siblings
                .iter()
                .flat_map(|s| kin(world, *s).children);
            let uncles = own.parents.iter().flat_map(|p| kin(world, *p).siblings);
            nephews.chain(uncles).collect()
        }
    }
}

fn eligible(world: &World, candidate: Entity, family: Entity) -> bool {
    store::is_active(world, candidate)
        && world.get::<Character>(candidate).is_some_and(|c| {
            c.family == Some(family)
                && c.life_stage >= MIN_HEIR_STAGE
                && !c.roles.contains(RoleFlags::DISINHERITED)
        })
}

/// Build the ordered list of eligible successors to `vacator` within their
/// current family. A vacator without a family has an empty chart.
pub fn depth_chart(world: &World, vacator: Entity) -> Result<DepthChart, SimError> {
    match store::get_component::<Character>(world, vacator)?.family {
        Some(family) => depth_chart_for(world, family, vacator),
        None => Ok(DepthChart::default()),
    }
}

/// Build the ordered list of successors to `vacator`'s role in `family`.
///
/// Candidates must be active members of `family`, old enough, and not
/// disinherited. Each relative appears once, in their nearest group. The
/// vacator need not still belong to `family`.
pub fn depth_chart_for(
    world: &World,
    family: Entity,
    vacator: Entity,
) -> Result<DepthChart, SimError> {
    store::get_component::<Character>(world, vacator)?;
    let order = sim_config(world).succession_order;
    let mut seen = vec![vacator];
    let mut entries = Vec::new();
    for (rank, group) in order.into_iter().enumerate() {
        for candidate in relatives(world, vacator, group) {
            if seen.contains(&candidate) {
                continue;
            }
            seen.push(candidate);
            if !eligible(world, candidate, family) {
                continue;
            }
            let Some(record) = world.get::<Character>(candidate) else {
                continue;
            };
            entries.push(DepthChartEntry {
                candidate,
                group,
                distance: rank as u32,
                born: record.born,
            });
        }
    }
    entries.sort_by_key(|e| (e.distance, e.born, e.candidate));
    Ok(DepthChart { entries })
}

/// First candidate of the depth chart. Reads only.
pub fn resolve_successor(world: &World, vacator: Entity) -> Result<Option<Entity>, SimError> {
    Ok(depth_chart(world, vacator)?.first().map(|e| e.candidate))
}

/// Fill a headless family from its former head's depth chart.
///
/// With no eligible candidate the head stays vacant and the family keeps
/// `vacated_by`, so a later step can still crown a relative who comes of age.
/// The crisis is published once per vacancy.
pub fn apply_family_succession(
    world: &mut World,
    family: Entity,
) -> Result<Option<Entity>, SimError> {
    let record = store::get_component::<Family>(world, family)?;
    let (None, Some(vacator)) = (record.head, record.vacated_by) else {
        return Ok(None);
    };
    let already_in_crisis = record.crisis_since.is_some();
    if !store::is_active(world, family) {
        return Ok(None);
    }
    let heir = depth_chart_for(world, family, vacator)?
        .first()
        .map(|e| e.candidate);
    match heir {
        Some(heir) => {
            tracing::debug!(?family, ?heir, "family head inherited");
            set_family_head(world, family, Some(heir))?;
            Ok(Some(heir))
        }
        None if already_in_crisis => Ok(None),
        None => {
            tracing::info!(?family, ?vacator, "family succession crisis");
            let date = current_date(world);
            store::get_component_mut::<Family>(world, family)?.crisis_since = Some(date);
            publish(
                world,
                SimEvent::SuccessionCrisis {
                    family: Some(family),
                    vacated_by: vacator,
                },
            );
            Ok(None)
        }
    }
}

/// Fill a vacant throne from the last ruler's depth chart. With no eligible
/// candidate the throne is cleared and the dynasty ends.
pub fn apply_throne_succession(world: &mut World) -> Result<Option<Entity>, SimError> {
    let Some(realm) = world.get_resource::<Realm>() else {
        return Ok(None);
    };
    let (None, Some(vacator)) = (realm.ruler(), realm.vacated_by()) else {
        return Ok(None);
    };
    let heir = match realm.ruling_family() {
        Some(family) => depth_chart_for(world, family, vacator)?
            .first()
            .map(|e| e.candidate),
        None => resolve_successor(world, vacator)?,
    };
    match heir {
        Some(heir) => {
            tracing::info!(?heir, "throne inherited");
            set_current_ruler(world, Some(heir))?;
            Ok(Some(heir))
        }
        None => {
            tracing::info!(?vacator, "throne succession crisis");
            publish(
                world,
                SimEvent::SuccessionCrisis {
                    family: None,
                    vacated_by: vacator,
                },
            );
            set_current_ruler(world, None)?;
            Ok(None)
        }
    }
}

/// Put `HEIR` on the first candidate of every sitting head's chart and
/// nowhere else.
pub fn refresh_heir_flags(world: &mut World) -> Result<(), SimError> {
    let heads: Vec<Entity> = {
        let mut q = world.query_filtered::<&Family, With<Active>>();
        q.iter(world).filter_map(|f| f.head).collect()
    };
    let mut heirs = Vec::new();
    for head in heads {
        if let Some(heir) = resolve_successor(world, head)? {
            heirs.push(heir);
        }
    }
    let mut q = world.query::<(Entity, &mut Character)>();
    for (entity, mut record) in q.iter_mut(world) {
        let is_heir = heirs.contains(&entity);
        if record.roles.contains(RoleFlags::HEIR) != is_heir {
            record.roles.set(RoleFlags::HEIR, is_heir);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::commands::{form_marriage, join_family, remove_character_from_play};
    use crate::ecs::spawn::{found_family, link_parent_child, link_siblings, spawn_character};
    use crate::model::Sex;

    struct Tree {
        world: World,
        family: Entity,
        head: Entity,
        elder: Entity,
        younger: Entity,
        sibling: Entity,
    }

    fn tree() -> Tree {
        let mut world = World::new();
        let head = spawn_character(
            &mut world,
            "Aldric",
            "Vale",
            Sex::Male,
            SimDate::from_year(1),
            LifeStage::Adult,
        );
        let family = found_family(&mut world, "Vale", head).unwrap();
        let sibling = spawn_character(
            &mut world,
            "Bertram",
            "Vale",
            Sex::Male,
            SimDate::from_year(3),
            LifeStage::Adult,
        );
        let elder = spawn_character(
            &mut world,
            "Cora",
            "Vale",
            Sex::Female,
            SimDate::from_year(30),
            LifeStage::YoungAdult,
        );
        let younger = spawn_character(
            &mut world,
            "Dain",
            "Vale",
            Sex::Male,
            SimDate::from_year(32),
            LifeStage::Adolescent,
        );
        for member in [sibling, elder, younger] {
            join_family(&mut world, member, family).unwrap();
        }
        link_siblings(&mut world, head, sibling).unwrap();
        link_parent_child(&mut world, head, elder).unwrap();
        link_parent_child(&mut world, head, younger).unwrap();
        link_siblings(&mut world, elder, younger).unwrap();
        Tree {
            world,
            family,
            head,
            elder,
            younger,
            sibling,
        }
    }

    #[test]
    fn children_rank_before_siblings_by_birth() {
        let t = tree();
        let chart = depth_chart(&t.world, t.head).unwrap();
        let order: Vec<Entity> = chart.entries().iter().map(|e| e.candidate).collect();
        assert_eq!(order, vec![t.elder, t.younger, t.sibling]);
        assert_eq!(chart.entries()[0].distance, 0);
        assert_eq!(chart.entries()[2].distance, 2);
        assert_eq!(chart.entries()[2].group, KinGroup::Siblings);
    }

    #[test]
    fn spouse_ranks_between_children_and_siblings() {
        let mut t = tree();
        let wife = spawn_character(
            &mut t.world,
            "Elin",
            "Rook",
            Sex::Female,
            SimDate::from_year(4),
            LifeStage::Adult,
        );
        form_marriage(&mut t.world, t.head, wife).unwrap();
        assert!(depth_chart(&t.world, t.head).unwrap().position(wife).is_none());

        join_family(&mut t.world, wife, t.family).unwrap();
        let chart = depth_chart(&t.world, t.head).unwrap();
        assert_eq!(chart.position(wife), Some(2));
        assert_eq!(chart.entries()[2].group, KinGroup::Spouse);

        remove_character_from_play(&mut t.world, t.head, "test").unwrap();
        for child in [t.elder, t.younger] {
            remove_character_from_play(&mut t.world, child, "test").unwrap();
        }
        assert_eq!(
            apply_family_succession(&mut t.world, t.family).unwrap(),
            Some(wife)
        );
    }

    #[test]
    fn departed_head_is_succeeded_within_the_old_family() {
        let mut t = tree();
        let other_founder = spawn_character(
            &mut t.world,
            "Garr",
            "Holt",
            Sex::Male,
            SimDate::from_year(2),
            LifeStage::Adult,
        );
        let other = found_family(&mut t.world, "Holt", other_founder).unwrap();
        join_family(&mut t.world, t.head, other).unwrap();

        let family = t.world.get::<Family>(t.family).unwrap();
        assert_eq!(family.head, None);
        assert_eq!(family.vacated_by, Some(t.head));
        assert!(depth_chart(&t.world, t.head).unwrap().is_empty());

        let heir = apply_family_succession(&mut t.world, t.family).unwrap();
        assert_eq!(heir, Some(t.elder));
        assert_eq!(t.world.get::<Family>(t.family).unwrap().head, Some(t.elder));
    }

    #[test]
    fn ineligible_candidates_are_filtered() {
        let mut t = tree();
        t.world
            .get_mut::<Character>(t.elder)
            .unwrap()
            .roles
            .insert(RoleFlags::DISINHERITED);
        t.world.get_mut::<Character>(t.younger).unwrap().life_stage = LifeStage::Child;
        assert_eq!(resolve_successor(&t.world, t.head).unwrap(), Some(t.sibling));

        remove_character_from_play(&mut t.world, t.sibling, "test").unwrap();
        let chart = depth_chart(&t.world, t.head).unwrap();
        assert!(chart.is_empty());
    }

    #[test]
    fn configured_order_changes_ranking() {
        let mut t = tree();
        let mut config = crate::ecs::resources::SimConfig::default();
        config.succession_order = [
            KinGroup::Siblings,
            KinGroup::Children,
            KinGroup::Spouse,
            KinGroup::Collateral,
        ];
        t.world.insert_resource(config);
        assert_eq!(resolve_successor(&t.world, t.head).unwrap(), Some(t.sibling));
    }

    #[test]
    fn family_succession_fills_vacant_head() {
        let mut t = tree();
        remove_character_from_play(&mut t.world, t.head, "test").unwrap();
        let family = t.world.get::<Family>(t.family).unwrap();
        assert_eq!(family.head, None);
        assert_eq!(family.vacated_by, Some(t.head));

        let heir = apply_family_succession(&mut t.world, t.family).unwrap();
        assert_eq!(heir, Some(t.elder));
        let family = t.world.get::<Family>(t.family).unwrap();
        assert_eq!(family.head, Some(t.elder));
        assert_eq!(family.vacated_by, None);
        assert!(t.world.get::<Character>(t.elder).unwrap().is_head());
    }

    #[test]
    fn empty_chart_leaves_role_vacant() {
        let mut world = World::new();
        let loner = spawn_character(
            &mut world,
            "Edda",
            "Moor",
            Sex::Female,
            SimDate::from_year(1),
            LifeStage::Adult,
        );
        let family = found_family(&mut world, "Moor", loner).unwrap();
        remove_character_from_play(&mut world, loner, "test").unwrap();
        assert_eq!(apply_family_succession(&mut world, family).unwrap(), None);
        let record = world.get::<Family>(family).unwrap();
        assert_eq!(record.head, None);
        assert_eq!(record.vacated_by, Some(loner));
        assert!(record.crisis_since.is_some());
    }

    #[test]
    fn vacancy_is_filled_once_a_child_comes_of_age() {
        let mut t = tree();
        remove_character_from_play(&mut t.world, t.sibling, "test").unwrap();
        remove_character_from_play(&mut t.world, t.elder, "test").unwrap();
        t.world.get_mut::<Character>(t.younger).unwrap().life_stage = LifeStage::Child;
        remove_character_from_play(&mut t.world, t.head, "test").unwrap();

        assert_eq!(apply_family_succession(&mut t.world, t.family).unwrap(), None);
        assert_eq!(apply_family_succession(&mut t.world, t.family).unwrap(), None);

        t.world.get_mut::<Character>(t.younger).unwrap().life_stage = LifeStage::Adolescent;
        assert_eq!(
            apply_family_succession(&mut t.world, t.family).unwrap(),
            Some(t.younger)
        );
        let family = t.world.get::<Family>(t.family).unwrap();
        assert_eq!(family.vacated_by, None);
        assert_eq!(family.crisis_since, None);
    }

    #[test]
    fn heir_flag_follows_the_chart() {
        let mut t = tree();
        refresh_heir_flags(&mut t.world).unwrap();
        let heir = |w: &World, e| w.get::<Character>(e).unwrap().roles.contains(RoleFlags::HEIR);
        assert!(heir(&t.world, t.elder));
        assert!(!heir(&t.world, t.younger));

        remove_character_from_play(&mut t.world, t.elder, "test").unwrap();
        refresh_heir_flags(&mut t.world).unwrap();
        assert!(heir(&t.world, t.younger));
        assert!(!heir(&t.world, t.elder));
    }
}
