//! What each scheme kind does to the world when it completes.

use std::collections::BTreeMap;

use bevy_ecs::entity::Entity;
use bevy_ecs::resource::Resource;
use bevy_ecs::world::World;

use crate::ecs::components::{Character, Family, Scheme, SchemeTarget};
use crate::ecs::error::SimError;
use crate::ecs::resources::Realm;
use crate::ecs::store;
use crate::model::SchemeKind;

use super::apply_family::{set_current_ruler, transfer_territory, validate_ruler};
use super::apply_lifecycle::remove_character_from_play;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectOutcome {
    Applied,
    Failed(String),
}

/// Effect handler for one scheme kind.
///
/// `check` decides whether the effect can land; `apply` performs it and runs
/// only after a successful check.
pub trait SchemeEffect: Send + Sync {
    fn check(&self, world: &World, scheme: &Scheme) -> EffectOutcome;
    fn apply(&self, world: &mut World, scheme: &Scheme) -> Result<(), SimError>;
}

/// Handlers keyed by scheme kind.
#[derive(Resource)]
pub struct SchemeEffects {
    handlers: BTreeMap<SchemeKind, Box<dyn SchemeEffect>>,
}

impl Default for SchemeEffects {
    fn default() -> Self {
        let mut effects = Self {
            handlers: BTreeMap::new(),
        };
        effects.register(SchemeKind::Coup, Coup);
        effects.register(SchemeKind::Assassination, Assassination);
        effects.register(SchemeKind::SeizeTerritory, SeizeTerritory);
        effects
    }
}

impl SchemeEffects {
    /// Install a handler, replacing any existing one for `kind`.
    pub fn register(&mut self, kind: SchemeKind, effect: impl SchemeEffect + 'static) {
        self.handlers.insert(kind, Box::new(effect));
    }

    pub fn get(&self, kind: SchemeKind) -> Option<&dyn SchemeEffect> {
        self.handlers.get(&kind).map(|h| h.as_ref())
    }
}

fn character_target(scheme: &Scheme) -> Result<Entity, EffectOutcome> {
    match scheme.target() {
        SchemeTarget::Character(c) => Ok(c),
        SchemeTarget::Family(_) => Err(EffectOutcome::Failed("expected a character target".into())),
    }
}

/// The initiator takes the throne from the target.
struct Coup;

impl SchemeEffect for Coup {
    fn check(&self, world: &World, scheme: &Scheme) -> EffectOutcome {
        let target = match character_target(scheme) {
            Ok(t) => t,
            Err(failed) => return failed,
        };
        let ruler = world.get_resource::<Realm>().and_then(|r| r.ruler());
        if ruler != Some(target) {
            return EffectOutcome::Failed("target no longer rules".into());
        }
        match validate_ruler(world, scheme.initiator()) {
            Ok(_) => EffectOutcome::Applied,
            Err(err) => EffectOutcome::Failed(err.to_string()),
        }
    }

    fn apply(&self, world: &mut World, scheme: &Scheme) -> Result<(), SimError> {
        set_current_ruler(world, Some(scheme.initiator()))
    }
}

/// The target is removed from play.
struct Assassination;

impl SchemeEffect for Assassination {
    fn check(&self, world: &World, scheme: &Scheme) -> EffectOutcome {
        match character_target(scheme) {
            Ok(target) if store::is_active(world, target) => EffectOutcome::Applied,
            Ok(_) => EffectOutcome::Failed("target already out of play".into()),
            Err(failed) => failed,
        }
    }

    fn apply(&self, world: &mut World, scheme: &Scheme) -> Result<(), SimError> {
        let target = scheme.target().entity();
        remove_character_from_play(world, target, "assassinated").map(|_| ())
    }
}

/// The target family's territory passes to the initiator's family.
struct SeizeTerritory;

impl SeizeTerritory {
    /// The territory to seize and the family that claims it.
    fn plan(world: &World, scheme: &Scheme) -> Result<(Entity, Entity), String> {
        let SchemeTarget::Family(target) = scheme.target() else {
            return Err("expected a family target".into());
        };
        let territory = world
            .get::<Family>(target)
            .and_then(|f| f.territories.first().copied())
            .ok_or("target family holds no territory")?;
        let claimant = world
            .get::<Character>(scheme.initiator())
            .and_then(|c| c.family)
            .filter(|f| *f != target && store::is_active(world, *f))
            .ok_or("initiator has no family to claim for")?;
        Ok((territory, claimant))
    }
}

impl SchemeEffect for SeizeTerritory {
    fn check(&self, world: &World, scheme: &Scheme) -> EffectOutcome {
        match Self::plan(world, scheme) {
            Ok(_) => EffectOutcome::Applied,
            Err(reason) => EffectOutcome::Failed(reason),
        }
    }

    fn apply(&self, world: &mut World, scheme: &Scheme) -> Result<(), SimError> {
        let (territory, claimant) = Self::plan(world, scheme).map_err(SimError::Precondition)?;
        transfer_territory(world, territory, Some(claimant))
    }
}
