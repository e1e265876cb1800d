use bevy_ecs::entity::Entity;
use bevy_ecs::resource::Resource;

use crate::ecs::time::SimDate;

/// An unbroken line of rulers from one family.
#[derive(Debug, Clone, PartialEq)]
pub struct Dynasty {
    pub family: Entity,
    pub founder: Entity,
    pub started: SimDate,
    pub ended: Option<SimDate>,
    pub rulers: Vec<Entity>,
}

impl Dynasty {
    pub fn is_current(&self) -> bool {
        self.ended.is_none()
    }
}

/// Realm-wide rulership state. Mutated only through `set_current_ruler`.
#[derive(Resource, Debug, Clone, Default)]
pub struct Realm {
    pub(crate) ruler: Option<Entity>,
    pub(crate) ruling_family: Option<Entity>,
    /// The last ruler, while the throne waits on succession.
    pub(crate) vacated_by: Option<Entity>,
    pub(crate) previous_rulers: Vec<Entity>,
    pub(crate) dynasties: Vec<Dynasty>,
}

impl Realm {
    pub fn ruler(&self) -> Option<Entity> {
        self.ruler
    }

    pub fn ruling_family(&self) -> Option<Entity> {
        self.ruling_family
    }

    pub fn vacated_by(&self) -> Option<Entity> {
        self.vacated_by
    }

    pub fn previous_rulers(&self) -> &[Entity] {
        &self.previous_rulers
    }

    pub fn dynasties(&self) -> &[Dynasty] {
        &self.dynasties
    }

    pub fn current_dynasty(&self) -> Option<&Dynasty> {
        self.dynasties.last().filter(|d| d.is_current())
    }

    pub(crate) fn current_dynasty_mut(&mut self) -> Option<&mut Dynasty> {
        self.dynasties.last_mut().filter(|d| d.is_current())
    }
}
