use bevy_ecs::component::Component;
use bevy_ecs::entity::Entity;

use crate::ecs::time::SimDate;
use crate::model::{LifeStage, RoleFlags, Sex};

/// Identity and standing of a single character.
#[derive(Component, Debug, Clone)]
pub struct Character {
    pub first_name: String,
    pub surname: String,
    pub sex: Sex,
    pub life_stage: LifeStage,
    pub born: SimDate,
    pub died: Option<SimDate>,
    /// Family the character currently belongs to, if any.
    pub family: Option<Entity>,
    /// Family the character was born into. Never changes after creation.
    pub birth_family: Option<Entity>,
    pub roles: RoleFlags,
    /// Age in years at which the character dies of old age.
    pub lifespan: Option<u32>,
}

impl Character {
    pub fn new(
        first_name: impl Into<String>,
        surname: impl Into<String>,
        sex: Sex,
        born: SimDate,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            surname: surname.into(),
            sex,
            life_stage: LifeStage::Child,
            born,
            died: None,
            family: None,
            birth_family: None,
            roles: RoleFlags::NONE,
            lifespan: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.surname)
    }

    pub fn age(&self, now: SimDate) -> u32 {
        now.years_since(self.born)
    }

    pub fn is_head(&self) -> bool {
        self.roles.contains(RoleFlags::FAMILY_HEAD)
    }

    pub fn is_ruler(&self) -> bool {
        self.roles.contains(RoleFlags::RULER)
    }
}

/// Family-tree links. All entries are lookup keys into the world.
#[derive(Component, Debug, Clone, Default)]
pub struct Kinship {
    pub parents: Vec<Entity>,
    pub children: Vec<Entity>,
    pub siblings: Vec<Entity>,
    pub spouse: Option<Entity>,
}

/// Carried by an expecting mother until the child is delivered.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Pregnancy {
    pub father: Entity,
    pub conceived: SimDate,
    pub due: SimDate,
}

/// Personality traits that feed scheme contribution and discovery risk.
/// Both values live in `[0, 1]`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Disposition {
    pub secrecy: f64,
    pub ambition: f64,
}

impl Default for Disposition {
    fn default() -> Self {
        Self {
            secrecy: 0.5,
            ambition: 0.5,
        }
    }
}

impl Disposition {
    pub fn new(secrecy: f64, ambition: f64) -> Self {
        Self {
            secrecy: secrecy.clamp(0.0, 1.0),
            ambition: ambition.clamp(0.0, 1.0),
        }
    }
}
