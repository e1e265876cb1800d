use bevy_ecs::component::Component;
use bevy_ecs::entity::Entity;

use crate::ecs::time::SimDate;

/// A named group of characters.
///
/// `head` is `None` while the family is waiting on succession; `vacated_by`
/// then names the former head so the depth chart can be built from them.
/// `crisis_since` is set once that chart has come up empty.
#[derive(Component, Debug, Clone)]
pub struct Family {
    pub name: String,
    pub head: Option<Entity>,
    pub vacated_by: Option<Entity>,
    pub crisis_since: Option<SimDate>,
    /// Territories this family controls, in acquisition order.
    pub territories: Vec<Entity>,
    pub members: Vec<Entity>,
    pub founded: SimDate,
}

impl Family {
    pub fn new(name: impl Into<String>, founded: SimDate) -> Self {
        Self {
            name: name.into(),
            head: None,
            vacated_by: None,
            crisis_since: None,
            territories: Vec::new(),
            members: Vec::new(),
            founded,
        }
    }

    pub fn has_member(&self, character: Entity) -> bool {
        self.members.contains(&character)
    }

    pub fn holds(&self, territory: Entity) -> bool {
        self.territories.contains(&territory)
    }
}

/// A settlement or region a family can control.
#[derive(Component, Debug, Clone)]
pub struct Territory {
    pub name: String,
    pub controller: Option<Entity>,
}
