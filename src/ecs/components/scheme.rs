use std::collections::BTreeMap;

use bevy_ecs::component::Component;
use bevy_ecs::entity::Entity;

use crate::ecs::error::SimError;
use crate::ecs::time::SimDate;
use crate::model::{ParticipantRole, SchemeKind, SchemeOutcome, SchemeStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeTarget {
    Character(Entity),
    Family(Entity),
}

impl SchemeTarget {
    pub fn entity(self) -> Entity {
        match self {
            SchemeTarget::Character(e) | SchemeTarget::Family(e) => e,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Participation {
    pub role: ParticipantRole,
    /// Progress contributed per month while the scheme is active.
    pub weight: f64,
    pub joined: SimDate,
}

/// A covert plot. Lives on its own entity.
///
/// Fields are private: every mutation goes through the scheme operations,
/// which refuse to touch a resolved scheme.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Scheme {
    kind: SchemeKind,
    initiator: Entity,
    target: SchemeTarget,
    participants: BTreeMap<Entity, Participation>,
    successor_leader: Option<Entity>,
    progress: f64,
    discovery_risk: f64,
    status: SchemeStatus,
    outcome: Option<SchemeOutcome>,
    created: SimDate,
    resolved: Option<SimDate>,
}

impl Scheme {
    pub(crate) fn new(
        kind: SchemeKind,
        initiator: Entity,
        target: SchemeTarget,
        weight: f64,
        created: SimDate,
    ) -> Self {
        let mut participants = BTreeMap::new();
        participants.insert(
            initiator,
            Participation {
                role: ParticipantRole::Initiator,
                weight,
                joined: created,
            },
        );
        Self {
            kind,
            initiator,
            target,
            participants,
            successor_leader: None,
            progress: 0.0,
            discovery_risk: 0.0,
            status: SchemeStatus::Forming,
            outcome: None,
            created,
            resolved: None,
        }
    }

    pub fn kind(&self) -> SchemeKind {
        self.kind
    }

    pub fn initiator(&self) -> Entity {
        self.initiator
    }

    pub fn target(&self) -> SchemeTarget {
        self.target
    }

    pub fn participants(&self) -> &BTreeMap<Entity, Participation> {
        &self.participants
    }

    pub fn is_participant(&self, character: Entity) -> bool {
        self.participants.contains_key(&character)
    }

    pub fn successor_leader(&self) -> Option<Entity> {
        self.successor_leader
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn discovery_risk(&self) -> f64 {
        self.discovery_risk
    }

    pub fn status(&self) -> SchemeStatus {
        self.status
    }

    pub fn outcome(&self) -> Option<SchemeOutcome> {
        self.outcome
    }

    pub fn created(&self) -> SimDate {
        self.created
    }

    pub fn resolved(&self) -> Option<SimDate> {
        self.resolved
    }

    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Fails with `SchemeAlreadyResolved` once the scheme is terminal.
    pub fn ensure_open(&self, scheme: Entity) -> Result<(), SimError> {
        if self.status.is_terminal() {
            return Err(SimError::SchemeAlreadyResolved {
                scheme,
                status: self.status,
            });
        }
        Ok(())
    }

    pub fn total_weight(&self) -> f64 {
        self.participants.values().map(|p| p.weight).sum()
    }

    pub(crate) fn add_participant(&mut self, character: Entity, weight: f64, joined: SimDate) {
        self.participants.insert(
            character,
            Participation {
                role: ParticipantRole::Member,
                weight,
                joined,
            },
        );
    }

    pub(crate) fn remove_participant(&mut self, character: Entity) -> Option<Participation> {
        if self.successor_leader == Some(character) {
            self.successor_leader = None;
        }
        self.participants.remove(&character)
    }

    /// Hand leadership to `successor`, who must already be a participant.
    pub(crate) fn promote(&mut self, successor: Entity) -> bool {
        let Some(entry) = self.participants.get_mut(&successor) else {
            return false;
        };
        entry.role = ParticipantRole::Initiator;
        self.initiator = successor;
        if self.successor_leader == Some(successor) {
            self.successor_leader = None;
        }
        true
    }

    pub(crate) fn set_successor_leader(&mut self, successor: Option<Entity>) {
        self.successor_leader = successor;
    }

    pub(crate) fn activate(&mut self) {
        if self.status == SchemeStatus::Forming {
            self.status = SchemeStatus::Active;
        }
    }

    pub(crate) fn accrue(&mut self, progress: f64, risk: f64) {
        self.progress += progress;
        self.discovery_risk += risk;
    }

    pub(crate) fn resolve(&mut self, outcome: SchemeOutcome, date: SimDate) {
        self.status = outcome.status();
        self.outcome = Some(outcome);
        self.resolved = Some(date);
    }
}

/// Schemes a character takes part in, in join order.
#[derive(Component, Debug, Clone, Default)]
pub struct SchemeMembership {
    pub schemes: Vec<Entity>,
}

#[cfg(test)]
mod tests {
    use bevy_ecs::world::World;

    use super::*;

    #[test]
    fn new_scheme_has_initiator_as_sole_participant() {
        let mut world = World::new();
        let initiator = world.spawn_empty().id();
        let target = world.spawn_empty().id();
        let scheme = Scheme::new(
            SchemeKind::Assassination,
            initiator,
            SchemeTarget::Character(target),
            1.0,
            SimDate::from_year(3),
        );
        assert_eq!(scheme.status(), SchemeStatus::Forming);
        assert_eq!(scheme.participants().len(), 1);
        assert_eq!(
            scheme.participants()[&initiator].role,
            ParticipantRole::Initiator
        );
    }

    #[test]
    fn promote_requires_existing_participant() {
        let mut world = World::new();
        let initiator = world.spawn_empty().id();
        let member = world.spawn_empty().id();
        let outsider = world.spawn_empty().id();
        let mut scheme = Scheme::new(
            SchemeKind::Coup,
            initiator,
            SchemeTarget::Character(outsider),
            1.0,
            SimDate::from_year(3),
        );
        assert!(!scheme.promote(outsider));
        scheme.add_participant(member, 0.5, SimDate::from_year(3));
        assert!(scheme.promote(member));
        assert_eq!(scheme.initiator(), member);
    }

    #[test]
    fn resolved_scheme_rejects_further_work() {
        let mut world = World::new();
        let initiator = world.spawn_empty().id();
        let target = world.spawn_empty().id();
        let id = world.spawn_empty().id();
        let mut scheme = Scheme::new(
            SchemeKind::SeizeTerritory,
            initiator,
            SchemeTarget::Family(target),
            1.0,
            SimDate::from_year(3),
        );
        scheme.resolve(SchemeOutcome::TargetRemoved, SimDate::from_year(4));
        assert_eq!(scheme.status(), SchemeStatus::Abandoned);
        assert!(matches!(
            scheme.ensure_open(id),
            Err(SimError::SchemeAlreadyResolved { status: SchemeStatus::Abandoned, .. })
        ));
    }
}
