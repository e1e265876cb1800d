use bevy_ecs::entity::Entity;
use bevy_ecs::message::{Message, Messages};
use bevy_ecs::resource::Resource;
use bevy_ecs::world::World;

use crate::ecs::components::ComponentKind;
use crate::model::{
    BetrothalEnd, EventKind, LifeStage, MarriageEnd, SchemeKind, SchemeOutcome, SchemeStatus,
};

/// Notifications published by simulation operations.
///
/// Queued as a Bevy message and drained once per step by `flush_events`, which
/// updates metrics, appends to the `EventLog`, and hands each event to the
/// `EventBus` listeners in registration order.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum SimEvent {
    EntityCreated {
        entity: Entity,
    },
    ComponentReplaced {
        entity: Entity,
        kind: ComponentKind,
    },
    EntityDeactivated {
        entity: Entity,
    },
    LifeStageChanged {
        character: Entity,
        from: LifeStage,
        to: LifeStage,
    },
    CharacterRemovedFromPlay {
        character: Entity,
        cause: String,
    },
    PregnancyStarted {
        mother: Entity,
        father: Entity,
    },
    /// `family` is the house the child was entered into, if any.
    CharacterBorn {
        child: Entity,
        mother: Entity,
        father: Entity,
        family: Option<Entity>,
    },

    // -- Courtship --
    BetrothalFormed {
        proposer: Entity,
        betrothed: Entity,
    },
    BetrothalEnded {
        character: Entity,
        partner: Entity,
        reason: BetrothalEnd,
    },
    MarriageFormed {
        a: Entity,
        b: Entity,
    },
    /// `character` is the party who remains (the survivor when widowed).
    MarriageEnded {
        character: Entity,
        spouse: Entity,
        end: MarriageEnd,
    },

    // -- Families and the throne --
    FamilyHeadChanged {
        family: Entity,
        previous: Option<Entity>,
        head: Entity,
    },
    FamilyHeadVacated {
        family: Entity,
        former_head: Entity,
    },
    FamilyRemovedFromPlay {
        family: Entity,
    },
    TerritoryTransferred {
        territory: Entity,
        from: Option<Entity>,
        to: Option<Entity>,
    },
    RulerChanged {
        previous: Option<Entity>,
        ruler: Option<Entity>,
        inherited: bool,
    },
    ThroneVacated {
        former_ruler: Entity,
    },
    DynastyStarted {
        family: Entity,
        founder: Entity,
    },
    DynastyEnded {
        family: Entity,
    },
    /// No eligible successor. `family` is `None` when the vacant role is the throne.
    SuccessionCrisis {
        family: Option<Entity>,
        vacated_by: Entity,
    },

    // -- Schemes --
    SchemeCreated {
        scheme: Entity,
        kind: SchemeKind,
        initiator: Entity,
    },
    SchemeJoined {
        scheme: Entity,
        character: Entity,
    },
    SchemeLeft {
        scheme: Entity,
        character: Entity,
    },
    SchemeActivated {
        scheme: Entity,
    },
    SchemeResolved {
        scheme: Entity,
        kind: SchemeKind,
        status: SchemeStatus,
        outcome: SchemeOutcome,
        participants: Vec<Entity>,
    },
}

impl SimEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SimEvent::EntityCreated { .. } => EventKind::EntityCreated,
            SimEvent::ComponentReplaced { .. } => EventKind::ComponentReplaced,
            SimEvent::EntityDeactivated { .. } => EventKind::EntityDeactivated,
            SimEvent::LifeStageChanged { .. } => EventKind::LifeStageChanged,
            SimEvent::CharacterRemovedFromPlay { .. } => EventKind::CharacterRemoved,
            SimEvent::PregnancyStarted { .. } => EventKind::PregnancyStarted,
            SimEvent::CharacterBorn { .. } => EventKind::CharacterBorn,
            SimEvent::BetrothalFormed { .. } => EventKind::BetrothalFormed,
            SimEvent::BetrothalEnded { .. } => EventKind::BetrothalEnded,
            SimEvent::MarriageFormed { .. } => EventKind::MarriageFormed,
            SimEvent::MarriageEnded { .. } => EventKind::MarriageEnded,
            SimEvent::FamilyHeadChanged { .. } => EventKind::FamilyHeadChanged,
            SimEvent::FamilyHeadVacated { .. } => EventKind::FamilyHeadVacated,
            SimEvent::FamilyRemovedFromPlay { .. } => EventKind::FamilyRemoved,
            SimEvent::TerritoryTransferred { .. } => EventKind::TerritoryTransferred,
            SimEvent::RulerChanged { .. } => EventKind::RulerChanged,
            SimEvent::ThroneVacated { .. } => EventKind::ThroneVacated,
            SimEvent::DynastyStarted { .. } => EventKind::DynastyStarted,
            SimEvent::DynastyEnded { .. } => EventKind::DynastyEnded,
            SimEvent::SuccessionCrisis { .. } => EventKind::SuccessionCrisis,
            SimEvent::SchemeCreated { .. } => EventKind::SchemeCreated,
            SimEvent::SchemeJoined { .. } => EventKind::SchemeJoined,
            SimEvent::SchemeLeft { .. } => EventKind::SchemeLeft,
            SimEvent::SchemeActivated { .. } => EventKind::SchemeActivated,
            SimEvent::SchemeResolved { .. } => EventKind::SchemeResolved,
        }
    }
}

/// Queue an event for this step's flush. Dropped silently when the world was
/// built without the event queue (bare `World` fixtures).
pub fn publish(world: &mut World, event: SimEvent) {
    if let Some(mut messages) = world.get_resource_mut::<Messages<SimEvent>>() {
        messages.write(event);
    }
}

pub type Listener = Box<dyn FnMut(&SimEvent) + Send + Sync>;

/// Read-only subscribers for presentation and persistence collaborators.
///
/// Listeners get a shared reference to each event and no world access, so they
/// cannot mutate simulation state.
#[derive(Resource, Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    /// Register a listener. Returns its position in delivery order.
    pub fn subscribe(&mut self, listener: impl FnMut(&SimEvent) + Send + Sync + 'static) -> usize {
        self.listeners.push(Box::new(listener));
        self.listeners.len() - 1
    }

    pub fn deliver(&mut self, event: &SimEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn listeners_run_in_registration_order() {
        let mut world = World::new();
        let e = world.spawn_empty().id();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::default();
        for tag in ["first", "second", "third"] {
            let seen = seen.clone();
            bus.subscribe(move |_event| seen.lock().unwrap().push(tag));
        }
        bus.deliver(&SimEvent::EntityCreated { entity: e });
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn publish_without_queue_is_a_noop() {
        let mut world = World::new();
        let e = world.spawn_empty().id();
        publish(&mut world, SimEvent::EntityDeactivated { entity: e });
        assert!(world.get_resource::<Messages<SimEvent>>().is_none());
    }

    #[test]
    fn kind_tags_match() {
        let mut world = World::new();
        let f = world.spawn_empty().id();
        assert_eq!(
            SimEvent::FamilyRemovedFromPlay { family: f }.kind(),
            EventKind::FamilyRemoved
        );
    }
}
