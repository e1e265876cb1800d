use bevy_ecs::component::{Component, Mutable};
use bevy_ecs::entity::Entity;
use bevy_ecs::world::EntityRef;
use serde::{Deserialize, Serialize};

use crate::ecs::error::SimError;

use super::{
    BetrothalTracker, Character, CharacterMetrics, Disposition, Family, Kinship, MarriageTracker,
    Pregnancy, Scheme, SchemeMembership, Territory,
};

/// Core identity component present on every entity the simulation creates.
#[derive(Component, Debug, Clone)]
pub struct SimEntity {
    pub id: u64,
    pub name: String,
}

/// Marks an entity as live. Archived entities drop the tag but keep every other
/// component so historical lookups stay valid.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Active;

/// Closed set of component kinds the store knows how to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ComponentKind {
    Identity,
    Active,
    Character,
    Kinship,
    Disposition,
    Pregnancy,
    Family,
    Territory,
    BetrothalTracker,
    MarriageTracker,
    SchemeMembership,
    Scheme,
    Metrics,
}

string_enum!(ComponentKind {
    Identity => "identity",
    Active => "active",
    Character => "character",
    Kinship => "kinship",
    Disposition => "disposition",
    Pregnancy => "pregnancy",
    Family => "family",
    Territory => "territory",
    BetrothalTracker => "betrothal_tracker",
    MarriageTracker => "marriage_tracker",
    SchemeMembership => "scheme_membership",
    Scheme => "scheme",
    Metrics => "metrics",
});

impl ComponentKind {
    /// Whether `entity` currently holds a component of this kind.
    pub fn present_on(self, entity: EntityRef<'_>) -> bool {
        match self {
            ComponentKind::Identity => entity.contains::<SimEntity>(),
            ComponentKind::Active => entity.contains::<Active>(),
            ComponentKind::Character => entity.contains::<Character>(),
            ComponentKind::Kinship => entity.contains::<Kinship>(),
            ComponentKind::Disposition => entity.contains::<Disposition>(),
            ComponentKind::Pregnancy => entity.contains::<Pregnancy>(),
            ComponentKind::Family => entity.contains::<Family>(),
            ComponentKind::Territory => entity.contains::<Territory>(),
            ComponentKind::BetrothalTracker => entity.contains::<BetrothalTracker>(),
            ComponentKind::MarriageTracker => entity.contains::<MarriageTracker>(),
            ComponentKind::SchemeMembership => entity.contains::<SchemeMembership>(),
            ComponentKind::Scheme => entity.contains::<Scheme>(),
            ComponentKind::Metrics => entity.contains::<CharacterMetrics>(),
        }
    }
}

/// A component the store can attach, fetch, and replace by kind tag.
pub trait SimComponent: Component<Mutability = Mutable> {
    const KIND: ComponentKind;

    /// Checked before the store overwrites or detaches this value.
    fn ensure_writable(&self, _entity: Entity) -> Result<(), SimError> {
        Ok(())
    }
}

macro_rules! sim_component {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl SimComponent for $ty {
                const KIND: ComponentKind = ComponentKind::$kind;
            }
        )+
    };
}

sim_component!(
    SimEntity => Identity,
    Active => Active,
    Character => Character,
    Kinship => Kinship,
    Disposition => Disposition,
    Pregnancy => Pregnancy,
    Family => Family,
    Territory => Territory,
    BetrothalTracker => BetrothalTracker,
    MarriageTracker => MarriageTracker,
    SchemeMembership => SchemeMembership,
    CharacterMetrics => Metrics,
);

/// Resolved schemes are history; the store will not rewrite or drop them.
impl SimComponent for Scheme {
    const KIND: ComponentKind = ComponentKind::Scheme;

    fn ensure_writable(&self, entity: Entity) -> Result<(), SimError> {
        self.ensure_open(entity)
    }
}
