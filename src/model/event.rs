use serde::{Deserialize, Serialize};

/// Stable tag for every kind of event the simulation records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EventKind {
    EntityCreated,
    ComponentReplaced,
    EntityDeactivated,
    LifeStageChanged,
    CharacterRemoved,
    PregnancyStarted,
    CharacterBorn,
    BetrothalFormed,
    BetrothalEnded,
    MarriageFormed,
    MarriageEnded,
    FamilyHeadChanged,
    FamilyHeadVacated,
    FamilyRemoved,
    TerritoryTransferred,
    RulerChanged,
    ThroneVacated,
    DynastyStarted,
    DynastyEnded,
    SuccessionCrisis,
    SchemeCreated,
    SchemeJoined,
    SchemeLeft,
    SchemeActivated,
    SchemeResolved,
}

string_enum!(EventKind {
    EntityCreated => "entity_created",
    ComponentReplaced => "component_replaced",
    EntityDeactivated => "entity_deactivated",
    LifeStageChanged => "life_stage_changed",
    CharacterRemoved => "character_removed",
    PregnancyStarted => "pregnancy_started",
    CharacterBorn => "character_born",
    BetrothalFormed => "betrothal_formed",
    BetrothalEnded => "betrothal_ended",
    MarriageFormed => "marriage_formed",
    MarriageEnded => "marriage_ended",
    FamilyHeadChanged => "family_head_changed",
    FamilyHeadVacated => "family_head_vacated",
    FamilyRemoved => "family_removed",
    TerritoryTransferred => "territory_transferred",
    RulerChanged => "ruler_changed",
    ThroneVacated => "throne_vacated",
    DynastyStarted => "dynasty_started",
    DynastyEnded => "dynasty_ended",
    SuccessionCrisis => "succession_crisis",
    SchemeCreated => "scheme_created",
    SchemeJoined => "scheme_joined",
    SchemeLeft => "scheme_left",
    SchemeActivated => "scheme_activated",
    SchemeResolved => "scheme_resolved",
});
