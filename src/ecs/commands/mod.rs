pub mod applicator;
mod apply_courtship;
mod apply_family;
mod apply_lifecycle;
mod apply_scheme;
pub mod scheme_effects;

use bevy_ecs::entity::Entity;
use bevy_ecs::message::Message;

use crate::model::SchemeOutcome;

pub use applicator::{apply_command, apply_sim_commands};
pub use apply_courtship::{
    annul_marriage, break_betrothal, form_betrothal, form_marriage, kinship_distance,
};
pub use apply_family::{
    check_family_heads, join_family, leave_family, set_current_ruler, set_family_head,
    transfer_territory,
};
pub use apply_lifecycle::{
    conceive, give_birth, remove_character_from_play, remove_family_from_play,
};
pub use apply_scheme::{
    abandon_scheme, check_schemes, complete_scheme, create_scheme, designate_successor_leader,
    join_scheme, leave_scheme, participant_weight, resolve_scheme, terminate_schemes_targeting,
    withdraw_from_all_schemes,
};
pub use scheme_effects::{EffectOutcome, SchemeEffect, SchemeEffects};

/// A requested state change.
///
/// Systems that only read the world emit these via `MessageWriter<SimCommand>`;
/// the applicator that runs right after them performs the change with full
/// world access.
#[derive(Message, Clone, Debug)]
pub struct SimCommand {
    pub kind: SimCommandKind,
    /// Human-readable reason, used in logs.
    pub description: String,
}

impl SimCommand {
    pub fn new(kind: SimCommandKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SimCommandKind {
    // -- Courtship --
    FormBetrothal { proposer: Entity, other: Entity },
    BreakBetrothal { character: Entity },
    FormMarriage { a: Entity, b: Entity },

    // -- Lifecycle --
    RemoveCharacter { character: Entity, cause: String },
    Conceive { mother: Entity, father: Entity },
    GiveBirth { mother: Entity },

    // -- Families and the throne --
    SetFamilyHead { family: Entity, head: Option<Entity> },
    SetRuler { ruler: Option<Entity> },

    // -- Schemes --
    JoinScheme { scheme: Entity, character: Entity },
    CompleteScheme { scheme: Entity },
    ResolveScheme { scheme: Entity, outcome: SchemeOutcome },
}
