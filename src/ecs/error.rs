use bevy_ecs::entity::Entity;
use thiserror::Error;

use crate::ecs::components::ComponentKind;
use crate::model::{Ineligibility, SchemeStatus};

/// How a caller should react to a `SimError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request was refused; shared state is untouched. Skip or retry.
    Precondition,
    /// Something the request named does not exist. Skip this step.
    Lookup,
    /// An invariant is already broken. The step must halt.
    Structural,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("entity {entity:?} already has a {kind} component")]
    DuplicateComponent { entity: Entity, kind: ComponentKind },

    #[error("entity {entity:?} has no {kind} component")]
    MissingComponent { entity: Entity, kind: ComponentKind },

    #[error("unknown entity {0:?}")]
    UnknownEntity(Entity),

    #[error("{a:?} and {b:?} are not eligible partners: {reason}")]
    IneligiblePartner {
        a: Entity,
        b: Entity,
        reason: Ineligibility,
    },

    #[error("{character:?} cannot rule: {reason}")]
    InvalidRuler {
        character: Entity,
        reason: &'static str,
    },

    #[error("scheme {scheme:?} is already {status}")]
    SchemeAlreadyResolved {
        scheme: Entity,
        status: SchemeStatus,
    },

    #[error("{0}")]
    Precondition(String),

    #[error("structural inconsistency: {0}")]
    Structural(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SimError {
    pub fn class(&self) -> ErrorClass {
        match self {
            SimError::MissingComponent { .. } | SimError::UnknownEntity(_) => ErrorClass::Lookup,
            SimError::Structural(_) => ErrorClass::Structural,
            SimError::DuplicateComponent { .. }
            | SimError::IneligiblePartner { .. }
            | SimError::InvalidRuler { .. }
            | SimError::SchemeAlreadyResolved { .. }
            | SimError::Precondition(_)
            | SimError::InvalidConfig(_) => ErrorClass::Precondition,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Structural
    }
}
