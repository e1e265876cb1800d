#[macro_use]
mod macros;

pub mod character;
pub mod courtship;
pub mod event;
pub mod names;
pub mod relationship;
pub mod scheme;

pub use character::{KinGroup, LifeStage, RoleFlags, Sex};
pub use courtship::{BetrothalEnd, Ineligibility, MarriageEnd};
pub use event::EventKind;
pub use names::NamePool;
pub use relationship::RelationshipTag;
pub use scheme::{ParticipantRole, SchemeKind, SchemeOutcome, SchemeStatus};
