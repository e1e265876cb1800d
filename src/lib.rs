#[macro_use]
pub mod model;
pub mod ecs;
pub mod flush;

pub use ecs::{SimConfig, SimDate, SimError, build_sim_app};
pub use model::{EventKind, LifeStage, SchemeKind, SchemeOutcome, SchemeStatus, Sex};
