pub mod app;
pub mod clock;
pub mod commands;
pub mod components;
pub mod conditions;
pub mod error;
pub mod events;
pub mod relationships;
pub mod resources;
pub mod schedule;
pub mod spawn;
pub mod store;
pub mod succession;
pub mod systems;
pub mod test_helpers;
pub mod time;

pub use app::{build_sim_app, build_sim_app_deterministic, build_sim_app_with_executor};
pub use clock::SimClock;
pub use commands::{SimCommand, SimCommandKind};
pub use components::{
    Active, Character, CharacterMetrics, ComponentKind, Disposition, Family, Kinship, Scheme,
    SchemeTarget, SimEntity, Territory,
};
pub use conditions::yearly;
pub use error::{ErrorClass, SimError};
pub use events::{EventBus, SimEvent};
pub use relationships::RelationshipGraph;
pub use resources::{EventLog, Realm, SimConfig};
pub use schedule::{DomainSet, SimPhase, SimTick, configure_sim_schedule};
pub use succession::{DepthChart, DepthChartEntry, depth_chart, resolve_successor};
pub use time::SimDate;
