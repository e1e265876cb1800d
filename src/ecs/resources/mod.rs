pub mod config;
pub mod entity_map;
pub mod event_log;
pub mod realm;
pub mod sim_resources;

pub use config::{OpinionRange, SimConfig, sim_config};
pub use entity_map::EntityRegistry;
pub use event_log::{EventLog, EventRecord};
pub use realm::{Dynasty, Realm};
pub use sim_resources::{CourtshipRng, LifecycleRng, Names, SchemeRng, SimRng, distribute_rng};
