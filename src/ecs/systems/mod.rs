mod courtship;
mod invariants;
mod lifecycle;
mod recorder;
mod relationships;
mod schemes;
mod succession;

use bevy_app::App;

pub use courtship::add_courtship_systems;
pub use invariants::check_invariants;
pub use lifecycle::add_lifecycle_systems;
pub use recorder::flush_events;
pub use relationships::add_relationship_systems;
pub use schemes::{add_scheme_systems, discovery_chance, discovery_risk_rate};
pub use succession::add_succession_systems;

/// Register every domain system on the `SimTick` schedule.
pub fn add_all_systems(app: &mut App) {
    add_lifecycle_systems(app);
    add_relationship_systems(app);
    add_courtship_systems(app);
    add_succession_systems(app);
    add_scheme_systems(app);
}
