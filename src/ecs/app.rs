use bevy_app::App;
use bevy_ecs::message::MessageRegistry;
use bevy_ecs::schedule::{ExecutorKind, IntoScheduleConfigs};

use super::clock::{SimClock, advance_clock};
use super::commands::{SchemeEffects, SimCommand};
use super::error::SimError;
use super::events::{EventBus, SimEvent};
use super::relationships::RelationshipGraph;
use super::resources::{
    CourtshipRng, EntityRegistry, EventLog, LifecycleRng, Names, Realm, SchemeRng, SimConfig,
    SimRng, distribute_rng,
};
use super::schedule::{SimPhase, configure_sim_schedule};
use super::systems::{add_all_systems, check_invariants, flush_events};

/// Build a headless Bevy app with the clock, core resources, message types,
/// and every domain system.
///
/// Manual step control:
/// ```no_run
/// # use dynasty_sim::ecs::{build_sim_app, SimConfig, SimTick};
/// let mut app = build_sim_app(SimConfig::default()).unwrap();
/// for _ in 0..12 {
///     app.world_mut().run_schedule(SimTick);
/// }
/// ```
pub fn build_sim_app(config: SimConfig) -> Result<App, SimError> {
    build_sim_app_with_executor(config, ExecutorKind::MultiThreaded)
}

/// Build with a single-threaded executor so system order, and with it RNG
/// consumption, is identical across runs.
pub fn build_sim_app_deterministic(config: SimConfig) -> Result<App, SimError> {
    build_sim_app_with_executor(config, ExecutorKind::SingleThreaded)
}

/// Build a headless Bevy app with a specific executor kind.
pub fn build_sim_app_with_executor(
    config: SimConfig,
    executor: ExecutorKind,
) -> Result<App, SimError> {
    config.validate()?;
    let mut app = App::empty();

    // Core resources
    app.insert_resource(SimClock::new(config.start_year, config.step_months));
    app.insert_resource(EventLog::new());
    app.insert_resource(EntityRegistry::new());
    app.insert_resource(RelationshipGraph::new(config.opinion_range));
    app.insert_resource(SimRng::new(config.seed));
    app.init_resource::<Realm>();
    app.init_resource::<EventBus>();
    app.init_resource::<SchemeEffects>();
    app.init_resource::<Names>();

    // Per-domain RNG resources (reseeded each step by distribute_rng)
    app.init_resource::<LifecycleRng>();
    app.init_resource::<CourtshipRng>();
    app.init_resource::<SchemeRng>();

    // Register message types
    MessageRegistry::register_message::<SimCommand>(app.world_mut());
    MessageRegistry::register_message::<SimEvent>(app.world_mut());

    tracing::info!(
        seed = config.seed,
        start_year = config.start_year,
        step_months = config.step_months,
        "simulation app built"
    );
    app.insert_resource(config);

    let mut schedule = configure_sim_schedule(executor);
    schedule.add_systems(
        (bevy_ecs::message::message_update_system, distribute_rng)
            .chain()
            .in_set(SimPhase::PreUpdate),
    );
    schedule.add_systems(
        (check_invariants, flush_events)
            .chain()
            .in_set(SimPhase::Last)
            .before(advance_clock),
    );
    app.add_schedule(schedule);
    add_all_systems(&mut app);
    Ok(app)
}
