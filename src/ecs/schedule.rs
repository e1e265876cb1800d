use bevy_ecs::schedule::{ExecutorKind, IntoScheduleConfigs, Schedule, ScheduleLabel, SystemSet};

use super::clock::advance_clock;

/// Schedule label for one simulation step.
/// Run manually each step via `app.world_mut().run_schedule(SimTick)`.
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimTick;

/// Ordered phases within each simulation step.
///
/// Phases run in declaration order: PreUpdate < Update < Last.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimPhase {
    PreUpdate,
    Update,
    Last,
}

/// Per-domain system sets within `SimPhase::Update`.
///
/// ```text
/// Lifecycle → Relationships → Courtship → Succession → Schemes
/// ```
///
/// Each domain applies its own commands before the next one starts, so no
/// domain sees state that a later domain is halfway through changing.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum DomainSet {
    Lifecycle,
    Relationships,
    Courtship,
    Succession,
    Schemes,
}

fn configure_domain_ordering(schedule: &mut Schedule) {
    schedule.configure_sets(
        (
            DomainSet::Lifecycle,
            DomainSet::Relationships,
            DomainSet::Courtship,
            DomainSet::Succession,
            DomainSet::Schemes,
        )
            .chain()
            .in_set(SimPhase::Update),
    );
}

/// Build a configured `SimTick` schedule with phase ordering.
pub fn configure_sim_schedule(executor: ExecutorKind) -> Schedule {
    let mut schedule = Schedule::new(SimTick);
    schedule.set_executor_kind(executor);
    schedule.configure_sets((SimPhase::PreUpdate, SimPhase::Update, SimPhase::Last).chain());
    configure_domain_ordering(&mut schedule);
    schedule.add_systems(advance_clock.in_set(SimPhase::Last));
    schedule
}
