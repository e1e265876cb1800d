use bevy_app::App;

use crate::ecs::clock::SimClock;
use crate::ecs::schedule::SimTick;

/// Run `n` simulation steps.
pub fn tick(app: &mut App, n: u32) {
    for _ in 0..n {
        app.world_mut().run_schedule(SimTick);
    }
}

/// Return the current simulation year from the clock resource.
pub fn current_year(app: &App) -> u32 {
    app.world().resource::<SimClock>().date.year()
}
