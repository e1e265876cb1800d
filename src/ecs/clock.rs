use bevy_ecs::resource::Resource;
use bevy_ecs::system::ResMut;
use bevy_ecs::world::World;

use super::time::SimDate;

/// Simulation clock resource tracking the current date and step count.
///
/// The `advance_clock` system moves the clock forward at the end of each step
/// (in `SimPhase::Last`), so systems see the current date before it advances.
#[derive(Resource, Debug, Clone)]
pub struct SimClock {
    pub date: SimDate,
    pub tick_count: u64,
    pub step_months: u32,
}

impl SimClock {
    pub fn new(start_year: u32, step_months: u32) -> Self {
        Self {
            date: SimDate::from_year(start_year),
            tick_count: 0,
            step_months: step_months.max(1),
        }
    }

    /// Advance the clock by one step.
    pub fn advance(&mut self) {
        self.date = self.date.add_months(self.step_months);
        self.tick_count += 1;
    }
}

/// The world's current date, or year 0 when no clock is installed.
pub fn current_date(world: &World) -> SimDate {
    world
        .get_resource::<SimClock>()
        .map(|clock| clock.date)
        .unwrap_or_default()
}

pub fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.advance();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clock_starts_in_january() {
        let clock = SimClock::new(100, 1);
        assert_eq!(clock.date.year(), 100);
        assert_eq!(clock.date.month(), 1);
        assert_eq!(clock.tick_count, 0);
    }

    #[test]
    fn advance_moves_by_step_duration() {
        let mut clock = SimClock::new(100, 3);
        clock.advance();
        assert_eq!(clock.date.month(), 4);
        for _ in 0..3 {
            clock.advance();
        }
        assert_eq!(clock.date.year(), 101);
        assert_eq!(clock.date.month(), 1);
        assert_eq!(clock.tick_count, 4);
    }

    #[test]
    fn zero_step_is_clamped_to_one_month() {
        let mut clock = SimClock::new(1, 0);
        clock.advance();
        assert_eq!(clock.date.month(), 2);
    }
}
