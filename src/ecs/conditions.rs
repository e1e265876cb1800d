use bevy_ecs::system::Res;

use super::clock::SimClock;
use super::time::{MONTHS_PER_YEAR, SimDate};

// Internal check functions for testability.

/// True when the step starting at `date` and spanning `step_months` contains a January.
fn yearly_check(date: SimDate, step_months: u32) -> bool {
    let into_year = date.as_months() % MONTHS_PER_YEAR;
    into_year == 0 || into_year + step_months.max(1) > MONTHS_PER_YEAR
}

// Bevy run condition functions (for use with `.run_if()`).

pub fn yearly(clock: Res<SimClock>) -> bool {
    yearly_check(clock.date, clock.step_months)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yearly_fires_once_per_year_with_monthly_steps() {
        let fired: Vec<u32> = (0..36)
            .map(SimDate::from_months)
            .filter(|d| yearly_check(*d, 1))
            .map(|d| d.as_months())
            .collect();
        assert_eq!(fired, vec![0, 12, 24]);
    }

    #[test]
    fn yearly_fires_on_steps_spanning_january() {
        let fired = (0..24)
            .step_by(5)
            .map(SimDate::from_months)
            .filter(|d| yearly_check(*d, 5))
            .count();
        // steps start at 0, 5, 10, 15, 20: Jan of year 0, the step covering
        // month 10-14 crosses into year 1, and 20-24 crosses into year 2.
        assert_eq!(fired, 3);
    }

    #[test]
    fn yearly_not_mid_year() {
        assert!(!yearly_check(SimDate::from_year_month(5, 6), 1));
    }
}
