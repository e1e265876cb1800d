use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const MONTHS_PER_YEAR: u32 = 12;

/// Simulation date at month resolution: total elapsed months since year 0, January.
///
/// Natural `u32` ordering equals chronological ordering. Displays and parses
/// as ISO `YYYY-MM`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SimDate(u32);

impl SimDate {
    pub fn from_months(months: u32) -> Self {
        Self(months)
    }

    /// January of the given year.
    pub fn from_year(year: u32) -> Self {
        Self(year * MONTHS_PER_YEAR)
    }

    /// A month (1-indexed) within a year.
    pub fn from_year_month(year: u32, month: u32) -> Self {
        debug_assert!(
            (1..=MONTHS_PER_YEAR).contains(&month),
            "month out of range: {month}"
        );
        Self(year * MONTHS_PER_YEAR + (month - 1))
    }

    pub fn as_months(self) -> u32 {
        self.0
    }

    pub fn year(self) -> u32 {
        self.0 / MONTHS_PER_YEAR
    }

    /// Month of year (1–12).
    pub fn month(self) -> u32 {
        self.0 % MONTHS_PER_YEAR + 1
    }

    pub fn add_months(self, months: u32) -> Self {
        Self(self.0.saturating_add(months))
    }

    /// Whole months elapsed since `earlier`. Saturates to 0 if `earlier` is in the future.
    pub fn months_since(self, earlier: SimDate) -> u32 {
        self.0.saturating_sub(earlier.0)
    }

    /// Whole years elapsed since `earlier`.
    pub fn years_since(self, earlier: SimDate) -> u32 {
        self.months_since(earlier) / MONTHS_PER_YEAR
    }
}

impl fmt::Display for SimDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for SimDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got {s:?}"))?;
        let year: u32 = year
            .parse()
            .map_err(|_| format!("invalid year in {s:?}"))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month in {s:?}"))?;
        if !(1..=MONTHS_PER_YEAR).contains(&month) {
            return Err(format!("month out of range in {s:?}"));
        }
        Ok(Self::from_year_month(year, month))
    }
}

impl From<SimDate> for String {
    fn from(date: SimDate) -> Self {
        date.to_string()
    }
}

impl TryFrom<String> for SimDate {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
