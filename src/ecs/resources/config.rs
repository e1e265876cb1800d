use bevy_ecs::resource::Resource;
use bevy_ecs::world::World;
use serde::{Deserialize, Serialize};

use crate::ecs::error::SimError;
use crate::model::KinGroup;

/// Inclusive bounds for relationship opinion values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpinionRange {
    pub min: i32,
    pub max: i32,
}

impl Default for OpinionRange {
    fn default() -> Self {
        Self { min: -100, max: 100 }
    }
}

impl OpinionRange {
    pub fn clamp(self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }
}

/// Simulation configuration. Every field has a default, so partial JSON
/// documents are accepted.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    pub start_year: u32,
    /// Months the clock advances per step.
    pub step_months: u32,
    pub opinion_range: OpinionRange,
    /// Opinion points every active edge drifts toward zero per step.
    pub opinion_decay_per_step: i32,
    /// Pairs related at this distance or closer may not be betrothed or married.
    pub kinship_distance_limit: u32,
    /// Order kin groups are ranked in when building a depth chart.
    pub succession_order: [KinGroup; 4],
    pub scheme_min_participants: usize,
    pub scheme_progress_threshold: f64,
    pub scheme_discovery_threshold: f64,
    /// Forming schemes that miss the participant minimum for this long fail.
    pub scheme_recruit_window_months: u32,
    pub betrothal_opinion_threshold: i32,
    pub betrothal_months_before_marriage: u32,
    /// Yearly chance that a fertile married woman conceives.
    pub conception_chance_per_year: f64,
    pub max_maternal_age: u32,
    pub pregnancy_months: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            start_year: 1,
            step_months: 1,
            opinion_range: OpinionRange::default(),
            opinion_decay_per_step: 1,
            kinship_distance_limit: 3,
            succession_order: [
                KinGroup::Children,
                KinGroup::Spouse,
                KinGroup::Siblings,
                KinGroup::Collateral,
            ],
            scheme_min_participants: 2,
            scheme_progress_threshold: 100.0,
            scheme_discovery_threshold: 50.0,
            scheme_recruit_window_months: 24,
            betrothal_opinion_threshold: 40,
            betrothal_months_before_marriage: 12,
            conception_chance_per_year: 0.3,
            max_maternal_age: 45,
            pregnancy_months: 9,
        }
    }
}

impl SimConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let config: SimConfig =
            serde_json::from_str(json).map_err(|e| SimError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.opinion_range.min > self.opinion_range.max {
            return Err(SimError::InvalidConfig(format!(
                "opinion range min {} exceeds max {}",
                self.opinion_range.min, self.opinion_range.max
            )));
        }
        if self.step_months == 0 {
            return Err(SimError::InvalidConfig("step_months must be at least 1".into()));
        }
        if self.opinion_decay_per_step < 0 {
            return Err(SimError::InvalidConfig(
                "opinion_decay_per_step must not be negative".into(),
            ));
        }
        for group in KinGroup::ALL {
            if !self.succession_order.contains(group) {
                return Err(SimError::InvalidConfig(format!(
                    "succession_order is missing {group}"
                )));
            }
        }
        if self.scheme_min_participants == 0 {
            return Err(SimError::InvalidConfig(
                "scheme_min_participants must be at least 1".into(),
            ));
        }
        if self.scheme_progress_threshold <= 0.0 || self.scheme_discovery_threshold <= 0.0 {
            return Err(SimError::InvalidConfig("scheme thresholds must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.conception_chance_per_year) {
            return Err(SimError::InvalidConfig(format!(
                "conception_chance_per_year {} is not a probability",
                self.conception_chance_per_year
            )));
        }
        if self.pregnancy_months == 0 {
            return Err(SimError::InvalidConfig(
                "pregnancy_months must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// The installed configuration, or the defaults for bare worlds.
pub fn sim_config(world: &World) -> SimConfig {
    world.get_resource::<SimConfig>().cloned().unwrap_or_default()
}
