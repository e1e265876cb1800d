use bevy_ecs::component::Component;
use serde::Serialize;

use crate::ecs::time::SimDate;

/// Per-character lifetime counters. Written only by the metrics recorder
/// during the event flush.
#[derive(Component, Debug, Clone, Default, PartialEq, Serialize)]
pub struct CharacterMetrics {
    pub times_betrothed: u32,
    pub betrothals_broken: u32,
    pub times_married: u32,
    pub times_widowed: u32,
    pub children_born: u32,
    pub times_as_ruler: u32,
    pub times_as_family_head: u32,
    pub inherited_throne: bool,
    pub schemes_started: u32,
    pub schemes_joined: u32,
    pub schemes_succeeded: u32,
    pub schemes_failed: u32,
    pub schemes_discovered: u32,
    pub schemes_abandoned: u32,
    pub last_ruled: Option<SimDate>,
}
