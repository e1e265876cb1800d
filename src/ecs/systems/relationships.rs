use bevy_app::App;
use bevy_ecs::schedule::IntoScheduleConfigs;
use bevy_ecs::system::{Res, ResMut};

use crate::ecs::relationships::RelationshipGraph;
use crate::ecs::resources::SimConfig;
use crate::ecs::schedule::{DomainSet, SimTick};

pub fn add_relationship_systems(app: &mut App) {
    app.add_systems(SimTick, decay_opinions.in_set(DomainSet::Relationships));
}

/// Opinions drift back toward neutral every step.
fn decay_opinions(config: Res<SimConfig>, mut graph: ResMut<RelationshipGraph>) {
    graph.decay(config.opinion_decay_per_step);
}
