use bevy_app::App;
use bevy_ecs::entity::Entity;
use bevy_ecs::query::With;
use bevy_ecs::schedule::IntoScheduleConfigs;
use bevy_ecs::world::World;

use crate::ecs::components::{Active, Family};
use crate::ecs::error::SimError;
use crate::ecs::schedule::{DomainSet, SimTick};
use crate::ecs::succession::{apply_family_succession, apply_throne_succession, refresh_heir_flags};

pub fn add_succession_systems(app: &mut App) {
    app.add_systems(SimTick, run_succession.in_set(DomainSet::Succession));
}

fn skip_or_halt(err: SimError, what: &str) -> Result<(), SimError> {
    if err.is_fatal() {
        tracing::error!(error = %err, what, "succession halted");
        return Err(err);
    }
    tracing::warn!(error = %err, what, "succession step skipped");
    Ok(())
}

/// Fill vacant family heads, then a vacant throne, then refresh heir flags.
fn run_succession(world: &mut World) -> bevy_ecs::error::Result {
    let mut vacant: Vec<Entity> = {
        let mut q = world.query_filtered::<(Entity, &Family), With<Active>>();
        q.iter(world)
            .filter(|(_, f)| f.head.is_none() && f.vacated_by.is_some())
            .map(|(e, _)| e)
            .collect()
    };
    vacant.sort();

    for family in vacant {
        if let Err(err) = apply_family_succession(world, family) {
            skip_or_halt(err, "family")?;
        }
    }
    if let Err(err) = apply_throne_succession(world) {
        skip_or_halt(err, "throne")?;
    }
    if let Err(err) = refresh_heir_flags(world) {
        skip_or_halt(err, "heirs")?;
    }
    Ok(())
}
