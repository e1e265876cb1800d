use bevy_ecs::entity::Entity;
use bevy_ecs::query::With;
use bevy_ecs::world::World;

use crate::ecs::commands::{check_family_heads, check_schemes};
use crate::ecs::components::{Active, BetrothalTracker, Character};
use crate::ecs::error::SimError;
use crate::ecs::resources::Realm;

fn check_throne(world: &mut World) -> Result<(), SimError> {
    let ruler = world.get_resource::<Realm>().and_then(|r| r.ruler());
    let flagged: Vec<Entity> = {
        let mut q = world.query_filtered::<(Entity, &Character), With<Active>>();
        q.iter(world)
            .filter(|(_, c)| c.is_ruler())
            .map(|(e, _)| e)
            .collect()
    };
    let consistent = match ruler {
        Some(r) => flagged == [r],
        None => flagged.is_empty(),
    };
    if !consistent {
        return Err(SimError::Structural(format!(
            "realm ruler {ruler:?} disagrees with ruler flags on {flagged:?}"
        )));
    }
    Ok(())
}

fn check_betrothals(world: &mut World) -> Result<(), SimError> {
    let pairs: Vec<(Entity, Entity)> = {
        let mut q = world.query_filtered::<(Entity, &BetrothalTracker), With<Active>>();
        q.iter(world)
            .filter_map(|(e, t)| t.current().map(|b| (e, b.betrothed)))
            .collect()
    };
    for (a, b) in pairs {
        let back = world
            .get::<BetrothalTracker>(b)
            .and_then(|t| t.current())
            .map(|r| r.betrothed);
        if back != Some(a) {
            return Err(SimError::Structural(format!(
                "{a:?} is betrothed to {b:?}, but not the other way round"
            )));
        }
    }
    Ok(())
}

/// Structural checks run at the end of every step. Any failure halts the run.
pub fn check_invariants(world: &mut World) -> bevy_ecs::error::Result {
    let result = check_family_heads(world)
        .and_then(|_| check_throne(world))
        .and_then(|_| check_betrothals(world))
        .and_then(|_| check_schemes(world));
    if let Err(err) = result {
        tracing::error!(error = %err, "invariant violated");
        return Err(err.into());
    }
    Ok(())
}
