use bevy_ecs::message::Messages;
use bevy_ecs::world::World;

use crate::ecs::error::SimError;

use super::apply_courtship::{break_betrothal, form_betrothal, form_marriage};
use super::apply_family::{set_current_ruler, set_family_head};
use super::apply_lifecycle::{conceive, give_birth, remove_character_from_play};
use super::apply_scheme::{complete_scheme, join_scheme, resolve_scheme};
use super::{SimCommand, SimCommandKind};

/// Perform one command against the world.
pub fn apply_command(world: &mut World, cmd: &SimCommand) -> Result<(), SimError> {
    match &cmd.kind {
        SimCommandKind::FormBetrothal { proposer, other } => {
            form_betrothal(world, *proposer, *other)
        }
        SimCommandKind::BreakBetrothal { character } => {
            break_betrothal(world, *character).map(|_| ())
        }
        SimCommandKind::FormMarriage { a, b } => form_marriage(world, *a, *b),
        SimCommandKind::RemoveCharacter { character, cause } => {
            remove_character_from_play(world, *character, cause).map(|_| ())
        }
        SimCommandKind::Conceive { mother, father } => conceive(world, *mother, *father),
        SimCommandKind::GiveBirth { mother } => give_birth(world, *mother).map(|_| ()),
        SimCommandKind::SetFamilyHead { family, head } => set_family_head(world, *family, *head),
        SimCommandKind::SetRuler { ruler } => set_current_ruler(world, *ruler),
        SimCommandKind::JoinScheme { scheme, character } => {
            join_scheme(world, *scheme, *character)
        }
        SimCommandKind::CompleteScheme { scheme } => complete_scheme(world, *scheme).map(|_| ()),
        SimCommandKind::ResolveScheme { scheme, outcome } => {
            resolve_scheme(world, *scheme, *outcome)
        }
    }
}

/// Exclusive system that drains pending `SimCommand` messages and applies
/// them in emission order.
///
/// Refused commands are logged and skipped; an earlier command in the same
/// batch may have made a later one stale. A structural error halts the step.
pub fn apply_sim_commands(world: &mut World) -> bevy_ecs::error::Result {
    let commands: Vec<SimCommand> = {
        let Some(mut messages) = world.get_resource_mut::<Messages<SimCommand>>() else {
            return Ok(());
        };
        messages.drain().collect()
    };

    for cmd in &commands {
        match apply_command(world, cmd) {
            Ok(()) => {}
            Err(err) if err.is_fatal() => {
                tracing::error!(error = %err, command = %cmd.description, "fatal command error");
                return Err(err.into());
            }
            Err(err) => {
                tracing::warn!(error = %err, command = %cmd.description, "command skipped");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use bevy_ecs::world::World;

    use super::*;
    use crate::ecs::components::BetrothalTracker;
    use crate::ecs::spawn::spawn_character;
    use crate::ecs::time::SimDate;
    use crate::model::{LifeStage, Sex};

    fn world_with_queue() -> World {
        let mut world = World::new();
        world.init_resource::<Messages<SimCommand>>();
        world
    }

    #[test]
    fn refused_commands_are_skipped() {
        let mut world = world_with_queue();
        let born = SimDate::from_year(1);
        let a = spawn_character(&mut world, "A", "X", Sex::Male, born, LifeStage::Adult);
        let b = spawn_character(&mut world, "B", "Y", Sex::Female, born, LifeStage::Adult);
        let c = spawn_character(&mut world, "C", "Z", Sex::Female, born, LifeStage::Adult);
        {
            let mut queue = world.resource_mut::<Messages<SimCommand>>();
            queue.write(SimCommand::new(
                SimCommandKind::FormBetrothal { proposer: a, other: b },
                "a courts b",
            ));
            queue.write(SimCommand::new(
                SimCommandKind::FormBetrothal { proposer: a, other: c },
                "a courts c",
            ));
        }
        apply_sim_commands(&mut world).unwrap();

        let current = world.get::<BetrothalTracker>(a).unwrap().current().unwrap();
        assert_eq!(current.betrothed, b);
        assert!(world.get::<BetrothalTracker>(c).unwrap().current().is_none());
    }

    #[test]
    fn empty_queue_is_a_no_op() {
        let mut world = world_with_queue();
        assert!(apply_sim_commands(&mut world).is_ok());
        let mut bare = World::new();
        assert!(apply_sim_commands(&mut bare).is_ok());
    }
}
