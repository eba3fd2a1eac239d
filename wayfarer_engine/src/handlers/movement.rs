//! `go`, `enter`, `exit`.

use wayfarer_data::{Direction, Parent, Value};

use crate::action::{ActionContext, ActionError, ActionHandler, ActionResult};
use crate::parser::Command;
use crate::state::{PropertyKey, StateChange};
use crate::world::PropertyView;

fn resolve_exit<'a>(ctx: &'a ActionContext, direction: Direction) -> Result<&'a wayfarer_data::Exit, ActionError> {
    let loc = ctx
        .state
        .location(&ctx.state.player().location)
        .ok_or_else(|| ActionError::InternalInvariant("player location missing".into()))?;
    loc.exit(direction).ok_or(ActionError::NoSuchExit)
}

pub struct Go;
impl ActionHandler for Go {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        let direction = command.direction.ok_or(ActionError::NoSuchExit)?;
        let exit = resolve_exit(ctx, direction)?;
        if exit.destination.is_none() {
            // spec.md §3: an exit with no destination is "blocked only";
            // narrate its own message if the blueprint supplied one.
            return Err(ActionError::CustomMessage(
                exit.blocked_message.clone().unwrap_or_else(|| ctx.messages.message("no_such_exit")),
            ));
        }
        if let Some(door_id) = &exit.door {
            let door = ctx.state.item(door_id).ok_or(ActionError::NoSuchExit)?;
            if door.flag(&wayfarer_data::PropertyId::new("locked")) {
                return Err(ActionError::DoorLocked);
            }
            if door.flag(&wayfarer_data::PropertyId::new("openable")) && !door.flag(&wayfarer_data::PropertyId::new("open"))
            {
                return Err(ActionError::CustomMessage(ctx.messages.message("exit_door_closed")));
            }
        }
        Ok(())
    }

    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        let direction = command.direction.ok_or(ActionError::NoSuchExit)?;
        let exit = resolve_exit(ctx, direction)?;
        let destination = exit.destination.clone().ok_or(ActionError::NoSuchExit)?;
        let dest_loc = ctx
            .state
            .location(&destination)
            .ok_or_else(|| ActionError::InternalInvariant("exit destination missing".into()))?;
        let changes = vec![StateChange::compare_and_set(
            PropertyKey::PlayerLocation,
            Value::LocationId(ctx.state.player().location.clone()),
            Value::LocationId(destination),
        )];
        Ok(ActionResult::new(ctx.messages.render("went_direction", &[direction_word(direction), &dest_loc.name]))
            .with_changes(changes))
    }
}

fn direction_word(direction: Direction) -> &'static str {
    match direction {
        Direction::North => "north",
        Direction::South => "south",
        Direction::East => "east",
        Direction::West => "west",
        Direction::Northeast => "northeast",
        Direction::Northwest => "northwest",
        Direction::Southeast => "southeast",
        Direction::Southwest => "southwest",
        Direction::Up => "up",
        Direction::Down => "down",
        Direction::In => "in",
        Direction::Out => "out",
    }
}

pub struct Enter;
impl ActionHandler for Enter {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        Go.validate(
            &Command { direction: Some(Direction::In), ..command.clone() },
            ctx,
        )
    }
    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        Go.process(&Command { direction: Some(Direction::In), ..command.clone() }, ctx)
    }
}

pub struct Exit;
impl ActionHandler for Exit {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        Go.validate(
            &Command { direction: Some(Direction::Out), ..command.clone() },
            ctx,
        )
    }
    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        Go.process(&Command { direction: Some(Direction::Out), ..command.clone() }, ctx)
    }
}
