//! `turn-on`, `turn-off`, `read`.

use wayfarer_data::{PropertyId, Value};

use crate::action::{ActionContext, ActionError, ActionHandler, ActionResult};
use crate::parser::Command;
use crate::scope;
use crate::state::{PropertyKey, StateChange};
use crate::world::PropertyView;

fn prop(name: &str) -> PropertyId {
    PropertyId::new(name)
}

fn single_target(command: &Command) -> Result<wayfarer_data::ItemId, ActionError> {
    command.direct_objects.first().cloned().ok_or(ActionError::NotReachable)
}

fn ensure_reachable(ctx: &ActionContext, id: &wayfarer_data::ItemId) -> Result<(), ActionError> {
    if !scope::reachable_by_player(ctx.state).contains(id) {
        return Err(ActionError::NotReachable);
    }
    Ok(())
}

pub struct TurnOn;
impl ActionHandler for TurnOn {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        let id = single_target(command)?;
        ensure_reachable(ctx, &id)?;
        let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
        if item.flag(&prop("on")) {
            return Err(ActionError::CustomMessage(ctx.messages.message("turn_on_already")));
        }
        Ok(())
    }

    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        let id = single_target(command)?;
        let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
        let name = item.short_description.clone();
        let changes = vec![StateChange::set(PropertyKey::ItemProperty(id, prop("on")), Value::Bool(true))];
        Ok(ActionResult::new(ctx.messages.render("turned_on", &[&name])).with_changes(changes))
    }
}

pub struct TurnOff;
impl ActionHandler for TurnOff {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        let id = single_target(command)?;
        ensure_reachable(ctx, &id)?;
        let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
        if !item.flag(&prop("on")) {
            return Err(ActionError::CustomMessage(ctx.messages.message("turn_off_already")));
        }
        Ok(())
    }

    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        let id = single_target(command)?;
        let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
        let name = item.short_description.clone();
        let changes = vec![StateChange::set(PropertyKey::ItemProperty(id, prop("on")), Value::Bool(false))];
        Ok(ActionResult::new(ctx.messages.render("turned_off", &[&name])).with_changes(changes))
    }
}

pub struct Read;
impl ActionHandler for Read {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        let id = single_target(command)?;
        ensure_reachable(ctx, &id)?;
        let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
        if !item.flag(&prop("readable")) {
            return Err(ActionError::CustomMessage(ctx.messages.message("nothing_to_read")));
        }
        if !scope::is_lit(ctx.state, &ctx.state.player().location) {
            return Err(ActionError::RequiresLight);
        }
        Ok(())
    }

    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        let id = single_target(command)?;
        let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
        let text = item.read_text.clone().unwrap_or_else(|| ctx.messages.message("nothing_to_read"));
        Ok(ActionResult::new(text))
    }
}
