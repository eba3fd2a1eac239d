//! `smell`, `listen`, `taste`, `touch` — minor sensory verbs. Each narrates
//! a per-item property if one is set, or a generic default otherwise.

use wayfarer_data::PropertyId;

use crate::action::{ActionContext, ActionError, ActionHandler, ActionResult};
use crate::parser::Command;
use crate::scope;
use crate::world::PropertyView;

fn generic(command: &Command, ctx: &ActionContext, property: &str, default_key: &str) -> Result<ActionResult, ActionError> {
    let Some(id) = command.direct_objects.first() else {
        return Ok(ActionResult::new(ctx.messages.message(default_key)));
    };
    let item = ctx.state.item(id).ok_or(ActionError::NotReachable)?;
    let text = item.string(&PropertyId::new(property));
    if text.is_empty() {
        Ok(ActionResult::new(ctx.messages.message(default_key)))
    } else {
        Ok(ActionResult::new(text))
    }
}

fn validate_reachable(command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
    if let Some(id) = command.direct_objects.first() {
        if !scope::reachable_by_player(ctx.state).contains(id) {
            return Err(ActionError::NotReachable);
        }
    }
    Ok(())
}

pub struct Smell;
impl ActionHandler for Smell {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        validate_reachable(command, ctx)
    }
    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        generic(command, ctx, "smell_text", "smell_default")
    }
}

pub struct Listen;
impl ActionHandler for Listen {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        validate_reachable(command, ctx)
    }
    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        generic(command, ctx, "listen_text", "listen_default")
    }
}

pub struct Taste;
impl ActionHandler for Taste {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        validate_reachable(command, ctx)
    }
    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        generic(command, ctx, "taste_text", "taste_default")
    }
}

pub struct Touch;
impl ActionHandler for Touch {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        validate_reachable(command, ctx)
    }
    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        generic(command, ctx, "touch_text", "touch_default")
    }
}
