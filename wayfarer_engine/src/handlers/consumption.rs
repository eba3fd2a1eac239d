//! `eat`, `drink`.

use wayfarer_data::{Parent, PropertyId, Value};

use crate::action::{ActionContext, ActionError, ActionHandler, ActionResult};
use crate::parser::Command;
use crate::state::{PropertyKey, StateChange};
use crate::world::PropertyView;

fn prop(name: &str) -> PropertyId {
    PropertyId::new(name)
}

fn single_target(command: &Command) -> Result<wayfarer_data::ItemId, ActionError> {
    command.direct_objects.first().cloned().ok_or(ActionError::NotReachable)
}

fn validate_consumable(command: &Command, ctx: &ActionContext, flag: &str, not_edible_key: &str) -> Result<(), ActionError> {
    let id = single_target(command)?;
    let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
    if item.parent != Parent::Player {
        return Err(ActionError::NotReachable);
    }
    if !item.flag(&prop(flag)) {
        return Err(ActionError::CustomMessage(ctx.messages.message(not_edible_key)));
    }
    Ok(())
}

fn consume(command: &Command, ctx: &ActionContext, consumed_key: &str) -> Result<ActionResult, ActionError> {
    let id = single_target(command)?;
    let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
    let name = item.short_description.clone();
    let changes = vec![StateChange::compare_and_set(
        PropertyKey::ItemParent(id),
        Value::Parent(Parent::Player),
        Value::Parent(Parent::Nowhere),
    )];
    Ok(ActionResult::new(ctx.messages.render(consumed_key, &[&name])).with_changes(changes))
}

pub struct Eat;
impl ActionHandler for Eat {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        validate_consumable(command, ctx, "edible", "not_edible")
    }
    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        consume(command, ctx, "eaten")
    }
}

pub struct Drink;
impl ActionHandler for Drink {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        validate_consumable(command, ctx, "drinkable", "not_drinkable")
    }
    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        consume(command, ctx, "drunk")
    }
}
