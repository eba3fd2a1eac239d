//! `look`, `examine`, `inventory`.

use wayfarer_data::{Parent, PropertyId, Value};

use crate::action::{ActionContext, ActionError, ActionHandler, ActionResult};
use crate::parser::Command;
use crate::scope;
use crate::state::{PropertyKey, StateChange};
use crate::world::PropertyView;

fn prop(name: &str) -> PropertyId {
    PropertyId::new(name)
}

pub struct Look;

impl ActionHandler for Look {
    fn validate(&self, _command: &Command, _ctx: &ActionContext) -> Result<(), ActionError> {
        Ok(())
    }

    fn process(&self, _command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        let location_id = ctx.state.player().location.clone();
        if !scope::is_lit(ctx.state, &location_id) {
            return Ok(ActionResult::new(ctx.messages.message("dark_room")));
        }
        let loc = ctx
            .state
            .location(&location_id)
            .ok_or_else(|| ActionError::InternalInvariant("player location missing".into()))?;

        // First visit always gets the full description; after that, it
        // only repeats if the player has switched on `verbose` (§6).
        let verbose = ctx.state.game_specific("verbose_mode").map(Value::as_bool_or_false).unwrap_or(false);
        let mut text = if !loc.flag(&prop("visited")) || verbose {
            format!("{}\n{}", loc.name, loc.description)
        } else {
            loc.name.clone()
        };
        let items = scope::visible_items_in(ctx.state, &location_id);
        if !items.is_empty() {
            let names: Vec<String> = items
                .iter()
                .filter_map(|id| ctx.state.item(id))
                .map(|it| it.short_description.clone())
                .collect();
            text.push_str(&ctx.messages.render("room_items", &[&names.join(", ")]));
        }
        Ok(ActionResult::new(text))
    }
}

pub struct Examine;

impl ActionHandler for Examine {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        if command.direct_objects.is_empty() {
            return Err(ActionError::NotReachable);
        }
        let reachable = scope::reachable_by_player(ctx.state);
        for id in &command.direct_objects {
            if !reachable.contains(id) {
                return Err(ActionError::NotReachable);
            }
        }
        Ok(())
    }

    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        let mut lines = Vec::new();
        for id in &command.direct_objects {
            let item = ctx.state.item(id).ok_or_else(|| ActionError::InternalInvariant("examined item missing".into()))?;
            lines.push(item.description_for_examine().to_string());
        }
        // spec.md §8 scenario 6: examining an item binds "it" for a
        // following pronoun reference, same as taking/dropping it would.
        let changes = command.direct_objects.last().map_or(vec![], |id| {
            vec![StateChange::set(PropertyKey::PronounReference("it".into()), Value::ItemId(id.clone()))]
        });
        Ok(ActionResult::new(lines.join("\n")).with_changes(changes))
    }
}

pub struct Inventory;

impl ActionHandler for Inventory {
    fn validate(&self, _command: &Command, _ctx: &ActionContext) -> Result<(), ActionError> {
        Ok(())
    }

    fn process(&self, _command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        let held = ctx.state.player_inventory();
        if held.is_empty() {
            return Ok(ActionResult::new(ctx.messages.message("inventory_empty")));
        }
        let names: Vec<String> = held
            .iter()
            .filter_map(|id| ctx.state.item(id))
            .map(|it| {
                if it.flag(&prop("worn")) {
                    format!("{} (worn)", it.short_description)
                } else {
                    it.short_description.clone()
                }
            })
            .collect();
        Ok(ActionResult::new(ctx.messages.render("inventory_list", &[&names.join(", ")])))
    }
}
