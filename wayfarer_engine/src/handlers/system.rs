//! `wait`, `score`, `quit`, `help`, `verbose`, `brief`, `think-about`.
//!
//! `save` and `restore` are not registered as ordinary handlers: they need
//! file-system access a read-only [`ActionContext`] doesn't carry, so the
//! engine turn loop intercepts those two verbs before ordinary dispatch
//! (see `crate::engine`).

use wayfarer_data::{PropertyId, Value};

use crate::action::{ActionContext, ActionError, ActionHandler, ActionResult, SideEffect};
use crate::parser::Command;
use crate::state::{PropertyKey, StateChange};
use crate::world::PropertyView;

pub struct Wait;
impl ActionHandler for Wait {
    fn validate(&self, _command: &Command, _ctx: &ActionContext) -> Result<(), ActionError> {
        Ok(())
    }
    fn process(&self, _command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        Ok(ActionResult::new(ctx.messages.message("waited")))
    }
}

pub struct Score;
impl ActionHandler for Score {
    fn validate(&self, _command: &Command, _ctx: &ActionContext) -> Result<(), ActionError> {
        Ok(())
    }
    fn process(&self, _command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        let player = ctx.state.player();
        let max = ctx.state.game_specific("maximum_score").map(Value::as_int_or_zero).unwrap_or(0);
        Ok(ActionResult::new(ctx.messages.render(
            "score",
            &[&player.score.to_string(), &max.to_string(), &player.moves.to_string()],
        )))
    }
}

pub struct Quit;
impl ActionHandler for Quit {
    fn validate(&self, _command: &Command, _ctx: &ActionContext) -> Result<(), ActionError> {
        Ok(())
    }
    fn process(&self, _command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        Ok(ActionResult::new(ctx.messages.message("quit_confirm")).with_side_effect(SideEffect::EndGame))
    }
}

pub struct Help;
impl ActionHandler for Help {
    fn validate(&self, _command: &Command, _ctx: &ActionContext) -> Result<(), ActionError> {
        Ok(())
    }
    fn process(&self, _command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        Ok(ActionResult::new(ctx.messages.message("help_text")))
    }
}

pub struct Verbose;
impl ActionHandler for Verbose {
    fn validate(&self, _command: &Command, _ctx: &ActionContext) -> Result<(), ActionError> {
        Ok(())
    }
    fn process(&self, _command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        let changes = vec![StateChange::set(
            PropertyKey::GameSpecific("verbose_mode".into()),
            Value::Bool(true),
        )];
        Ok(ActionResult::new(ctx.messages.message("verbose_on")).with_changes(changes))
    }
}

pub struct Brief;
impl ActionHandler for Brief {
    fn validate(&self, _command: &Command, _ctx: &ActionContext) -> Result<(), ActionError> {
        Ok(())
    }
    fn process(&self, _command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        let changes = vec![StateChange::set(
            PropertyKey::GameSpecific("verbose_mode".into()),
            Value::Bool(false),
        )];
        Ok(ActionResult::new(ctx.messages.message("brief_on")).with_changes(changes))
    }
}

pub struct ThinkAbout;
impl ActionHandler for ThinkAbout {
    fn validate(&self, _command: &Command, _ctx: &ActionContext) -> Result<(), ActionError> {
        Ok(())
    }
    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        let Some(id) = command.direct_objects.first() else {
            return Ok(ActionResult::new(ctx.messages.message("think_default_self")));
        };
        let item = ctx.state.item(id).ok_or(ActionError::NotReachable)?;
        let text = item.string(&PropertyId::new("think_text"));
        if text.is_empty() {
            Ok(ActionResult::new(ctx.messages.render("think_default_item", &[&item.name])))
        } else {
            Ok(ActionResult::new(text))
        }
    }
}
