//! `take`, `drop`, `put-in`, `put-on`, `wear`, `remove`.
//!
//! `put-in` and `put-on` are two verbs sharing one piece of logic, per the
//! Open Question resolution recorded in DESIGN.md: both go through
//! [`put`], differing only in which flag (`container` vs `surface`) the
//! indirect object is checked against and which message key narrates it.

use wayfarer_data::{Parent, PropertyId, Value};

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

pub struct Take;

impl ActionHandler for Take {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        if command.direct_objects.is_empty() && command.is_all {
            return Ok(());
        }
        let id = single_target(command)?;
        let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
        if item.parent == Parent::Player {
            return Err(ActionError::AlreadyHeld);
        }
        let reachable = scope::reachable_by_player(ctx.state);
        if !reachable.contains(&id) {
            return Err(ActionError::NotReachable);
        }
        if !item.flag(&prop("takable")) {
            return Err(ActionError::NotTakable);
        }
        Ok(())
    }

    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        if command.direct_objects.is_empty() {
            return Ok(ActionResult::new(ctx.messages.render("nothing_to_verb", &["take"])));
        }
        let mut changes = Vec::new();
        let mut taken = Vec::new();
        for id in &command.direct_objects {
            let Some(item) = ctx.state.item(id) else { continue };
            if item.parent == Parent::Player || !item.flag(&prop("takable")) {
                continue;
            }
            changes.push(StateChange::compare_and_set(
                PropertyKey::ItemParent(id.clone()),
                Value::Parent(item.parent.clone()),
                Value::Parent(Parent::Player),
            ));
            changes.push(StateChange::set(
                PropertyKey::ItemProperty(id.clone(), prop("touched")),
                Value::Bool(true),
            ));
            taken.push(id.clone());
        }
        if taken.is_empty() {
            return Ok(ActionResult::new(ctx.messages.message("not_takable")));
        }
        changes.push(StateChange::set(
            PropertyKey::PronounReference("it".into()),
            Value::ItemId(taken.last().unwrap().clone()),
        ));
        Ok(ActionResult::new(ctx.messages.message("taken")).with_changes(changes))
    }
}

pub struct Drop;

impl ActionHandler for Drop {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        let id = single_target(command)?;
        let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
        if item.parent != Parent::Player {
            return Err(ActionError::NotReachable);
        }
        Ok(())
    }

    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        let id = single_target(command)?;
        let location = ctx.state.player().location.clone();
        let changes = vec![
            StateChange::compare_and_set(
                PropertyKey::ItemParent(id.clone()),
                Value::Parent(Parent::Player),
                Value::Parent(Parent::Location(location)),
            ),
            StateChange::set(PropertyKey::PronounReference("it".into()), Value::ItemId(id)),
        ];
        Ok(ActionResult::new(ctx.messages.message("dropped")).with_changes(changes))
    }
}

enum PutKind {
    In,
    On,
}

fn put(kind: PutKind, command: &Command, ctx: &ActionContext, validating: bool) -> Result<ActionResult, ActionError> {
    let item_id = command.direct_objects.first().cloned().ok_or(ActionError::NotReachable)?;
    let target_id = command.indirect_objects.first().cloned().ok_or(ActionError::NotReachable)?;

    let target = ctx.state.item(&target_id).ok_or(ActionError::NotReachable)?;
    let (required_flag, message_key, type_error) = match kind {
        PutKind::In => ("container", "put_in", ActionError::CustomMessage(ctx.messages.message("not_a_container"))),
        PutKind::On => ("surface", "put_on", ActionError::CustomMessage(ctx.messages.message("not_a_surface"))),
    };
    if !target.flag(&prop(required_flag)) {
        return Err(type_error);
    }
    if matches!(kind, PutKind::In) && target.flag(&prop("openable")) && !target.flag(&prop("open")) && !target.flag(&prop("transparent"))
    {
        return Err(ActionError::ContainerClosed);
    }
    if validating {
        let reachable = scope::reachable_by_player(ctx.state);
        if !reachable.contains(&item_id) {
            return Err(ActionError::NotReachable);
        }
        return Ok(ActionResult::default());
    }

    let item = ctx.state.item(&item_id).ok_or(ActionError::NotReachable)?;
    let new_parent = Parent::Item(target_id.clone());
    let changes = vec![
        StateChange::compare_and_set(
            PropertyKey::ItemParent(item_id.clone()),
            Value::Parent(item.parent.clone()),
            Value::Parent(new_parent),
        ),
        StateChange::set(PropertyKey::PronounReference("it".into()), Value::ItemId(item_id.clone())),
    ];
    let item_name = item.short_description.clone();
    let target_name = target.short_description.clone();
    Ok(ActionResult::new(ctx.messages.render(message_key, &[&item_name, &target_name])).with_changes(changes))
}

pub struct PutIn;
impl ActionHandler for PutIn {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        put(PutKind::In, command, ctx, true).map(|_| ())
    }
    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        put(PutKind::In, command, ctx, false)
    }
}

pub struct PutOn;
impl ActionHandler for PutOn {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        put(PutKind::On, command, ctx, true).map(|_| ())
    }
    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        put(PutKind::On, command, ctx, false)
    }
}

pub struct Wear;
impl ActionHandler for Wear {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        let id = single_target(command)?;
        let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
        if item.parent != Parent::Player {
            return Err(ActionError::NotReachable);
        }
        if !item.flag(&prop("wearable")) {
            return Err(ActionError::CustomMessage(ctx.messages.message("not_wearable")));
        }
        Ok(())
    }

    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        let id = single_target(command)?;
        let changes = vec![
            StateChange::set(PropertyKey::ItemProperty(id.clone(), prop("worn")), Value::Bool(true)),
            StateChange::set(PropertyKey::PronounReference("it".into()), Value::ItemId(id)),
        ];
        Ok(ActionResult::new(ctx.messages.message("worn")).with_changes(changes))
    }
}

pub struct Remove;
impl ActionHandler for Remove {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        let id = single_target(command)?;
        let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
        if !item.flag(&prop("worn")) {
            return Err(ActionError::CustomMessage(ctx.messages.message("not_worn")));
        }
        Ok(())
    }

    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        let id = single_target(command)?;
        let changes = vec![
            StateChange::set(PropertyKey::ItemProperty(id.clone(), prop("worn")), Value::Bool(false)),
            StateChange::set(PropertyKey::PronounReference("it".into()), Value::ItemId(id)),
        ];
        Ok(ActionResult::new(ctx.messages.message("removed")).with_changes(changes))
    }
}
