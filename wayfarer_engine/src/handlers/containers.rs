//! `open`, `close`, `lock`, `unlock`.

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

pub struct Open;
impl ActionHandler for Open {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        let id = single_target(command)?;
        ensure_reachable(ctx, &id)?;
        let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
        if !item.flag(&prop("openable")) {
            return Err(ActionError::CustomMessage(ctx.messages.message("cant_open")));
        }
        if item.flag(&prop("open")) {
            return Err(ActionError::CustomMessage(ctx.messages.message("already_open")));
        }
        if item.flag(&prop("locked")) {
            return Err(ActionError::DoorLocked);
        }
        Ok(())
    }

    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        let id = single_target(command)?;
        let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
        let name = item.short_description.clone();
        let changes = vec![StateChange::set(PropertyKey::ItemProperty(id, prop("open")), Value::Bool(true))];
        Ok(ActionResult::new(ctx.messages.render("opened", &[&name])).with_changes(changes))
    }
}

pub struct Close;
impl ActionHandler for Close {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        let id = single_target(command)?;
        ensure_reachable(ctx, &id)?;
        let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
        if !item.flag(&prop("openable")) {
            return Err(ActionError::CustomMessage(ctx.messages.message("cant_close")));
        }
        if !item.flag(&prop("open")) {
            return Err(ActionError::CustomMessage(ctx.messages.message("already_closed")));
        }
        Ok(())
    }

    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        let id = single_target(command)?;
        let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
        let name = item.short_description.clone();
        let changes = vec![StateChange::set(PropertyKey::ItemProperty(id, prop("open")), Value::Bool(false))];
        Ok(ActionResult::new(ctx.messages.render("closed", &[&name])).with_changes(changes))
    }
}

fn indirect_target(command: &Command) -> Result<wayfarer_data::ItemId, ActionError> {
    command.indirect_objects.first().cloned().ok_or(ActionError::NotReachable)
}

pub struct Lock;
impl ActionHandler for Lock {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        let id = single_target(command)?;
        let key_id = indirect_target(command)?;
        ensure_reachable(ctx, &id)?;
        ensure_reachable(ctx, &key_id)?;
        let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
        if !item.flag(&prop("lockable")) {
            return Err(ActionError::CustomMessage(ctx.messages.message("cant_lock")));
        }
        if item.lock_key.as_ref() != Some(&key_id) {
            return Err(ActionError::CustomMessage(ctx.messages.message("unlock_wrong_key")));
        }
        Ok(())
    }

    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        let id = single_target(command)?;
        let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
        let name = item.short_description.clone();
        let changes = vec![StateChange::set(PropertyKey::ItemProperty(id, prop("locked")), Value::Bool(true))];
        Ok(ActionResult::new(ctx.messages.render("locked", &[&name])).with_changes(changes))
    }
}

pub struct Unlock;
impl ActionHandler for Unlock {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError> {
        let id = single_target(command)?;
        let key_id = indirect_target(command)?;
        ensure_reachable(ctx, &id)?;
        ensure_reachable(ctx, &key_id)?;
        let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
        if !item.flag(&prop("lockable")) {
            return Err(ActionError::CustomMessage(ctx.messages.message("cant_unlock")));
        }
        if item.lock_key.as_ref() != Some(&key_id) {
            return Err(ActionError::CustomMessage(ctx.messages.message("unlock_wrong_key")));
        }
        Ok(())
    }

    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError> {
        let id = single_target(command)?;
        let item = ctx.state.item(&id).ok_or(ActionError::NotReachable)?;
        let name = item.short_description.clone();
        let changes = vec![StateChange::set(PropertyKey::ItemProperty(id, prop("locked")), Value::Bool(false))];
        Ok(ActionResult::new(ctx.messages.render("unlocked", &[&name])).with_changes(changes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::DefaultMessages;
    use crate::state::GameState;
    use crate::vocabulary::Vocabulary;
    use crate::world::{Item, Location, Player};
    use std::collections::BTreeMap;
    use wayfarer_data::{ItemId, LocationId, Parent, VerbId};

    fn build_chest() -> GameState {
        let loc = Location {
            id: LocationId::new("start"),
            name: "Start".into(),
            description: "A room.".into(),
            exits: vec![],
            scenery_items: Default::default(),
            properties: {
                let mut p = BTreeMap::new();
                p.insert(prop("inherently_lit"), Value::Bool(true));
                p
            },
        };
        let mut chest_props = BTreeMap::new();
        chest_props.insert(prop("container"), Value::Bool(true));
        chest_props.insert(prop("openable"), Value::Bool(true));
        let chest = Item {
            id: ItemId::new("chest"),
            name: "chest".into(),
            adjectives: Default::default(),
            synonyms: Default::default(),
            short_description: "a chest".into(),
            first_description: None,
            long_description: None,
            read_text: None,
            capacity: 10,
            size: 5,
            parent: Parent::Location(LocationId::new("start")),
            lock_key: None,
            properties: chest_props,
        };
        let mut items = BTreeMap::new();
        items.insert(chest.id.clone(), chest);
        let mut locations = BTreeMap::new();
        locations.insert(loc.id.clone(), loc);
        let player = Player {
            location: LocationId::new("start"),
            moves: 0,
            score: 0,
            carrying_capacity: 10,
            sheet: Default::default(),
            properties: BTreeMap::new(),
        };
        GameState::new(items, locations, player, BTreeMap::new(), BTreeMap::new())
    }

    fn open_command() -> Command {
        Command {
            verb: VerbId::new("open"),
            direct_objects: vec![ItemId::new("chest")],
            indirect_objects: vec![],
            dobj_modifiers: vec![],
            iobj_modifiers: vec![],
            preposition: None,
            direction: None,
            is_all: false,
            raw_input: "open chest".into(),
        }
    }

    #[test]
    fn opening_a_closed_chest_sets_open_flag() {
        let state = build_chest();
        let vocab = Vocabulary::default();
        let messages = DefaultMessages::new();
        let ctx = ActionContext { state: &state, vocab: &vocab, messages: &messages };
        let cmd = open_command();
        Open.validate(&cmd, &ctx).unwrap();
        let result = Open.process(&cmd, &ctx).unwrap();
        assert_eq!(result.changes.len(), 1);
    }

    #[test]
    fn opening_an_already_open_chest_fails() {
        let mut state = build_chest();
        state
            .apply(StateChange::set(
                PropertyKey::ItemProperty(ItemId::new("chest"), prop("open")),
                Value::Bool(true),
            ))
            .unwrap();
        let vocab = Vocabulary::default();
        let messages = DefaultMessages::new();
        let ctx = ActionContext { state: &state, vocab: &vocab, messages: &messages };
        let err = Open.validate(&open_command(), &ctx).unwrap_err();
        assert!(matches!(err, ActionError::CustomMessage(_)));
    }
}
