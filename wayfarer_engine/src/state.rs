//! `GameState`: the single owner of world data and the sole mutation gate.
//!
//! Every write to the world passes through [`GameState::apply`]. Handlers
//! and hooks never mutate state directly; they return [`StateChange`]s
//! (see `crate::action`) that the engine turn loop applies on their behalf.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wayfarer_data::{DaemonDef, DaemonId, FuseDef, FuseId, GlobalId, ItemId, LocationId, Parent, PropertyId, Value};

use crate::world::{Item, Location, Player, PropertyView};

/// The target of a single mutation, together with any payload the target
/// itself carries (fuse/daemon operations encode their payload in the key
/// rather than in `StateChange::new_value`, per spec.md §4.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKey {
    ItemParent(ItemId),
    ItemProperty(ItemId, PropertyId),
    LocationProperty(LocationId, PropertyId),
    PlayerScore,
    PlayerMoves,
    PlayerCapacity,
    PlayerLocation,
    GlobalFlag(GlobalId),
    GameSpecific(String),
    PronounReference(String),
    AddFuse(FuseId, u32),
    RemoveFuse(FuseId),
    UpdateFuseTurns(FuseId, u32),
    AddDaemon(DaemonId),
    RemoveDaemon(DaemonId),
}

/// A single validated mutation record: what to change, what it must
/// currently be (if the caller wants optimistic-concurrency protection),
/// and what it becomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub key: PropertyKey,
    pub expected_old: Option<Value>,
    pub new_value: Value,
}

impl StateChange {
    /// Build a change with no old-value check.
    pub fn set(key: PropertyKey, new_value: Value) -> Self {
        Self { key, expected_old: None, new_value }
    }

    /// Build a change that only applies if the current value structurally
    /// equals `expected_old`.
    pub fn compare_and_set(key: PropertyKey, expected_old: Value, new_value: Value) -> Self {
        Self { key, expected_old: Some(expected_old), new_value }
    }
}

/// Why a [`StateChange`] was rejected by [`GameState::apply`].
///
/// Per spec.md §4.1, any of these means *no* mutation occurred: the apply
/// contract is all-or-nothing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplyError {
    #[error("expected old value {expected:?} but found {actual:?}")]
    OldValueMismatch { expected: Value, actual: Value },
    #[error("value kind {new_kind} does not match existing kind {old_kind}")]
    TypeMismatch { old_kind: &'static str, new_kind: &'static str },
    #[error("referenced item {0} does not exist")]
    UnknownItem(ItemId),
    #[error("referenced location {0} does not exist")]
    UnknownLocation(LocationId),
    #[error("item {0} cannot be its own parent")]
    SelfParent(ItemId),
    #[error("setting item {0} as its own ancestor would create a parent cycle")]
    ParentCycle(ItemId),
    #[error("fuse {0} already active")]
    FuseAlreadyActive(FuseId),
    #[error("fuse {0} is not active")]
    FuseNotActive(FuseId),
    #[error("fuse {0} must be activated with a positive turn count")]
    NonPositiveFuseTurns(FuseId),
    #[error("daemon {0} already active")]
    DaemonAlreadyActive(DaemonId),
    #[error("daemon {0} is not active")]
    DaemonNotActive(DaemonId),
    #[error("unknown fuse definition {0}")]
    UnknownFuseDef(FuseId),
    #[error("unknown daemon definition {0}")]
    UnknownDaemonDef(DaemonId),
}

/// The authoritative store of world data: items, locations, the player,
/// globals, pronoun bindings, the time system's active sets, game-specific
/// key/value storage, and the append-only change log.
#[derive(Debug, Clone)]
pub struct GameState {
    items: BTreeMap<ItemId, Item>,
    locations: BTreeMap<LocationId, Location>,
    player: Player,
    globals: BTreeMap<GlobalId, bool>,
    pronouns: BTreeMap<String, ItemId>,
    active_fuses: BTreeMap<FuseId, u32>,
    active_daemons: BTreeSet<DaemonId>,
    game_specific: BTreeMap<String, Value>,
    change_log: Vec<StateChange>,
    fuse_defs: BTreeMap<FuseId, FuseDef>,
    daemon_defs: BTreeMap<DaemonId, DaemonDef>,
}

impl GameState {
    /// Construct a fresh `GameState` from already-instantiated world
    /// entities. Called by `crate::loader` once a blueprint has been
    /// validated and turned into runtime items/locations/player.
    pub fn new(
        items: BTreeMap<ItemId, Item>,
        locations: BTreeMap<LocationId, Location>,
        player: Player,
        fuse_defs: BTreeMap<FuseId, FuseDef>,
        daemon_defs: BTreeMap<DaemonId, DaemonDef>,
    ) -> Self {
        Self {
            items,
            locations,
            player,
            globals: BTreeMap::new(),
            pronouns: BTreeMap::new(),
            active_fuses: BTreeMap::new(),
            active_daemons: BTreeSet::new(),
            game_specific: BTreeMap::new(),
            change_log: Vec::new(),
            fuse_defs,
            daemon_defs,
        }
    }

    // -- read views -------------------------------------------------

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn location(&self, id: &LocationId) -> Option<&Location> {
        self.locations.get(id)
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    pub fn global(&self, id: &GlobalId) -> bool {
        self.globals.get(id).copied().unwrap_or(false)
    }

    pub fn pronoun(&self, word: &str) -> Option<&ItemId> {
        self.pronouns.get(&word.to_lowercase())
    }

    pub fn active_fuses(&self) -> &BTreeMap<FuseId, u32> {
        &self.active_fuses
    }

    pub fn active_daemons(&self) -> &BTreeSet<DaemonId> {
        &self.active_daemons
    }

    pub fn fuse_def(&self, id: &FuseId) -> Option<&FuseDef> {
        self.fuse_defs.get(id)
    }

    pub fn daemon_def(&self, id: &DaemonId) -> Option<&DaemonDef> {
        self.daemon_defs.get(id)
    }

    pub fn game_specific(&self, key: &str) -> Option<&Value> {
        self.game_specific.get(key)
    }

    pub fn change_log_len(&self) -> usize {
        self.change_log.len()
    }

    /// `items_in(parent)`: every item whose current parent is exactly
    /// `parent`, in stable id order.
    pub fn items_in(&self, parent: &Parent) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> =
            self.items.values().filter(|it| &it.parent == parent).map(|it| it.id.clone()).collect();
        ids.sort();
        ids
    }

    pub fn item_location(&self, id: &ItemId) -> Option<&Parent> {
        self.items.get(id).map(|it| &it.parent)
    }

    pub fn player_inventory(&self) -> Vec<ItemId> {
        self.items_in(&Parent::Player)
    }

    // -- mutation gate ------------------------------------------------

    /// Apply a single [`StateChange`]. On success the change is appended
    /// to the log; on any error, no part of the state is touched.
    pub fn apply(&mut self, change: StateChange) -> Result<(), ApplyError> {
        self.validate(&change)?;
        self.write(&change);
        debug!("applied state change: {:?}", change.key);
        self.change_log.push(change);
        Ok(())
    }

    /// Apply a whole `ActionResult`'s changes atomically: either every
    /// change succeeds, or the log (and therefore the state, since the log
    /// is the only record of what mutated) is rewound to its length before
    /// this call began.
    pub fn apply_all(&mut self, changes: Vec<StateChange>) -> Result<(), ApplyError> {
        let checkpoint = self.change_log.len();
        for change in changes {
            if let Err(err) = self.apply(change) {
                warn!("rolling back turn after apply error: {err}");
                self.rewind_to(checkpoint);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Discard every change after `len`, restoring prior values.
    ///
    /// This is a literal undo: changes are reverted in reverse order by
    /// writing back their `expected_old` (or, for changes with no
    /// recorded old value, by recomputing the structural inverse from the
    /// current in-memory value is not possible in general, so every
    /// mutating path that needs rollback safety records an old value).
    pub fn rewind_to(&mut self, len: usize) {
        while self.change_log.len() > len {
            let change = self.change_log.pop().expect("checked non-empty above");
            self.unwrite(&change);
        }
    }

    fn validate(&self, change: &StateChange) -> Result<(), ApplyError> {
        use PropertyKey::*;
        match &change.key {
            ItemParent(id) => {
                let _ = self.items.get(id).ok_or_else(|| ApplyError::UnknownItem(id.clone()))?;
                let new_parent = match &change.new_value {
                    Value::Parent(p) => p.clone(),
                    other => {
                        return Err(ApplyError::TypeMismatch {
                            old_kind: "parent",
                            new_kind: other.kind_name(),
                        })
                    }
                };
                self.check_old_value(change, &Value::Parent(self.items[id].parent.clone()))?;
                match &new_parent {
                    Parent::Item(target) => {
                        if target == id {
                            return Err(ApplyError::SelfParent(id.clone()));
                        }
                        if !self.items.contains_key(target) {
                            return Err(ApplyError::UnknownItem(target.clone()));
                        }
                        if self.would_cycle(id, target) {
                            return Err(ApplyError::ParentCycle(id.clone()));
                        }
                    }
                    Parent::Location(loc) => {
                        if !self.locations.contains_key(loc) {
                            return Err(ApplyError::UnknownLocation(loc.clone()));
                        }
                    }
                    Parent::Player | Parent::Nowhere => {}
                }
                Ok(())
            }
            ItemProperty(id, prop) => {
                let item = self.items.get(id).ok_or_else(|| ApplyError::UnknownItem(id.clone()))?;
                let current = item.properties.get(prop);
                self.check_kind(current, &change.new_value)?;
                let default = Value::Undefined;
                self.check_old_value(change, current.unwrap_or(&default))
            }
            LocationProperty(id, prop) => {
                let loc = self.locations.get(id).ok_or_else(|| ApplyError::UnknownLocation(id.clone()))?;
                let current = loc.properties.get(prop);
                self.check_kind(current, &change.new_value)?;
                let default = Value::Undefined;
                self.check_old_value(change, current.unwrap_or(&default))
            }
            PlayerScore | PlayerMoves | PlayerCapacity => {
                if !matches!(change.new_value, Value::Int(_)) {
                    return Err(ApplyError::TypeMismatch { old_kind: "int", new_kind: change.new_value.kind_name() });
                }
                Ok(())
            }
            PlayerLocation => match &change.new_value {
                Value::LocationId(loc) if self.locations.contains_key(loc) => Ok(()),
                Value::LocationId(loc) => Err(ApplyError::UnknownLocation(loc.clone())),
                other => Err(ApplyError::TypeMismatch { old_kind: "location-id", new_kind: other.kind_name() }),
            },
            GlobalFlag(_) => {
                if !matches!(change.new_value, Value::Bool(_)) {
                    return Err(ApplyError::TypeMismatch { old_kind: "bool", new_kind: change.new_value.kind_name() });
                }
                Ok(())
            }
            GameSpecific(key) => {
                let current = self.game_specific.get(key);
                self.check_kind(current, &change.new_value)
            }
            PronounReference(_) => match &change.new_value {
                Value::ItemId(id) if self.items.contains_key(id) => Ok(()),
                Value::ItemId(id) => Err(ApplyError::UnknownItem(id.clone())),
                other => Err(ApplyError::TypeMismatch { old_kind: "item-id", new_kind: other.kind_name() }),
            },
            AddFuse(id, turns) => {
                if *turns == 0 {
                    return Err(ApplyError::NonPositiveFuseTurns(id.clone()));
                }
                if self.active_fuses.contains_key(id) {
                    return Err(ApplyError::FuseAlreadyActive(id.clone()));
                }
                if !self.fuse_defs.contains_key(id) {
                    return Err(ApplyError::UnknownFuseDef(id.clone()));
                }
                Ok(())
            }
            RemoveFuse(id) => {
                if !self.active_fuses.contains_key(id) {
                    return Err(ApplyError::FuseNotActive(id.clone()));
                }
                Ok(())
            }
            UpdateFuseTurns(id, turns) => {
                if *turns == 0 {
                    return Err(ApplyError::NonPositiveFuseTurns(id.clone()));
                }
                if !self.active_fuses.contains_key(id) {
                    return Err(ApplyError::FuseNotActive(id.clone()));
                }
                Ok(())
            }
            AddDaemon(id) => {
                if self.active_daemons.contains(id) {
                    return Err(ApplyError::DaemonAlreadyActive(id.clone()));
                }
                if !self.daemon_defs.contains_key(id) {
                    return Err(ApplyError::UnknownDaemonDef(id.clone()));
                }
                Ok(())
            }
            RemoveDaemon(id) => {
                if !self.active_daemons.contains(id) {
                    return Err(ApplyError::DaemonNotActive(id.clone()));
                }
                Ok(())
            }
        }
    }

    fn check_kind(&self, current: Option<&Value>, new_value: &Value) -> Result<(), ApplyError> {
        if let Some(current) = current {
            if !current.same_kind(new_value) && !matches!(current, Value::Undefined) {
                return Err(ApplyError::TypeMismatch {
                    old_kind: current.kind_name(),
                    new_kind: new_value.kind_name(),
                });
            }
        }
        Ok(())
    }

    fn check_old_value(&self, change: &StateChange, actual: &Value) -> Result<(), ApplyError> {
        if let Some(expected) = &change.expected_old {
            if expected != actual {
                return Err(ApplyError::OldValueMismatch { expected: expected.clone(), actual: actual.clone() });
            }
        }
        Ok(())
    }

    /// Would re-parenting `item` under `new_parent` create a cycle? Walks
    /// the parent chain starting at `new_parent` looking for `item`.
    fn would_cycle(&self, item: &ItemId, new_parent: &ItemId) -> bool {
        let mut current = new_parent.clone();
        let mut guard = 0usize;
        loop {
            if &current == item {
                return true;
            }
            guard += 1;
            if guard > self.items.len() {
                return true;
            }
            match self.items.get(&current).map(|it| it.parent.clone()) {
                Some(Parent::Item(next)) => current = next,
                _ => return false,
            }
        }
    }

    fn write(&mut self, change: &StateChange) {
        use PropertyKey::*;
        match &change.key {
            ItemParent(id) => {
                if let Value::Parent(p) = &change.new_value {
                    self.items.get_mut(id).expect("validated").parent = p.clone();
                }
            }
            ItemProperty(id, prop) => {
                self.items.get_mut(id).expect("validated").properties.insert(prop.clone(), change.new_value.clone());
            }
            LocationProperty(id, prop) => {
                self.locations
                    .get_mut(id)
                    .expect("validated")
                    .properties
                    .insert(prop.clone(), change.new_value.clone());
            }
            PlayerScore => self.player.score = change.new_value.as_int_or_zero(),
            PlayerMoves => self.player.moves = change.new_value.as_int_or_zero().max(0) as u64,
            PlayerCapacity => self.player.carrying_capacity = change.new_value.as_int_or_zero(),
            PlayerLocation => {
                if let Value::LocationId(loc) = &change.new_value {
                    self.player.location = loc.clone();
                }
            }
            GlobalFlag(id) => {
                self.globals.insert(id.clone(), change.new_value.as_bool_or_false());
            }
            GameSpecific(key) => {
                self.game_specific.insert(key.clone(), change.new_value.clone());
            }
            PronounReference(word) => {
                if let Value::ItemId(id) = &change.new_value {
                    self.pronouns.insert(word.to_lowercase(), id.clone());
                }
            }
            AddFuse(id, turns) => {
                self.active_fuses.insert(id.clone(), *turns);
            }
            RemoveFuse(id) => {
                self.active_fuses.remove(id);
            }
            UpdateFuseTurns(id, turns) => {
                self.active_fuses.insert(id.clone(), *turns);
            }
            AddDaemon(id) => {
                self.active_daemons.insert(id.clone());
            }
            RemoveDaemon(id) => {
                self.active_daemons.remove(id);
            }
        }
    }

    /// Inverse of `write`, driven by the `expected_old` recorded on the
    /// change being undone. Structural fuse/daemon adds are undone by
    /// removing; removes by re-adding at their prior turn count, which
    /// callers must have captured via `expected_old` as `Value::Int`.
    fn unwrite(&mut self, change: &StateChange) {
        use PropertyKey::*;
        match &change.key {
            ItemParent(id) => {
                if let Some(Value::Parent(old)) = &change.expected_old {
                    if let Some(item) = self.items.get_mut(id) {
                        item.parent = old.clone();
                    }
                }
            }
            ItemProperty(id, prop) => {
                if let Some(item) = self.items.get_mut(id) {
                    match &change.expected_old {
                        Some(Value::Undefined) | None => {
                            item.properties.remove(prop);
                        }
                        Some(old) => {
                            item.properties.insert(prop.clone(), old.clone());
                        }
                    }
                }
            }
            LocationProperty(id, prop) => {
                if let Some(loc) = self.locations.get_mut(id) {
                    match &change.expected_old {
                        Some(Value::Undefined) | None => {
                            loc.properties.remove(prop);
                        }
                        Some(old) => {
                            loc.properties.insert(prop.clone(), old.clone());
                        }
                    }
                }
            }
            PlayerScore => {
                if let Some(old) = &change.expected_old {
                    self.player.score = old.as_int_or_zero();
                }
            }
            PlayerMoves => {
                if let Some(old) = &change.expected_old {
                    self.player.moves = old.as_int_or_zero().max(0) as u64;
                }
            }
            PlayerCapacity => {
                if let Some(old) = &change.expected_old {
                    self.player.carrying_capacity = old.as_int_or_zero();
                }
            }
            PlayerLocation => {
                if let Some(Value::LocationId(old)) = &change.expected_old {
                    self.player.location = old.clone();
                }
            }
            GlobalFlag(id) => {
                if let Some(old) = &change.expected_old {
                    self.globals.insert(id.clone(), old.as_bool_or_false());
                } else {
                    self.globals.remove(id);
                }
            }
            GameSpecific(key) => match &change.expected_old {
                Some(Value::Undefined) | None => {
                    self.game_specific.remove(key);
                }
                Some(old) => {
                    self.game_specific.insert(key.clone(), old.clone());
                }
            },
            PronounReference(word) => match &change.expected_old {
                Some(Value::ItemId(old)) => {
                    self.pronouns.insert(word.to_lowercase(), old.clone());
                }
                _ => {
                    self.pronouns.remove(word);
                }
            },
            AddFuse(id, _) => {
                self.active_fuses.remove(id);
            }
            RemoveFuse(id) => {
                if let Some(Value::Int(turns)) = &change.expected_old {
                    self.active_fuses.insert(id.clone(), (*turns).max(0) as u32);
                }
            }
            UpdateFuseTurns(id, _) => {
                if let Some(Value::Int(turns)) = &change.expected_old {
                    self.active_fuses.insert(id.clone(), (*turns).max(0) as u32);
                }
            }
            AddDaemon(id) => {
                self.active_daemons.remove(id);
            }
            RemoveDaemon(id) => {
                self.active_daemons.insert(id.clone());
            }
        }
    }

    /// Decrement and remove expired fuses, returning their ids in
    /// ascending order. Called once per tick by the time system.
    pub fn decrement_fuses(&mut self) -> Vec<FuseId> {
        let mut expired = Vec::new();
        for (id, turns) in self.active_fuses.iter_mut() {
            *turns -= 1;
            if *turns == 0 {
                expired.push(id.clone());
            }
        }
        for id in &expired {
            self.active_fuses.remove(id);
        }
        expired.sort();
        expired
    }

    /// Insert or replace an item directly, bypassing the mutation gate.
    /// Only available to tests in this crate, for building fixtures.
    #[cfg(test)]
    pub(crate) fn insert_item_for_test(&mut self, item: Item) {
        self.items.insert(item.id.clone(), item);
    }

    /// Daemons due to fire this turn (player.moves % period == 0), in
    /// ascending id order.
    pub fn due_daemons(&self) -> Vec<DaemonId> {
        let mut due: Vec<DaemonId> = self
            .active_daemons
            .iter()
            .filter(|id| {
                self.daemon_defs
                    .get(*id)
                    .map(|def| def.period > 0 && self.player.moves % def.period as u64 == 0)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        due.sort();
        due
    }
}

/// The version stamped into every [`SaveData`] written by
/// `crate::save::save_game`. Bumped whenever the shape of `SaveData`
/// changes incompatibly; a mismatch is reported rather than guessed at
/// (spec.md §6: "loads of mismatched versions fail with a clear error").
pub const SAVE_FORMAT_VERSION: u32 = 1;

/// The versioned, serializable snapshot of mutable runtime state captured
/// by save/restore.
///
/// Fuse and daemon *definitions* travel with the blueprint, not the save:
/// per spec.md §6, vocabulary and handlers are "regenerated from the
/// blueprint at load", and the same is true of fuse/daemon definitions —
/// only which ones are currently active, and their remaining turns, need
/// to be persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub items: BTreeMap<ItemId, Item>,
    pub locations: BTreeMap<LocationId, Location>,
    pub player: Player,
    pub globals: BTreeMap<GlobalId, bool>,
    pub pronouns: BTreeMap<String, ItemId>,
    pub active_fuses: BTreeMap<FuseId, u32>,
    pub active_daemons: BTreeSet<DaemonId>,
    pub game_specific: BTreeMap<String, Value>,
    pub change_log_len: usize,
    pub rng_state: u64,
}

impl GameState {
    /// Capture a save-ready snapshot of this state. `rng_state` is the
    /// caller's RNG state (owned by `Engine`, not `GameState`).
    pub fn to_save_data(&self, rng_state: u64) -> SaveData {
        SaveData {
            version: SAVE_FORMAT_VERSION,
            items: self.items.clone(),
            locations: self.locations.clone(),
            player: self.player.clone(),
            globals: self.globals.clone(),
            pronouns: self.pronouns.clone(),
            active_fuses: self.active_fuses.clone(),
            active_daemons: self.active_daemons.clone(),
            game_specific: self.game_specific.clone(),
            change_log_len: self.change_log.len(),
            rng_state,
        }
    }

    /// Rebuild a `GameState` from a [`SaveData`] snapshot. Fuse/daemon
    /// *definitions* are not part of the snapshot, so the caller (normally
    /// `Engine::handle_restore`, re-reading them from the blueprint) must
    /// supply them. The change log starts empty: undo history does not
    /// survive a save/restore round trip, only the world does.
    pub fn from_save_data(
        data: SaveData,
        fuse_defs: BTreeMap<FuseId, FuseDef>,
        daemon_defs: BTreeMap<DaemonId, DaemonDef>,
    ) -> Self {
        GameState {
            items: data.items,
            locations: data.locations,
            player: data.player,
            globals: data.globals,
            pronouns: data.pronouns,
            active_fuses: data.active_fuses,
            active_daemons: data.active_daemons,
            game_specific: data.game_specific,
            change_log: Vec::new(),
            fuse_defs,
            daemon_defs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use wayfarer_data::ItemId;

    fn build_test_item(id: &str, parent: Parent) -> Item {
        Item {
            id: ItemId::new(id),
            name: id.to_string(),
            adjectives: BTreeSet::new(),
            synonyms: BTreeSet::new(),
            short_description: format!("a {id}"),
            first_description: None,
            long_description: None,
            read_text: None,
            capacity: 0,
            size: 1,
            parent,
            lock_key: None,
            properties: BTreeMap::new(),
        }
    }

    fn build_test_location(id: &str) -> Location {
        Location {
            id: LocationId::new(id),
            name: id.to_string(),
            description: format!("the {id}"),
            exits: vec![],
            scenery_items: BTreeSet::new(),
            properties: BTreeMap::new(),
        }
    }

    fn build_test_state() -> GameState {
        let start = build_test_location("start");
        let lamp = build_test_item("lamp", Parent::Location(LocationId::new("start")));
        let mut items = BTreeMap::new();
        items.insert(lamp.id.clone(), lamp);
        let mut locations = BTreeMap::new();
        locations.insert(start.id.clone(), start);
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

    #[test]
    fn apply_item_parent_moves_item() {
        let mut state = build_test_state();
        state
            .apply(StateChange::set(
                PropertyKey::ItemParent(ItemId::new("lamp")),
                Value::Parent(Parent::Player),
            ))
            .unwrap();
        assert_eq!(state.item(&ItemId::new("lamp")).unwrap().parent, Parent::Player);
        assert_eq!(state.player_inventory(), vec![ItemId::new("lamp")]);
    }

    #[test]
    fn apply_rejects_unknown_item() {
        let mut state = build_test_state();
        let err = state
            .apply(StateChange::set(
                PropertyKey::ItemParent(ItemId::new("missing")),
                Value::Parent(Parent::Player),
            ))
            .unwrap_err();
        assert_eq!(err, ApplyError::UnknownItem(ItemId::new("missing")));
    }

    #[test]
    fn apply_rejects_old_value_mismatch() {
        let mut state = build_test_state();
        let err = state
            .apply(StateChange::compare_and_set(
                PropertyKey::ItemParent(ItemId::new("lamp")),
                Value::Parent(Parent::Player),
                Value::Parent(Parent::Nowhere),
            ))
            .unwrap_err();
        assert!(matches!(err, ApplyError::OldValueMismatch { .. }));
    }

    #[test]
    fn apply_rejects_type_mismatch() {
        let mut state = build_test_state();
        state
            .apply(StateChange::set(
                PropertyKey::ItemProperty(ItemId::new("lamp"), PropertyId::new("on")),
                Value::Bool(true),
            ))
            .unwrap();
        let err = state
            .apply(StateChange::set(
                PropertyKey::ItemProperty(ItemId::new("lamp"), PropertyId::new("on")),
                Value::Int(1),
            ))
            .unwrap_err();
        assert!(matches!(err, ApplyError::TypeMismatch { .. }));
    }

    #[test]
    fn apply_rejects_self_parent() {
        let mut state = build_test_state();
        let err = state
            .apply(StateChange::set(
                PropertyKey::ItemParent(ItemId::new("lamp")),
                Value::Parent(Parent::Item(ItemId::new("lamp"))),
            ))
            .unwrap_err();
        assert_eq!(err, ApplyError::SelfParent(ItemId::new("lamp")));
    }

    #[test]
    fn apply_rejects_parent_cycle() {
        let mut state = build_test_state();
        let box_item = build_test_item("box", Parent::Item(ItemId::new("lamp")));
        state.items.insert(box_item.id.clone(), box_item);
        let err = state
            .apply(StateChange::set(
                PropertyKey::ItemParent(ItemId::new("lamp")),
                Value::Parent(Parent::Item(ItemId::new("box"))),
            ))
            .unwrap_err();
        assert_eq!(err, ApplyError::ParentCycle(ItemId::new("lamp")));
    }

    #[test]
    fn failed_apply_all_leaves_no_partial_writes() {
        let mut state = build_test_state();
        let before = state.item(&ItemId::new("lamp")).unwrap().parent.clone();
        let changes = vec![
            StateChange::set(PropertyKey::ItemParent(ItemId::new("lamp")), Value::Parent(Parent::Player)),
            StateChange::set(PropertyKey::ItemParent(ItemId::new("missing")), Value::Parent(Parent::Player)),
        ];
        let err = state.apply_all(changes).unwrap_err();
        assert_eq!(err, ApplyError::UnknownItem(ItemId::new("missing")));
        assert_eq!(state.item(&ItemId::new("lamp")).unwrap().parent, before);
    }

    #[test]
    fn rewind_restores_prior_state_exactly() {
        let mut state = build_test_state();
        let checkpoint = state.change_log_len();
        state
            .apply(StateChange::compare_and_set(
                PropertyKey::ItemParent(ItemId::new("lamp")),
                Value::Parent(Parent::Location(LocationId::new("start"))),
                Value::Parent(Parent::Player),
            ))
            .unwrap();
        state.rewind_to(checkpoint);
        assert_eq!(
            state.item(&ItemId::new("lamp")).unwrap().parent,
            Parent::Location(LocationId::new("start"))
        );
        assert_eq!(state.change_log_len(), checkpoint);
    }

    #[test]
    fn fuses_decrement_and_expire_in_ascending_order() {
        let mut state = build_test_state();
        state.fuse_defs.insert(
            FuseId::new("alpha"),
            FuseDef { id: FuseId::new("alpha"), initial_turns: 1, on_expire: "alpha_expire".into() },
        );
        state.fuse_defs.insert(
            FuseId::new("beta"),
            FuseDef { id: FuseId::new("beta"), initial_turns: 1, on_expire: "beta_expire".into() },
        );
        state.apply(StateChange::set(PropertyKey::AddFuse(FuseId::new("beta"), 1), Value::Undefined)).unwrap();
        state.apply(StateChange::set(PropertyKey::AddFuse(FuseId::new("alpha"), 1), Value::Undefined)).unwrap();
        let expired = state.decrement_fuses();
        assert_eq!(expired, vec![FuseId::new("alpha"), FuseId::new("beta")]);
        assert!(state.active_fuses().is_empty());
    }

    #[test]
    fn save_data_round_trip_preserves_world_but_resets_log() {
        let mut state = build_test_state();
        state
            .apply(StateChange::set(PropertyKey::ItemParent(ItemId::new("lamp")), Value::Parent(Parent::Player)))
            .unwrap();
        let snapshot = state.to_save_data(99);
        assert_eq!(snapshot.version, SAVE_FORMAT_VERSION);
        assert_eq!(snapshot.rng_state, 99);

        let restored = GameState::from_save_data(snapshot, BTreeMap::new(), BTreeMap::new());
        assert_eq!(restored.item(&ItemId::new("lamp")).unwrap().parent, Parent::Player);
        assert_eq!(restored.change_log_len(), 0);
    }
}
