//! Runtime world entities: `Item`, `Location`, and `Player`.
//!
//! Each is a property bag keyed by [`PropertyId`], per spec.md §3. Flags
//! declared in a blueprint's [`ItemFlags`]/[`LocationFlags`] are flattened
//! into the bag as boolean properties at load time (see `crate::loader`),
//! so the rest of the engine reads everything — author-defined custom
//! properties included — through the same `Value` accessors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wayfarer_data::{CharacterSheet, Exit, ItemId, LocationId, Parent, PropertyId, Value};

/// A `PropertyId -> Value` map, shared by items, locations, and the player.
pub type PropertyBag = BTreeMap<PropertyId, Value>;

/// Read accessors shared by every property-bag-backed entity.
///
/// Missing keys yield type-appropriate defaults per spec.md §3, except
/// where a caller explicitly needs to distinguish "absent" from "present
/// but false/empty" (`get_raw`).
pub trait PropertyView {
    fn properties(&self) -> &PropertyBag;

    fn get_raw(&self, key: &PropertyId) -> Option<&Value> {
        self.properties().get(key)
    }

    fn flag(&self, key: &PropertyId) -> bool {
        self.get_raw(key).map(Value::as_bool_or_false).unwrap_or(false)
    }

    fn int(&self, key: &PropertyId) -> i64 {
        self.get_raw(key).map(Value::as_int_or_zero).unwrap_or(0)
    }

    fn string(&self, key: &PropertyId) -> String {
        self.get_raw(key).map(|v| v.as_str_or_empty().to_string()).unwrap_or_default()
    }
}

/// A physical or abstract thing in the world: the unit of interaction for
/// nearly every verb.
///
/// `name`, `adjectives`, and `synonyms` are copied into the vocabulary at
/// load time and also kept here so an item's own description logic can
/// refer to them without a vocabulary lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub adjectives: std::collections::BTreeSet<String>,
    pub synonyms: std::collections::BTreeSet<String>,
    pub short_description: String,
    pub first_description: Option<String>,
    pub long_description: Option<String>,
    pub read_text: Option<String>,
    pub capacity: i64,
    pub size: i64,
    pub parent: Parent,
    pub lock_key: Option<ItemId>,
    pub properties: PropertyBag,
}

impl PropertyView for Item {
    fn properties(&self) -> &PropertyBag {
        &self.properties
    }
}

impl Item {
    /// The description shown the first time the item is examined, falling
    /// back to the long description and then the short description.
    pub fn description_for_examine(&self) -> &str {
        self.long_description
            .as_deref()
            .or(self.first_description.as_deref())
            .unwrap_or(&self.short_description)
    }
}

/// A room or abstract place the player and items can occupy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub description: String,
    pub exits: Vec<Exit>,
    pub scenery_items: std::collections::BTreeSet<ItemId>,
    pub properties: PropertyBag,
}

impl PropertyView for Location {
    fn properties(&self) -> &PropertyBag {
        &self.properties
    }
}

impl Location {
    /// The exit in a given direction, if the location defines one.
    pub fn exit(&self, direction: wayfarer_data::Direction) -> Option<&Exit> {
        self.exits.iter().find(|e| e.direction == direction)
    }
}

/// The player: current location, move/score counters, carrying capacity,
/// and a character sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub location: LocationId,
    pub moves: u64,
    pub score: i64,
    pub carrying_capacity: i64,
    pub sheet: CharacterSheet,
    pub properties: PropertyBag,
}

impl PropertyView for Player {
    fn properties(&self) -> &PropertyBag {
        &self.properties
    }
}
