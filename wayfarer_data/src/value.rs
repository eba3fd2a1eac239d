//! The tagged union used as the payload of every property in the world.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use variantly::Variantly;

use crate::ids::{ItemId, LocationId};

/// A single directional connection out of a location.
///
/// `destination` absent means the exit is blocked-only (scenery direction
/// with no room on the other side); `blocked_message` overrides the default
/// "You can't go that way" narration; `door` names the item that gates the
/// exit, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exit {
    pub direction: Direction,
    pub destination: Option<LocationId>,
    pub blocked_message: Option<String>,
    pub door: Option<ItemId>,
}

/// The twelve compass/vertical/in-out directions a location may expose an
/// exit on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Northeast,
    Northwest,
    Southeast,
    Southwest,
    Up,
    Down,
    In,
    Out,
}

impl Direction {
    /// All directions, in a fixed canonical order used wherever exits must
    /// be enumerated deterministically.
    pub const ALL: [Direction; 12] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Northeast,
        Direction::Northwest,
        Direction::Southeast,
        Direction::Southwest,
        Direction::Up,
        Direction::Down,
        Direction::In,
        Direction::Out,
    ];
}

/// The containment relation for an item: where it physically is.
///
/// An item's identity never changes; only its `Parent` does. `Nowhere` is
/// used for items that exist in the blueprint but have been removed from
/// play (e.g. consumed, destroyed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Variantly)]
pub enum Parent {
    Location(LocationId),
    Item(ItemId),
    Player,
    Nowhere,
}

/// Uniform payload type for every entry in a property bag.
///
/// Equality is always structural. A missing boolean property is treated as
/// `false` by accessors, not represented as a variant here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Variantly)]
pub enum Value {
    Bool(bool),
    Int(i64),
    String(String),
    StringSet(BTreeSet<String>),
    ItemId(ItemId),
    ItemIdSet(BTreeSet<ItemId>),
    LocationId(LocationId),
    Parent(Parent),
    ExitSet(Vec<Exit>),
    Undefined,
}

impl Value {
    /// The `Bool` value, treating any non-`Bool` (including `Undefined`) as
    /// `false` per spec.md §3's "absent means false" rule.
    pub fn as_bool_or_false(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    /// The `Int` value, defaulting to zero for any non-`Int` value.
    pub fn as_int_or_zero(&self) -> i64 {
        match self {
            Value::Int(n) => *n,
            _ => 0,
        }
    }

    /// The `String` value, defaulting to an empty string for any other kind.
    pub fn as_str_or_empty(&self) -> &str {
        match self {
            Value::String(s) => s.as_str(),
            _ => "",
        }
    }

    /// The `StringSet` value, defaulting to an empty set.
    pub fn as_string_set_or_empty(&self) -> BTreeSet<String> {
        match self {
            Value::StringSet(set) => set.clone(),
            _ => BTreeSet::new(),
        }
    }

    /// The `ItemIdSet` value, defaulting to an empty set.
    pub fn as_item_id_set_or_empty(&self) -> BTreeSet<ItemId> {
        match self {
            Value::ItemIdSet(set) => set.clone(),
            _ => BTreeSet::new(),
        }
    }

    /// A short, stable label naming the kind of this value, for use in
    /// `TypeMismatch` narration and logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::String(_) => "string",
            Value::StringSet(_) => "string-set",
            Value::ItemId(_) => "item-id",
            Value::ItemIdSet(_) => "item-id-set",
            Value::LocationId(_) => "location-id",
            Value::Parent(_) => "parent",
            Value::ExitSet(_) => "exit-set",
            Value::Undefined => "undefined",
        }
    }

    /// Whether `self` and `other` are the same variant, ignoring payload.
    /// Used by `GameState::apply`'s type-validation step.
    pub fn same_kind(&self, other: &Value) -> bool {
        self.kind_name() == other.kind_name()
    }
}
