//! Declarative, serializable blueprint data.
//!
//! These types describe the *content* half of a game blueprint: the rooms,
//! items, and starting conditions an author writes down, typically as a
//! `toml` document loaded at startup. The *behavioural* half (handler
//! overrides, item/location computers, the message provider, and the RNG)
//! is supplied in code by the embedding binary and lives in the engine
//! crate's `GameBlueprint`, since closures and trait objects are not
//! serializable data.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::{DaemonId, FuseId, ItemId, LocationId, VerbId};
use crate::value::{Direction, Parent};

/// An exit definition as authored in a blueprint, before it is turned into
/// runtime `Exit` values attached to a `Location`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitDef {
    pub direction: Direction,
    #[serde(default)]
    pub destination: Option<LocationId>,
    #[serde(default)]
    pub blocked_message: Option<String>,
    #[serde(default)]
    pub door: Option<ItemId>,
}

/// The authored shape of an item, prior to being instantiated into
/// `GameState`'s item table.
///
/// Field defaults mirror spec.md §3: flags default to `false`, sets default
/// to empty, and `parent` must be one of `location`/`item`/`player`/
/// `nowhere` (an author who omits it gets `Nowhere`, i.e. not yet in play).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub adjectives: BTreeSet<String>,
    #[serde(default)]
    pub synonyms: BTreeSet<String>,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub first_description: Option<String>,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default)]
    pub read_text: Option<String>,
    #[serde(default)]
    pub capacity: i64,
    #[serde(default)]
    pub size: i64,
    #[serde(default = "Parent::default_nowhere")]
    pub parent: Parent,
    #[serde(default)]
    pub flags: ItemFlags,
    #[serde(default)]
    pub lock_key: Option<ItemId>,
}

impl Parent {
    fn default_nowhere() -> Parent {
        Parent::Nowhere
    }
}

/// The closed set of item flags named in spec.md §3.
///
/// Kept as a dedicated struct (rather than a generic `PropertyId -> Value`
/// map) for the authored form only: `loader` flattens each field into the
/// runtime item's property bag so the rest of the engine reads flags
/// uniformly through `Value::Bool`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemFlags {
    pub container: bool,
    pub surface: bool,
    pub openable: bool,
    pub open: bool,
    pub lockable: bool,
    pub locked: bool,
    pub takable: bool,
    pub wearable: bool,
    pub worn: bool,
    pub light_source: bool,
    pub on: bool,
    pub transparent: bool,
    pub scenery: bool,
    pub invisible: bool,
    pub readable: bool,
    pub touched: bool,
    pub door: bool,
    pub person: bool,
    pub plural: bool,
    pub vowel_start: bool,
    pub suppress_article: bool,
    pub suppress_description: bool,
    pub burning: bool,
    pub flammable: bool,
    pub edible: bool,
    pub drinkable: bool,
    pub weapon: bool,
    pub climbable: bool,
    pub tool: bool,
    pub fixed: bool,
}

/// The authored shape of a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDef {
    pub id: LocationId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub exits: Vec<ExitDef>,
    #[serde(default)]
    pub scenery_items: BTreeSet<ItemId>,
    #[serde(default)]
    pub flags: LocationFlags,
}

/// The closed set of location flags named in spec.md §3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationFlags {
    pub inherently_lit: bool,
    pub outside: bool,
    pub visited: bool,
    pub changed: bool,
    pub is_water: bool,
    pub is_land: bool,
    pub sacred: bool,
    pub omit_article: bool,
}

/// A one-shot countdown definition. `on_expire` names a verb-style handler
/// id that the engine resolves to an `on_expire` action when the fuse's
/// turn count reaches zero; it is not itself a `VerbId`, but reuses the
/// same string-newtype shape for lookups in the handler registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuseDef {
    pub id: FuseId,
    pub initial_turns: u32,
    pub on_expire: String,
}

/// A periodic background task definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonDef {
    pub id: DaemonId,
    pub period: u32,
    pub on_tick: String,
}

/// The player's starting condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDef {
    pub starting_location: LocationId,
    #[serde(default)]
    pub carrying_capacity: i64,
    #[serde(default)]
    pub sheet: CharacterSheet,
}

/// A minimal attributes/derived-stats sheet, per spec.md §3's "character
/// sheet (attributes, derived stats)". Kept open-ended via a string-keyed
/// map since the exact attribute names are game content, not engine data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSheet {
    #[serde(default)]
    pub attributes: std::collections::BTreeMap<String, i64>,
    #[serde(default)]
    pub derived: std::collections::BTreeMap<String, i64>,
}

/// A verb's accepted syntax, used by the vocabulary to drive parsing.
/// See spec.md §4.2: a sequence of slot matchers over verb/dobj/iobj/prep/
/// particle/direction tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxRuleDef {
    pub slots: Vec<SlotDef>,
}

/// One slot within a `SyntaxRuleDef`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotDef {
    DirectObject { requires_reachable: bool },
    IndirectObject { requires_reachable: bool, requires_container: bool },
    Preposition(Option<String>),
    Particle(String),
    Direction,
}

/// A verb's full vocabulary entry: its canonical id, synonyms, accepted
/// syntax rules, and whether it demands a lit location to run at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbDef {
    pub id: VerbId,
    #[serde(default)]
    pub synonyms: BTreeSet<String>,
    pub syntax: Vec<SyntaxRuleDef>,
    #[serde(default)]
    pub requires_light: bool,
}

/// The declarative, author-written half of a game blueprint.
///
/// This is the shape a `toml`/`ron` content file parses into; see
/// `wayfarer_engine::loader` for how it is combined with handler overrides,
/// computed-property callbacks, a message provider, and an RNG to produce
/// a runnable `GameBlueprint`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDef {
    pub title: String,
    pub abbreviated_title: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub release: String,
    #[serde(default)]
    pub maximum_score: i64,
    pub player: PlayerDef,
    pub items: Vec<ItemDef>,
    pub locations: Vec<LocationDef>,
    #[serde(default)]
    pub verbs: Vec<VerbDef>,
    #[serde(default)]
    pub fuses: Vec<FuseDef>,
    #[serde(default)]
    pub daemons: Vec<DaemonDef>,
}

fn verb(id: &str, synonyms: &[&str], syntax: Vec<SyntaxRuleDef>) -> VerbDef {
    VerbDef {
        id: VerbId::new(id),
        synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        syntax,
        requires_light: false,
    }
}

fn rule(slots: Vec<SlotDef>) -> SyntaxRuleDef {
    SyntaxRuleDef { slots }
}

fn bare() -> SyntaxRuleDef {
    rule(vec![])
}

fn dobj() -> SlotDef {
    SlotDef::DirectObject { requires_reachable: true }
}

fn iobj(requires_container: bool) -> SlotDef {
    SlotDef::IndirectObject { requires_reachable: true, requires_container }
}

/// The standard commands named in spec.md §6, available in every game
/// without the author having to hand-write a `VerbDef` for each one.
///
/// [`crate::GameDef::verbs`] is layered on top of this list by id (see
/// `wayfarer_engine::vocabulary::Vocabulary::from_def`), so a blueprint can
/// still add synonyms or replace a standard verb's grammar outright by
/// declaring a `VerbDef` with the same id.
pub fn standard_verbs() -> Vec<VerbDef> {
    vec![
        verb("look", &["l"], vec![bare()]),
        verb("examine", &["x", "inspect"], vec![rule(vec![dobj()])]),
        verb("inventory", &["i"], vec![bare()]),
        verb("take", &["get", "grab"], vec![rule(vec![dobj()])]),
        verb("drop", &[], vec![rule(vec![dobj()])]),
        verb(
            "put-in",
            &["put", "place", "insert"],
            vec![
                rule(vec![dobj(), SlotDef::Preposition(Some("in".into())), iobj(true)]),
                rule(vec![dobj(), SlotDef::Preposition(Some("into".into())), iobj(true)]),
            ],
        ),
        verb(
            "put-on",
            &["put", "place"],
            vec![
                rule(vec![dobj(), SlotDef::Preposition(Some("on".into())), iobj(false)]),
                rule(vec![dobj(), SlotDef::Preposition(Some("onto".into())), iobj(false)]),
            ],
        ),
        verb("open", &[], vec![rule(vec![dobj()])]),
        verb("close", &["shut"], vec![rule(vec![dobj()])]),
        verb("lock", &[], vec![rule(vec![dobj(), SlotDef::Preposition(Some("with".into())), iobj(false)])]),
        verb("unlock", &[], vec![rule(vec![dobj(), SlotDef::Preposition(Some("with".into())), iobj(false)])]),
        verb("wear", &["don"], vec![rule(vec![dobj()])]),
        verb("remove", &["doff"], vec![rule(vec![dobj()])]),
        verb(
            "turn-on",
            &["turn", "light"],
            vec![
                rule(vec![SlotDef::Particle("on".into()), dobj()]),
                rule(vec![dobj(), SlotDef::Particle("on".into())]),
                rule(vec![dobj()]),
            ],
        ),
        verb(
            "turn-off",
            &["turn", "extinguish"],
            vec![
                rule(vec![SlotDef::Particle("off".into()), dobj()]),
                rule(vec![dobj(), SlotDef::Particle("off".into())]),
            ],
        ),
        verb("read", &[], vec![rule(vec![dobj()])]),
        verb("go", &[], vec![rule(vec![SlotDef::Direction])]),
        verb("enter", &[], vec![bare()]),
        verb("exit", &[], vec![bare()]),
        verb("smell", &["sniff"], vec![bare(), rule(vec![dobj()])]),
        verb(
            "listen",
            &[],
            vec![bare(), rule(vec![SlotDef::Preposition(Some("to".into())), dobj()])],
        ),
        verb("taste", &[], vec![bare(), rule(vec![dobj()])]),
        verb("touch", &["feel"], vec![bare(), rule(vec![dobj()])]),
        verb("eat", &[], vec![rule(vec![dobj()])]),
        verb("drink", &[], vec![rule(vec![dobj()])]),
        verb("wait", &["z"], vec![bare()]),
        verb("score", &[], vec![bare()]),
        verb("quit", &["q"], vec![bare()]),
        verb("help", &[], vec![bare()]),
        verb("verbose", &[], vec![bare()]),
        verb("brief", &[], vec![bare()]),
        verb("think-about", &["think"], vec![bare(), rule(vec![SlotDef::Particle("about".into()), dobj()])]),
    ]
}
