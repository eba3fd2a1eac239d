//! Shared blueprint-building helpers for the end-to-end scenario tests in
//! this directory (spec.md §8's "concrete end-to-end scenarios"). Each
//! test file builds its own small [`GameDef`] with these builders rather
//! than sharing one big fixture, since the scenarios don't overlap much.

use std::collections::BTreeSet;
use std::path::PathBuf;

use wayfarer_data::{
    CharacterSheet, Direction, ExitDef, GameDef, ItemDef, ItemFlags, LocationDef, LocationFlags,
    Parent, PlayerDef,
};
use wayfarer_engine::io::ScriptedSink;
use wayfarer_engine::{loader, Engine, GameBlueprintBuilder};

#[allow(dead_code)]
pub fn location(id: &str, name: &str, description: &str, lit: bool, exits: Vec<ExitDef>) -> LocationDef {
    LocationDef {
        id: wayfarer_data::LocationId::new(id),
        name: name.into(),
        description: description.into(),
        exits,
        scenery_items: BTreeSet::new(),
        flags: LocationFlags { inherently_lit: lit, ..Default::default() },
    }
}

#[allow(dead_code)]
pub fn exit(direction: Direction, destination: &str) -> ExitDef {
    ExitDef { direction, destination: Some(wayfarer_data::LocationId::new(destination)), blocked_message: None, door: None }
}

#[allow(dead_code)]
pub fn item(id: &str, name: &str, location_id: &str, flags: ItemFlags) -> ItemDef {
    ItemDef {
        id: wayfarer_data::ItemId::new(id),
        name: name.into(),
        adjectives: BTreeSet::new(),
        synonyms: BTreeSet::new(),
        short_description: format!("a {name}"),
        first_description: None,
        long_description: None,
        read_text: None,
        capacity: 10,
        size: 1,
        parent: Parent::Location(wayfarer_data::LocationId::new(location_id)),
        flags,
        lock_key: None,
    }
}

#[allow(dead_code)]
pub fn item_with_adjective(id: &str, name: &str, adjective: &str, location_id: &str, flags: ItemFlags) -> ItemDef {
    ItemDef { adjectives: BTreeSet::from([adjective.to_string()]), ..item(id, name, location_id, flags) }
}

#[allow(dead_code)]
pub fn blank_def(start: &str, locations: Vec<LocationDef>, items: Vec<ItemDef>) -> GameDef {
    GameDef {
        title: "Test".into(),
        abbreviated_title: "T".into(),
        introduction: String::new(),
        release: "1".into(),
        maximum_score: 0,
        player: PlayerDef {
            starting_location: wayfarer_data::LocationId::new(start),
            carrying_capacity: 20,
            sheet: CharacterSheet::default(),
        },
        items,
        locations,
        verbs: vec![],
        fuses: vec![],
        daemons: vec![],
    }
}

/// Write `def` to a temp `toml` file and build an [`Engine`] around it with
/// the default handler set plus any extra behaviour `builder` carries
/// (event handlers for fuses/daemons, message overrides, an RNG seed).
#[allow(dead_code)]
pub fn engine_with(def: &GameDef, builder: GameBlueprintBuilder) -> Engine<ScriptedSink> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.toml");
    std::fs::write(&path, toml::to_string(def).unwrap()).unwrap();
    let loaded = loader::load_blueprint_with(&path, builder).unwrap();
    let save_dir: PathBuf = dir.path().join("saves");
    std::mem::forget(dir);
    Engine::new(loaded.state, loaded.blueprint, loaded.vocab, ScriptedSink::new(Vec::<String>::new()), save_dir)
}

#[allow(dead_code)]
pub fn engine(def: &GameDef) -> Engine<ScriptedSink> {
    engine_with(def, GameBlueprintBuilder::new())
}
