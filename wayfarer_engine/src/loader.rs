//! Blueprint loading: turning an authored [`GameDef`] (plus optional
//! behavioural overrides) into a runnable [`GameBlueprint`] and the
//! [`GameState`]/[`Vocabulary`] pair the engine actually runs against.
//!
//! Grounded in `amble_data::validate` and `amble_engine::loader`: read,
//! parse, validate, then materialize runtime entities from the declarative
//! definitions.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{error, info};
use thiserror::Error;
use wayfarer_data::{DaemonDef, DaemonId, FuseDef, FuseId, GameDef, ItemDef, LocationDef, PropertyId, Value, ValidationError};

use crate::blueprint::{GameBlueprint, GameBlueprintBuilder};
use crate::state::GameState;
use crate::vocabulary::Vocabulary;
use crate::world::{Item, Location, Player, PropertyBag};

/// Everything that can go wrong constructing a runnable blueprint, mapped
/// to process exit code 2 per spec.md §6.
#[derive(Debug, Error)]
pub enum BlueprintError {
    #[error("reading blueprint file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing blueprint file {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: Box<toml::de::Error>,
    },
    #[error("blueprint failed validation: {0:?}")]
    Validation(Vec<ValidationError>),
}

/// A fully materialized, runnable game: world state, vocabulary, and
/// behaviour, ready to hand to [`crate::engine::Engine`].
pub struct LoadedGame {
    pub state: GameState,
    pub vocab: Vocabulary,
    pub blueprint: GameBlueprint,
}

/// Load a [`GameDef`] from a `toml` file, validate it, and assemble a
/// [`LoadedGame`] with the default handler set and no author hooks.
pub fn load_blueprint(path: &Path) -> Result<LoadedGame, BlueprintError> {
    load_blueprint_with(path, GameBlueprintBuilder::new())
}

/// As [`load_blueprint`], but with a caller-supplied [`GameBlueprintBuilder`]
/// carrying handler overrides, event hooks, a message provider, and an RNG
/// seed — the behavioural half a `toml` file can't express (spec.md §6).
pub fn load_blueprint_with(path: &Path, builder: GameBlueprintBuilder) -> Result<LoadedGame, BlueprintError> {
    let def = load_game_def(path)?;
    validate_def(&def)?;
    info!("loaded blueprint \"{}\" ({} items, {} locations)", def.title, def.items.len(), def.locations.len());

    let (state, vocab) = materialize(&def);
    let blueprint = builder.build(def);
    Ok(LoadedGame { state, vocab, blueprint })
}

fn load_game_def(path: &Path) -> Result<GameDef, BlueprintError> {
    let raw = fs::read_to_string(path).map_err(|source| BlueprintError::Io { path: path.display().to_string(), source })?;
    toml::from_str(&raw).map_err(|source| BlueprintError::Toml { path: path.display().to_string(), source: Box::new(source) })
}

fn validate_def(def: &GameDef) -> Result<(), BlueprintError> {
    let errors = wayfarer_data::validate_all(def);
    if errors.is_empty() {
        Ok(())
    } else {
        error!("blueprint validation failed with {} error(s)", errors.len());
        Err(BlueprintError::Validation(errors))
    }
}

/// Build runtime `Item`/`Location`/`Player` entities plus the fuse/daemon
/// definition tables, flattening each `ItemFlags`/`LocationFlags` field
/// into the entity's property bag so the rest of the engine reads flags
/// uniformly through `Value::Bool` (spec.md §3).
fn materialize(def: &GameDef) -> (GameState, Vocabulary) {
    let mut items = BTreeMap::new();
    for item_def in &def.items {
        items.insert(item_def.id.clone(), build_item(item_def));
    }

    let mut locations = BTreeMap::new();
    for loc_def in &def.locations {
        locations.insert(loc_def.id.clone(), build_location(loc_def));
    }

    let player = Player {
        location: def.player.starting_location.clone(),
        moves: 0,
        score: 0,
        carrying_capacity: def.player.carrying_capacity,
        sheet: def.player.sheet.clone(),
        properties: PropertyBag::new(),
    };

    let fuse_defs: BTreeMap<FuseId, FuseDef> = def.fuses.iter().map(|f| (f.id.clone(), f.clone())).collect();
    let daemon_defs: BTreeMap<DaemonId, DaemonDef> = def.daemons.iter().map(|d| (d.id.clone(), d.clone())).collect();

    let mut state = GameState::new(items, locations, player, fuse_defs, daemon_defs);
    state
        .apply(crate::state::StateChange::set(
            crate::state::PropertyKey::GameSpecific("maximum_score".into()),
            Value::Int(def.maximum_score),
        ))
        .expect("seeding maximum_score on a freshly built state cannot fail");
    let vocab = Vocabulary::from_def(def);
    (state, vocab)
}

fn build_item(def: &ItemDef) -> Item {
    let mut properties = PropertyBag::new();
    let f = &def.flags;
    for (key, value) in [
        ("container", f.container),
        ("surface", f.surface),
        ("openable", f.openable),
        ("open", f.open),
        ("lockable", f.lockable),
        ("locked", f.locked),
        ("takable", f.takable),
        ("wearable", f.wearable),
        ("worn", f.worn),
        ("light_source", f.light_source),
        ("on", f.on),
        ("transparent", f.transparent),
        ("scenery", f.scenery),
        ("invisible", f.invisible),
        ("readable", f.readable),
        ("touched", f.touched),
        ("door", f.door),
        ("person", f.person),
        ("plural", f.plural),
        ("vowel_start", f.vowel_start),
        ("suppress_article", f.suppress_article),
        ("suppress_description", f.suppress_description),
        ("burning", f.burning),
        ("flammable", f.flammable),
        ("edible", f.edible),
        ("drinkable", f.drinkable),
        ("weapon", f.weapon),
        ("climbable", f.climbable),
        ("tool", f.tool),
        ("fixed", f.fixed),
    ] {
        properties.insert(PropertyId::new(key), Value::Bool(value));
    }

    Item {
        id: def.id.clone(),
        name: def.name.clone(),
        adjectives: def.adjectives.clone(),
        synonyms: def.synonyms.clone(),
        short_description: def.short_description.clone(),
        first_description: def.first_description.clone(),
        long_description: def.long_description.clone(),
        read_text: def.read_text.clone(),
        capacity: def.capacity,
        size: def.size,
        parent: def.parent.clone(),
        lock_key: def.lock_key.clone(),
        properties,
    }
}

fn build_location(def: &LocationDef) -> Location {
    let mut properties = PropertyBag::new();
    let f = &def.flags;
    for (key, value) in [
        ("inherently_lit", f.inherently_lit),
        ("outside", f.outside),
        ("visited", f.visited),
        ("changed", f.changed),
        ("is_water", f.is_water),
        ("is_land", f.is_land),
        ("sacred", f.sacred),
        ("omit_article", f.omit_article),
    ] {
        properties.insert(PropertyId::new(key), Value::Bool(value));
    }

    let exits = def
        .exits
        .iter()
        .map(|e| wayfarer_data::Exit {
            direction: e.direction,
            destination: e.destination.clone(),
            blocked_message: e.blocked_message.clone(),
            door: e.door.clone(),
        })
        .collect();

    Location {
        id: def.id.clone(),
        name: def.name.clone(),
        description: def.description.clone(),
        exits,
        scenery_items: def.scenery_items.clone(),
        properties,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::PropertyView;
    use wayfarer_data::{ItemFlags, LocationFlags, Parent, PlayerDef};

    fn sample_def() -> GameDef {
        GameDef {
            title: "Sample".into(),
            abbreviated_title: "S".into(),
            introduction: "Welcome.".into(),
            release: "1".into(),
            maximum_score: 10,
            player: PlayerDef { starting_location: wayfarer_data::LocationId::new("start"), carrying_capacity: 10, sheet: Default::default() },
            items: vec![ItemDef {
                id: wayfarer_data::ItemId::new("lamp"),
                name: "lamp".into(),
                adjectives: Default::default(),
                synonyms: Default::default(),
                short_description: "a lamp".into(),
                first_description: None,
                long_description: None,
                read_text: None,
                capacity: 0,
                size: 1,
                parent: Parent::Location(wayfarer_data::LocationId::new("start")),
                flags: ItemFlags { light_source: true, takable: true, ..Default::default() },
                lock_key: None,
            }],
            locations: vec![LocationDef {
                id: wayfarer_data::LocationId::new("start"),
                name: "Start".into(),
                description: "a room".into(),
                exits: vec![],
                scenery_items: Default::default(),
                flags: LocationFlags { inherently_lit: true, ..Default::default() },
            }],
            verbs: vec![],
            fuses: vec![],
            daemons: vec![],
        }
    }

    #[test]
    fn materialize_flattens_flags_into_property_bags() {
        let (state, vocab) = materialize(&sample_def());
        let lamp = state.item(&wayfarer_data::ItemId::new("lamp")).unwrap();
        assert!(lamp.flag(&PropertyId::new("light_source")));
        assert!(lamp.flag(&PropertyId::new("takable")));
        assert!(!lamp.flag(&PropertyId::new("open")));

        let start = state.location(&wayfarer_data::LocationId::new("start")).unwrap();
        assert!(start.flag(&PropertyId::new("inherently_lit")));

        assert!(vocab.items_for_noun("lamp").contains(&wayfarer_data::ItemId::new("lamp")));
    }

    #[test]
    fn load_blueprint_with_invalid_toml_path_reports_io_error() {
        let err = load_blueprint(Path::new("/nonexistent/game.toml")).unwrap_err();
        assert!(matches!(err, BlueprintError::Io { .. }));
    }

    #[test]
    fn load_blueprint_rejects_a_def_that_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.toml");
        let mut def = sample_def();
        def.player.starting_location = wayfarer_data::LocationId::new("nowhere");
        let toml_src = toml::to_string(&def).unwrap();
        fs::write(&path, toml_src).unwrap();

        let err = load_blueprint(&path).unwrap_err();
        assert!(matches!(err, BlueprintError::Validation(_)));
    }

    #[test]
    fn load_blueprint_succeeds_for_a_valid_def() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.toml");
        fs::write(&path, toml::to_string(&sample_def()).unwrap()).unwrap();

        let loaded = load_blueprint(&path).unwrap();
        assert_eq!(loaded.blueprint.def.title, "Sample");
        assert!(loaded.state.item(&wayfarer_data::ItemId::new("lamp")).is_some());
    }
}
