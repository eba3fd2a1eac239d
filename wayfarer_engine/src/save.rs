//! Save/restore: spec.md §6's persisted-state requirement.
//!
//! Grounded in the teacher's `save_files.rs`: `ron`-encoded save files named
//! by slot, a status enum that distinguishes a clean load from a version
//! mismatch or a corrupted file, and slot discovery by scanning a directory
//! rather than keeping an index file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::state::{GameState, SaveData, SAVE_FORMAT_VERSION};

const SAVE_EXTENSION: &str = "ron";

/// Why a discovered save file can or can't be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveFileStatus {
    Ready,
    VersionMismatch { save_version: u32, current_version: u32 },
    Corrupted { message: String },
}

/// The result of attempting to load one save slot.
pub struct LoadedSave {
    pub status: SaveFileStatus,
    pub data: Option<SaveData>,
}

fn slot_path(dir: &Path, slot: &str) -> PathBuf {
    dir.join(format!("{slot}.{SAVE_EXTENSION}"))
}

/// Serialize `state` to `dir/slot.ron`, creating `dir` if it doesn't exist.
/// Returns the path written.
pub fn save_game(dir: &Path, slot: &str, state: &GameState, rng_state: u64) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating save directory {}", dir.display()))?;
    let data = state.to_save_data(rng_state);
    let encoded = ron::to_string(&data).context("serializing save data")?;
    let path = slot_path(dir, slot);
    fs::write(&path, encoded).with_context(|| format!("writing save file {}", path.display()))?;
    info!("saved game to {} (slot \"{slot}\")", path.display());
    Ok(path)
}

/// Load and version-check `dir/slot.ron`. A missing file, a version
/// mismatch, and a parse failure are all reported through
/// [`SaveFileStatus`] rather than an `Err`; `Err` is reserved for I/O
/// failures reading the directory or file itself.
pub fn load_game(dir: &Path, slot: &str) -> Result<LoadedSave> {
    let path = slot_path(dir, slot);
    let raw = fs::read_to_string(&path).with_context(|| format!("reading save file {}", path.display()))?;
    match ron::from_str::<SaveData>(&raw) {
        Ok(data) if data.version == SAVE_FORMAT_VERSION => {
            Ok(LoadedSave { status: SaveFileStatus::Ready, data: Some(data) })
        }
        Ok(data) => {
            warn!("save \"{slot}\" has version {} but engine is version {SAVE_FORMAT_VERSION}", data.version);
            Ok(LoadedSave {
                status: SaveFileStatus::VersionMismatch {
                    save_version: data.version,
                    current_version: SAVE_FORMAT_VERSION,
                },
                data: None,
            })
        }
        Err(err) => {
            warn!("save \"{slot}\" failed to parse: {err}");
            Ok(LoadedSave { status: SaveFileStatus::Corrupted { message: err.to_string() }, data: None })
        }
    }
}

/// List save slots present in `dir`, sorted by name. An absent directory
/// reports zero slots rather than an error — nothing has been saved yet.
pub fn list_saves(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut slots = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry.with_context(|| format!("enumerating {}", dir.display()))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some(SAVE_EXTENSION) {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                slots.push(stem.to_string());
            }
        }
    }
    slots.sort();
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Item, Location, Player};
    use std::collections::BTreeMap;
    use wayfarer_data::{ItemId, LocationId, Parent};

    fn sample_state() -> GameState {
        let lamp = Item {
            id: ItemId::new("lamp"),
            name: "lamp".into(),
            adjectives: Default::default(),
            synonyms: Default::default(),
            short_description: "a lamp".into(),
            first_description: None,
            long_description: None,
            read_text: None,
            capacity: 0,
            size: 1,
            parent: Parent::Location(LocationId::new("start")),
            lock_key: None,
            properties: BTreeMap::new(),
        };
        let start = Location {
            id: LocationId::new("start"),
            name: "Start".into(),
            description: "a room".into(),
            exits: vec![],
            scenery_items: Default::default(),
            properties: BTreeMap::new(),
        };
        let mut items = BTreeMap::new();
        items.insert(lamp.id.clone(), lamp);
        let mut locations = BTreeMap::new();
        locations.insert(start.id.clone(), start);
        let player = Player {
            location: LocationId::new("start"),
            moves: 3,
            score: 5,
            carrying_capacity: 10,
            sheet: Default::default(),
            properties: BTreeMap::new(),
        };
        GameState::new(items, locations, player, BTreeMap::new(), BTreeMap::new())
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let state = sample_state();
        save_game(dir.path(), "quicksave", &state, 7).unwrap();
        let loaded = load_game(dir.path(), "quicksave").unwrap();
        assert_eq!(loaded.status, SaveFileStatus::Ready);
        let data = loaded.data.unwrap();
        assert_eq!(data.rng_state, 7);
        assert_eq!(data.player.moves, 3);
        assert_eq!(data.player.score, 5);
    }

    #[test]
    fn loading_a_missing_slot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_game(dir.path(), "nope").is_err());
    }

    #[test]
    fn version_mismatch_is_reported_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let mut data = sample_state().to_save_data(0);
        data.version = SAVE_FORMAT_VERSION + 1;
        let path = slot_path(dir.path(), "old");
        fs::write(&path, ron::to_string(&data).unwrap()).unwrap();

        let loaded = load_game(dir.path(), "old").unwrap();
        assert_eq!(
            loaded.status,
            SaveFileStatus::VersionMismatch {
                save_version: SAVE_FORMAT_VERSION + 1,
                current_version: SAVE_FORMAT_VERSION
            }
        );
        assert!(loaded.data.is_none());
    }

    #[test]
    fn corrupted_file_is_reported_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = slot_path(dir.path(), "broken");
        fs::write(&path, "not ron at all {{{").unwrap();
        let loaded = load_game(dir.path(), "broken").unwrap();
        assert!(matches!(loaded.status, SaveFileStatus::Corrupted { .. }));
    }

    #[test]
    fn list_saves_is_sorted_and_empty_for_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_saves(&dir.path().join("nonexistent")).unwrap().is_empty());
        let state = sample_state();
        save_game(dir.path(), "zeta", &state, 0).unwrap();
        save_game(dir.path(), "alpha", &state, 0).unwrap();
        assert_eq!(list_saves(dir.path()).unwrap(), vec!["alpha".to_string(), "zeta".to_string()]);
    }
}
