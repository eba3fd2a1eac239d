//! Optional engine-wide configuration, loaded from a `wayfarer.toml` next
//! to the blueprint. Absence of the file is not an error: every field has
//! a sensible default, mirroring the way a blueprint's own flags default
//! to `false`/empty (spec.md §3).

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Front-end and engine-loop knobs that aren't part of the game content
/// itself: whether room descriptions start verbose, how often to
/// autosave, and where save files live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub verbose_by_default: bool,
    /// Autosave to the `"autosave"` slot every N turns; 0 disables it.
    pub autosave_every_turns: u32,
    pub save_dir: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig { verbose_by_default: false, autosave_every_turns: 0, save_dir: "saves".to_string() }
    }
}

impl EngineConfig {
    /// Load `path`, falling back to defaults if it doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}
