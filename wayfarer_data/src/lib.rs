//! Shared identifier, value, and blueprint-definition types.
//!
//! This crate has no runtime behaviour of its own: it is the vocabulary
//! that `wayfarer_engine`'s world model, parser, and loader are built out
//! of. Keeping it separate lets content-authoring tools depend on the data
//! shapes without pulling in the engine's turn loop, I/O, or RNG.

pub mod defs;
pub mod ids;
pub mod validate;
pub mod value;

pub use defs::{
    standard_verbs, CharacterSheet, DaemonDef, ExitDef, FuseDef, GameDef, ItemDef, ItemFlags,
    LocationDef, LocationFlags, PlayerDef, SlotDef, SyntaxRuleDef, VerbDef,
};
pub use ids::{DaemonId, FuseId, GlobalId, ItemId, LocationId, PropertyId, VerbId};
pub use validate::{validate, validate_all, ValidationError};
pub use value::{Direction, Exit, Parent, Value};
