//! Action handlers: the `validate` / `process` pipeline that turns a
//! parsed [`Command`] into narration and a list of [`StateChange`]s.
//!
//! Handlers never mutate `GameState` themselves (spec.md §4.5, §5); they
//! only read through an [`ActionContext`] and return data.

use std::collections::HashMap;

use thiserror::Error;
use wayfarer_data::{DaemonId, FuseId, VerbId};

use crate::message::MessageProvider;
use crate::parser::Command;
use crate::state::{GameState, StateChange};
use crate::vocabulary::Vocabulary;

/// Read-only access a handler needs to validate or narrate a command.
/// This is the "immutable snapshot" view named in spec.md §5 — handlers
/// get no mutable reference to `GameState`.
pub struct ActionContext<'a> {
    pub state: &'a GameState,
    pub vocab: &'a Vocabulary,
    pub messages: &'a dyn MessageProvider,
}

/// The closed set of side effects a handler may request, each of which
/// the engine turns into one or more `StateChange`s before applying them
/// (spec.md §4.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    ScoreDelta(i64),
    ScheduleFuse(FuseId, u32),
    CancelFuse(FuseId),
    ActivateDaemon(DaemonId),
    DeactivateDaemon(DaemonId),
    PrintExtraLine(String),
    EndGame,
}

/// What a handler's `process` step produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionResult {
    pub message: String,
    pub changes: Vec<StateChange>,
    pub side_effects: Vec<SideEffect>,
}

impl ActionResult {
    pub fn new(message: impl Into<String>) -> Self {
        ActionResult { message: message.into(), changes: Vec::new(), side_effects: Vec::new() }
    }

    pub fn with_changes(mut self, changes: Vec<StateChange>) -> Self {
        self.changes = changes;
        self
    }

    pub fn with_side_effect(mut self, effect: SideEffect) -> Self {
        self.side_effects.push(effect);
        self
    }
}

/// Why a handler rejected a command, per spec.md §4.5.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("not reachable")]
    NotReachable,
    #[error("not takable")]
    NotTakable,
    #[error("already held")]
    AlreadyHeld,
    #[error("container closed")]
    ContainerClosed,
    #[error("container full")]
    ContainerFull,
    #[error("door locked")]
    DoorLocked,
    #[error("dark room")]
    DarkRoom,
    #[error("requires light")]
    RequiresLight,
    #[error("no such exit")]
    NoSuchExit,
    #[error("{0}")]
    CustomMessage(String),
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

impl ActionError {
    /// The default message key this error narrates through, for handlers
    /// that don't supply their own `CustomMessage`.
    pub fn message_key(&self) -> &str {
        match self {
            ActionError::NotReachable => "not_reachable",
            ActionError::NotTakable => "not_takable",
            ActionError::AlreadyHeld => "already_held",
            ActionError::ContainerClosed => "container_closed",
            ActionError::ContainerFull => "container_full",
            ActionError::DoorLocked => "door_locked",
            ActionError::DarkRoom => "dark_room",
            ActionError::RequiresLight => "requires_light",
            ActionError::NoSuchExit => "no_such_exit",
            ActionError::CustomMessage(_) => "",
            ActionError::InternalInvariant(_) => "internal_invariant",
        }
    }

    /// Whether this error aborts the current action without advancing the
    /// clock (only `InternalInvariant` does; every other error consumes
    /// the turn normally, per spec.md §4.5).
    pub fn aborts_turn(&self) -> bool {
        matches!(self, ActionError::InternalInvariant(_))
    }
}

/// A handler for one verb: cheap preconditions, then narration-plus-
/// changes.
pub trait ActionHandler: Send + Sync {
    fn validate(&self, command: &Command, ctx: &ActionContext) -> Result<(), ActionError>;
    fn process(&self, command: &Command, ctx: &ActionContext) -> Result<ActionResult, ActionError>;
}

/// Verb id -> handler lookup. Populated with the default handlers at
/// load time; a blueprint's own handler table is consulted first by the
/// engine, per the override rule in spec.md §4.5.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<VerbId, Box<dyn ActionHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, verb: VerbId, handler: Box<dyn ActionHandler>) {
        self.handlers.insert(verb, handler);
    }

    pub fn get(&self, verb: &VerbId) -> Option<&dyn ActionHandler> {
        self.handlers.get(verb).map(|b| b.as_ref())
    }

    /// Overlay a blueprint-supplied handler table on top of the defaults:
    /// entries in `overrides` replace same-keyed defaults, per spec.md
    /// §4.5's override rule.
    pub fn with_overrides(mut self, overrides: HandlerRegistry) -> Self {
        for (verb, handler) in overrides.handlers {
            self.handlers.insert(verb, handler);
        }
        self
    }
}
