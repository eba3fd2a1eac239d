//! The runnable game blueprint: a validated [`GameDef`] plus the
//! behavioural pieces a `toml` file can't express — handler overrides,
//! per-item/per-location/fuse/daemon hooks, a message provider, and an
//! RNG seed.
//!
//! Spec.md §6 describes this as one struct "supplied once at startup";
//! here it is assembled by [`crate::loader`] from a [`GameDef`] and a set
//! of author-written Rust hooks, since closures aren't serializable data.

use std::collections::HashMap;

use wayfarer_data::{GameDef, ItemId, LocationId, VerbId};

use crate::action::{ActionContext, ActionError, ActionResult, HandlerRegistry};
use crate::message::MessageProvider;

/// A callback invoked with a read-only view of the world, producing
/// narration and state changes exactly like an action handler's `process`.
/// Used for fuse `on_expire`, daemon `on_tick`, and per-item/per-location
/// `before_turn`/`after_turn` hooks.
pub type Hook = Box<dyn Fn(&ActionContext) -> Result<ActionResult, ActionError> + Send + Sync>;

/// The full startup package: content plus behaviour.
pub struct GameBlueprint {
    pub def: GameDef,
    pub handlers: HandlerRegistry,
    pub event_handlers: HashMap<String, Hook>,
    pub item_hooks: HashMap<ItemId, Hook>,
    pub location_hooks: HashMap<LocationId, Hook>,
    pub message_provider: Box<dyn MessageProvider>,
    pub rng_seed: u64,
}

impl GameBlueprint {
    pub fn event_handler(&self, key: &str) -> Option<&Hook> {
        self.event_handlers.get(key)
    }

    pub fn item_hook(&self, id: &ItemId) -> Option<&Hook> {
        self.item_hooks.get(id)
    }

    pub fn location_hook(&self, id: &LocationId) -> Option<&Hook> {
        self.location_hooks.get(id)
    }
}

/// Builder for assembling a [`GameBlueprint`] without forcing callers to
/// fill in every field by hand; mirrors the optional-override shape of
/// spec.md §6 ("custom-handler list, per-item handlers, per-location
/// handlers...").
#[derive(Default)]
pub struct GameBlueprintBuilder {
    handler_overrides: HandlerRegistry,
    event_handlers: HashMap<String, Hook>,
    item_hooks: HashMap<ItemId, Hook>,
    location_hooks: HashMap<LocationId, Hook>,
    message_provider: Option<Box<dyn MessageProvider>>,
    rng_seed: u64,
}

impl GameBlueprintBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn override_handler(mut self, verb: VerbId, handler: Box<dyn crate::action::ActionHandler>) -> Self {
        self.handler_overrides.register(verb, handler);
        self
    }

    pub fn event_handler(mut self, key: impl Into<String>, hook: Hook) -> Self {
        self.event_handlers.insert(key.into(), hook);
        self
    }

    pub fn item_hook(mut self, id: ItemId, hook: Hook) -> Self {
        self.item_hooks.insert(id, hook);
        self
    }

    pub fn location_hook(mut self, id: LocationId, hook: Hook) -> Self {
        self.location_hooks.insert(id, hook);
        self
    }

    pub fn message_provider(mut self, provider: Box<dyn MessageProvider>) -> Self {
        self.message_provider = Some(provider);
        self
    }

    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    pub fn build(self, def: GameDef) -> GameBlueprint {
        GameBlueprint {
            def,
            handlers: crate::handlers::default_registry().with_overrides(self.handler_overrides),
            event_handlers: self.event_handlers,
            item_hooks: self.item_hooks,
            location_hooks: self.location_hooks,
            message_provider: self.message_provider.unwrap_or_else(|| Box::new(crate::message::DefaultMessages::new())),
            rng_seed: self.rng_seed,
        }
    }
}
