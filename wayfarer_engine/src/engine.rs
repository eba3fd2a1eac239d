//! The turn loop: read, parse, run `beforeTurn` hooks, dispatch to a
//! handler, apply its changes, run `afterTurn` hooks, advance the clock,
//! then narrate. See spec.md §4.6/§5.
//!
//! Grounded in the teacher's `repl::run_repl`: one loop owning the world,
//! reading input, dispatching, then running time-driven upkeep before
//! flushing output — reshaped around this engine's read-only
//! `ActionContext`/`StateChange` handler contract instead of direct
//! mutation of the world by handlers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{info, warn};
use wayfarer_data::{DaemonDef, DaemonId, FuseDef, FuseId, ItemId, PropertyId, Value};

use crate::action::{ActionContext, ActionError, ActionResult, SideEffect};
use crate::blueprint::{GameBlueprint, Hook};
use crate::io::{IoSink, Style};
use crate::message::MessageProvider;
use crate::parser::{self, Command, ParseError};
use crate::rng::Lcg64;
use crate::save::{self, SaveFileStatus};
use crate::scope;
use crate::state::{GameState, Parent, PropertyKey, StateChange};
use crate::vocabulary::Vocabulary;
use crate::world::PropertyView;

/// How a turn (or the whole session) ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Keep reading input.
    Continue,
    /// The session ended cleanly (end-of-stream or a `quit`): exit code 0.
    Ended,
    /// A post-turn invariant check failed: exit code 3.
    Fatal(String),
}

/// Owns the whole runnable session: world state, the blueprint behind it,
/// the RNG, and the I/O boundary.
pub struct Engine<S: IoSink> {
    pub state: GameState,
    pub blueprint: GameBlueprint,
    pub vocab: Vocabulary,
    pub rng: Lcg64,
    pub sink: S,
    pub save_dir: PathBuf,
    autosave_every_turns: u32,
}

impl<S: IoSink> Engine<S> {
    pub fn new(state: GameState, blueprint: GameBlueprint, vocab: Vocabulary, sink: S, save_dir: PathBuf) -> Self {
        let rng = Lcg64::new(blueprint.rng_seed);
        Engine { state, blueprint, vocab, rng, sink, save_dir, autosave_every_turns: 0 }
    }

    pub fn with_autosave(mut self, every_turns: u32) -> Self {
        self.autosave_every_turns = every_turns;
        self
    }

    /// Seed the `verbose`/`brief` toggle (`Look::process` reads it back via
    /// `GameSpecific("verbose_mode")`) from `EngineConfig::verbose_by_default`.
    /// Only meaningful before the first turn runs; the `verbose`/`brief`
    /// handlers own it from then on.
    pub fn with_verbose_default(mut self, verbose: bool) -> Self {
        if let Err(err) =
            self.state.apply(StateChange::set(PropertyKey::GameSpecific("verbose_mode".into()), Value::Bool(verbose)))
        {
            warn!("failed to seed verbose_mode default: {err}");
        }
        self
    }

    /// Drive the engine until it terminates, returning the outcome so the
    /// binary can choose a process exit code.
    pub fn run(&mut self) -> TurnOutcome {
        loop {
            self.sink.flush();
            let Some(line) = self.sink.read_line() else {
                info!("input stream ended, terminating cleanly");
                return TurnOutcome::Ended;
            };
            match self.run_turn(&line) {
                TurnOutcome::Continue => continue,
                other => return other,
            }
        }
    }

    /// One full pass of spec.md §4.6's nine steps.
    pub fn run_turn(&mut self, input: &str) -> TurnOutcome {
        let mut narrations: Vec<String> = Vec::new();

        // `save`/`restore` accept a free-form slot name that isn't drawn
        // from the noun vocabulary (spec.md §6's "Persisted state" names no
        // grammar for it), so they're recognized from the raw input before
        // the noun/adjective parser ever runs, rather than through a
        // declared `SyntaxRuleDef`.
        if let Some(slot) = save_restore_slot(input, SAVE_WORDS) {
            narrations.push(self.handle_save(&slot));
            self.emit(&narrations);
            return TurnOutcome::Continue;
        }
        if let Some(slot) = save_restore_slot(input, RESTORE_WORDS) {
            narrations.push(self.handle_restore(&slot));
            self.emit(&narrations);
            return TurnOutcome::Continue;
        }

        let command = match parser::parse(input, &self.vocab, &self.state) {
            Ok(cmd) => cmd,
            Err(err) => {
                narrations.push(render_parse_error(&err, self.blueprint.message_provider.as_ref()));
                let tick = crate::time::advance_clock(&mut self.state, &self.blueprint, &self.vocab);
                narrations.extend(tick.narrations);
                self.emit(&narrations);
                return TurnOutcome::Continue;
            }
        };

        // spec.md §8: "`all` with nothing in scope narrates ... and does
        // not advance fuses." The parser already expands `all`/`everything`
        // to every reachable item (see `parser::resolve_noun_phrase`), so
        // an empty direct-object list here means there was nothing to act
        // on; short-circuit before dispatch and the clock tick.
        if command.is_all && command.direct_objects.is_empty() && command.indirect_objects.is_empty() {
            narrations.push(self.blueprint.message_provider.render("nothing_to_verb", &[command.verb.as_str()]));
            self.emit(&narrations);
            return TurnOutcome::Continue;
        }

        let location_before = self.state.player().location.clone();

        let action_outcome = match self.run_before_turn_hooks() {
            Some(preempted) => preempted,
            None => self.dispatch(&command),
        };

        let mut aborted = false;
        let mut end_game = false;
        match action_outcome {
            Ok(result) => {
                if !result.message.is_empty() {
                    narrations.push(result.message.clone());
                }
                match self.state.apply_all(result.changes) {
                    Ok(()) => end_game = self.expand_side_effects(&result.side_effects, &mut narrations),
                    Err(err) => {
                        warn!("turn rolled back: {err}");
                        narrations.push(self.blueprint.message_provider.message("internal_invariant"));
                        aborted = true;
                    }
                }
            }
            Err(err) => {
                if err.aborts_turn() {
                    warn!("action aborted: {err}");
                    aborted = true;
                }
                narrations.push(render_action_error(&err, self.blueprint.message_provider.as_ref()));
            }
        }

        self.run_after_turn_hooks(&mut narrations);

        if aborted {
            self.emit(&narrations);
            return TurnOutcome::Continue;
        }

        let tick = crate::time::advance_clock(&mut self.state, &self.blueprint, &self.vocab);
        narrations.extend(tick.narrations);

        self.bookkeep_turn(&location_before);

        info!(
            "turn {} complete: location={}, score={}",
            self.state.player().moves,
            self.state.player().location,
            self.state.player().score
        );

        if self.autosave_every_turns > 0 && self.state.player().moves % u64::from(self.autosave_every_turns) == 0 {
            if let Err(err) = save::save_game(&self.save_dir, "autosave", &self.state, self.rng.state()) {
                warn!("autosave failed: {err}");
            }
        }

        self.emit(&narrations);

        if end_game {
            return TurnOutcome::Ended;
        }

        match self.check_invariants() {
            Ok(()) => TurnOutcome::Continue,
            Err(message) => TurnOutcome::Fatal(message),
        }
    }

    /// Steps 3/4: `beforeTurn` hooks, location first then reachable items
    /// in ascending id order; falling through to the verb's own handler if
    /// none of them pre-empt.
    fn run_before_turn_hooks(&self) -> Option<Result<ActionResult, ActionError>> {
        let location = self.state.player().location.clone();
        if let Some(hook) = self.blueprint.location_hook(&location) {
            let ctx = ActionContext { state: &self.state, vocab: &self.vocab, messages: self.blueprint.message_provider.as_ref() };
            match hook(&ctx) {
                Ok(result) if hook_is_noop(&result) => {}
                other => return Some(other),
            }
        }
        for item_id in scope::reachable_by_player(&self.state) {
            if let Some(hook) = self.blueprint.item_hook(&item_id) {
                let ctx = ActionContext { state: &self.state, vocab: &self.vocab, messages: self.blueprint.message_provider.as_ref() };
                match hook(&ctx) {
                    Ok(result) if hook_is_noop(&result) => {}
                    other => return Some(other),
                }
            }
        }
        None
    }

    /// Step 6: `afterTurn` hooks, symmetric with `beforeTurn`'s ordering.
    /// Unlike `beforeTurn`, there's nothing left to pre-empt: every hook
    /// that fires has its changes applied independently, the way
    /// `crate::time::advance_clock` applies fuse/daemon outcomes.
    fn run_after_turn_hooks(&mut self, narrations: &mut Vec<String>) {
        let location = self.state.player().location.clone();
        if let Some(hook) = self.blueprint.location_hook(&location) {
            let ctx = ActionContext { state: &self.state, vocab: &self.vocab, messages: self.blueprint.message_provider.as_ref() };
            let outcome = hook(&ctx);
            drop(ctx);
            apply_hook_outcome(&mut self.state, outcome, narrations);
        }
        let reachable: Vec<ItemId> = scope::reachable_by_player(&self.state).into_iter().collect();
        for item_id in &reachable {
            if let Some(hook) = self.blueprint.item_hook(item_id) {
                let ctx = ActionContext { state: &self.state, vocab: &self.vocab, messages: self.blueprint.message_provider.as_ref() };
                let outcome = hook(&ctx);
                drop(ctx);
                apply_hook_outcome(&mut self.state, outcome, narrations);
            }
        }
    }

    /// Look up the verb's handler (blueprint overrides win, per spec.md
    /// §4.5) and run its `validate` then `process`.
    fn dispatch(&self, command: &Command) -> Result<ActionResult, ActionError> {
        let entry = self.vocab.verb_entry(&command.verb);
        if entry.map(|e| e.requires_light).unwrap_or(false)
            && !scope::is_lit(&self.state, &self.state.player().location)
        {
            return Err(ActionError::RequiresLight);
        }
        let Some(handler) = self.blueprint.handlers.get(&command.verb) else {
            return Err(ActionError::CustomMessage(self.blueprint.message_provider.message("no_handler")));
        };
        let ctx = ActionContext { state: &self.state, vocab: &self.vocab, messages: self.blueprint.message_provider.as_ref() };
        handler.validate(command, &ctx)?;
        handler.process(command, &ctx)
    }

    /// Turn a handler's closed set of [`SideEffect`]s into `StateChange`s
    /// and apply them one at a time (spec.md §4.5: "each side effect is
    /// itself expressible as one or more `StateChange`s"). Returns whether
    /// `EndGame` was requested.
    fn expand_side_effects(&mut self, effects: &[SideEffect], narrations: &mut Vec<String>) -> bool {
        let mut end_game = false;
        for effect in effects {
            match effect {
                SideEffect::ScoreDelta(delta) => {
                    let new_score = self.state.player().score + delta;
                    if let Err(err) =
                        self.state.apply(StateChange::set(PropertyKey::PlayerScore, Value::Int(new_score)))
                    {
                        warn!("score delta rejected: {err}");
                    }
                }
                SideEffect::ScheduleFuse(id, turns) => {
                    if let Err(err) = self
                        .state
                        .apply(StateChange::set(PropertyKey::AddFuse(id.clone(), *turns), Value::Undefined))
                    {
                        warn!("schedule fuse \"{id}\" rejected: {err}");
                    }
                }
                SideEffect::CancelFuse(id) => {
                    if let Err(err) =
                        self.state.apply(StateChange::set(PropertyKey::RemoveFuse(id.clone()), Value::Undefined))
                    {
                        warn!("cancel fuse \"{id}\" rejected: {err}");
                    }
                }
                SideEffect::ActivateDaemon(id) => {
                    if let Err(err) =
                        self.state.apply(StateChange::set(PropertyKey::AddDaemon(id.clone()), Value::Undefined))
                    {
                        warn!("activate daemon \"{id}\" rejected: {err}");
                    }
                }
                SideEffect::DeactivateDaemon(id) => {
                    if let Err(err) =
                        self.state.apply(StateChange::set(PropertyKey::RemoveDaemon(id.clone()), Value::Undefined))
                    {
                        warn!("deactivate daemon \"{id}\" rejected: {err}");
                    }
                }
                SideEffect::PrintExtraLine(line) => narrations.push(line.clone()),
                SideEffect::EndGame => end_game = true,
            }
        }
        end_game
    }

    /// Step 8: increment the move counter and, if the player relocated,
    /// mark the destination visited.
    fn bookkeep_turn(&mut self, location_before: &wayfarer_data::LocationId) {
        let new_moves = self.state.player().moves as i64 + 1;
        if let Err(err) = self.state.apply(StateChange::set(PropertyKey::PlayerMoves, Value::Int(new_moves))) {
            warn!("failed to increment move counter: {err}");
        }
        if &self.state.player().location != location_before {
            let destination = self.state.player().location.clone();
            if let Err(err) = self.state.apply(StateChange::set(
                PropertyKey::LocationProperty(destination, PropertyId::new("visited")),
                Value::Bool(true),
            )) {
                warn!("failed to mark destination visited: {err}");
            }
        }
    }

    fn emit(&mut self, narrations: &[String]) {
        for line in narrations {
            self.sink.write(line, Style::Normal);
            self.sink.write("\n", Style::Normal);
        }
    }

    fn handle_save(&self, slot: &str) -> String {
        match save::save_game(&self.save_dir, slot, &self.state, self.rng.state()) {
            Ok(path) => format!("Saved to \"{}\".", path.display()),
            Err(err) => {
                warn!("save failed: {err}");
                format!("Save failed: {err}")
            }
        }
    }

    fn handle_restore(&mut self, slot: &str) -> String {
        match save::load_game(&self.save_dir, slot) {
            Ok(loaded) => match loaded.status {
                SaveFileStatus::Ready => {
                    let data = loaded.data.expect("Ready implies data present");
                    let fuse_defs: BTreeMap<FuseId, FuseDef> =
                        self.blueprint.def.fuses.iter().map(|f| (f.id.clone(), f.clone())).collect();
                    let daemon_defs: BTreeMap<DaemonId, DaemonDef> =
                        self.blueprint.def.daemons.iter().map(|d| (d.id.clone(), d.clone())).collect();
                    self.rng = Lcg64::from_state(data.rng_state);
                    self.state = GameState::from_save_data(data, fuse_defs, daemon_defs);
                    "Restored.".to_string()
                }
                SaveFileStatus::VersionMismatch { save_version, current_version } => format!(
                    "That save is from an incompatible version ({save_version}, this engine is {current_version})."
                ),
                SaveFileStatus::Corrupted { message } => format!("That save file is corrupted: {message}"),
            },
            Err(err) => {
                warn!("restore failed: {err}");
                format!("No save named \"{slot}\" was found.")
            }
        }
    }

    /// The properties spec.md §8 requires to hold at the end of every
    /// turn. `GameState::apply` already rejects the writes that would
    /// violate most of these; this is a belt-and-suspenders sweep so a bug
    /// elsewhere surfaces as a clean fatal error (exit code 3) instead of
    /// corrupted silent state.
    fn check_invariants(&self) -> Result<(), String> {
        let worn = PropertyId::new("worn");
        let wearable = PropertyId::new("wearable");
        let container = PropertyId::new("container");

        for item in self.state.items() {
            if item.flag(&worn) {
                if item.parent != Parent::Player {
                    return Err(format!("item \"{}\" is worn but not carried", item.id));
                }
                if !item.flag(&wearable) {
                    return Err(format!("item \"{}\" is worn but not wearable", item.id));
                }
            }
            match &item.parent {
                Parent::Item(parent_id) if self.state.item(parent_id).is_none() => {
                    return Err(format!("item \"{}\" has missing parent \"{parent_id}\"", item.id));
                }
                Parent::Location(loc_id) if self.state.location(loc_id).is_none() => {
                    return Err(format!("item \"{}\" has missing location parent \"{loc_id}\"", item.id));
                }
                _ => {}
            }
        }

        for item in self.state.items() {
            if item.flag(&container) {
                let total: i64 = self
                    .state
                    .items_in(&Parent::Item(item.id.clone()))
                    .iter()
                    .filter_map(|id| self.state.item(id))
                    .map(|it| it.size)
                    .sum();
                if total > item.capacity {
                    return Err(format!(
                        "container \"{}\" holds total size {total} exceeding capacity {}",
                        item.id, item.capacity
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Free-function form of [`Engine::run_turn`], for callers (and tests) that
/// prefer `run_turn(&mut engine, input)` over the method call.
pub fn run_turn<S: IoSink>(engine: &mut Engine<S>, input: &str) -> TurnOutcome {
    engine.run_turn(input)
}

const SAVE_WORDS: &[&str] = &["save"];
const RESTORE_WORDS: &[&str] = &["restore", "load"];

/// If `input`'s first word is one of `words` (a `save`/`restore` trigger),
/// return the slot name drawn from whatever follows — e.g. `save
/// quicksave` -> `Some("quicksave")`, a bare `save` -> `Some("default")`.
/// Returns `None` for anything else, so the caller falls through to the
/// ordinary noun/adjective parser.
fn save_restore_slot(input: &str, words: &[&str]) -> Option<String> {
    let mut tokens = input.split_whitespace();
    let first = tokens.next()?.to_lowercase();
    if !words.contains(&first.as_str()) {
        return None;
    }
    let rest: Vec<String> = tokens.map(str::to_lowercase).collect();
    Some(if rest.is_empty() { "default".to_string() } else { rest.join("-") })
}

/// An empty [`ActionResult`] signals a hook that chose not to act this
/// turn; anything else pre-empts the pipeline.
fn hook_is_noop(result: &ActionResult) -> bool {
    result.message.is_empty() && result.changes.is_empty() && result.side_effects.is_empty()
}

fn apply_hook_outcome(state: &mut GameState, outcome: Result<ActionResult, ActionError>, narrations: &mut Vec<String>) {
    match outcome {
        Ok(result) => {
            if !result.message.is_empty() {
                narrations.push(result.message.clone());
            }
            if let Err(err) = state.apply_all(result.changes) {
                warn!("afterTurn hook produced an invalid state change, discarded: {err}");
            }
        }
        Err(err) => warn!("afterTurn hook failed: {err}"),
    }
}

fn render_parse_error(err: &ParseError, messages: &dyn MessageProvider) -> String {
    match err {
        ParseError::UnknownWord(word) => messages.render("unknown_word", &[word]),
        ParseError::NoVerb => messages.message("no_verb"),
        ParseError::NoMatchingSyntax => messages.message("no_matching_syntax"),
        ParseError::AmbiguousReference(ids) => {
            let names: Vec<&str> = ids.iter().map(ItemId::as_str).collect();
            messages.render("ambiguous_which", &[&names.join(" or ")])
        }
        ParseError::PronounUnbound(_) => messages.message("pronoun_unbound"),
        ParseError::ObjectNotInScope(_) => messages.message("cant_see_any_such_thing"),
    }
}

fn render_action_error(err: &ActionError, messages: &dyn MessageProvider) -> String {
    match err {
        ActionError::CustomMessage(text) => text.clone(),
        other => messages.message(other.message_key()),
    }
}
