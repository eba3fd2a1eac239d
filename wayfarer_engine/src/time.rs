//! The time system: fuses and daemons, driven by the turn clock.
//! See spec.md §4.7.

use log::warn;

use crate::action::{ActionContext, ActionResult};
use crate::blueprint::GameBlueprint;
use crate::state::{ApplyError, GameState};
use crate::vocabulary::Vocabulary;

/// One tick's worth of narration, in firing order (fuses before daemons,
/// each group in ascending id order, per spec.md §4.7 and §5).
pub struct TickOutcome {
    pub narrations: Vec<String>,
}

/// Decrement every active fuse, fire any that just expired, then run any
/// daemon due this turn. Fuses fire before daemons; both in ascending id
/// order, matching spec.md's determinism requirement.
///
/// `on_expire`/`on_tick` hooks read a snapshot of `state` taken before
/// their own changes are applied; re-entrant fuse/daemon registration
/// inside a hook takes effect starting next tick, since `decrement_fuses`
/// and `due_daemons` were already computed for this tick.
pub fn advance_clock(state: &mut GameState, blueprint: &GameBlueprint, vocab: &Vocabulary) -> TickOutcome {
    let mut narrations = Vec::new();

    let expired = state.decrement_fuses();
    for fuse_id in expired {
        let Some(def) = state.fuse_def(&fuse_id) else {
            warn!("fuse {fuse_id} expired with no definition on record");
            continue;
        };
        let handler_key = def.on_expire.clone();
        let Some(hook) = blueprint.event_handler(&handler_key) else {
            warn!("fuse {fuse_id} has no registered on_expire hook \"{handler_key}\"");
            continue;
        };
        let ctx = ActionContext { state: &*state, vocab, messages: blueprint.message_provider.as_ref() };
        let outcome = hook(&ctx);
        drop(ctx);
        apply_hook_outcome(state, outcome, &mut narrations);
    }

    let due = state.due_daemons();
    for daemon_id in due {
        let Some(def) = state.daemon_def(&daemon_id) else {
            warn!("daemon {daemon_id} fired with no definition on record");
            continue;
        };
        let handler_key = def.on_tick.clone();
        let Some(hook) = blueprint.event_handler(&handler_key) else {
            warn!("daemon {daemon_id} has no registered on_tick hook \"{handler_key}\"");
            continue;
        };
        let ctx = ActionContext { state: &*state, vocab, messages: blueprint.message_provider.as_ref() };
        let outcome = hook(&ctx);
        drop(ctx);
        apply_hook_outcome(state, outcome, &mut narrations);
    }

    TickOutcome { narrations }
}

fn apply_hook_outcome(
    state: &mut GameState,
    outcome: Result<ActionResult, crate::action::ActionError>,
    narrations: &mut Vec<String>,
) {
    match outcome {
        Ok(result) => {
            if let Err(err) = state.apply_all(result.changes) {
                log_apply_failure(err);
            } else if !result.message.is_empty() {
                narrations.push(result.message);
            }
        }
        Err(err) => warn!("time-system hook failed: {err}"),
    }
}

fn log_apply_failure(err: ApplyError) {
    warn!("time-system hook produced an invalid state change, discarded: {err}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionResult;
    use crate::blueprint::GameBlueprintBuilder;
    use crate::state::{PropertyKey, StateChange};
    use crate::world::Player;
    use std::collections::BTreeMap;
    use wayfarer_data::{DaemonDef, FuseDef, GlobalId, Value};

    fn base_state() -> GameState {
        let player = Player {
            location: wayfarer_data::LocationId::new("start"),
            moves: 0,
            score: 0,
            carrying_capacity: 10,
            sheet: Default::default(),
            properties: BTreeMap::new(),
        };
        let mut fuse_defs = BTreeMap::new();
        fuse_defs.insert(
            wayfarer_data::FuseId::new("boom"),
            FuseDef { id: wayfarer_data::FuseId::new("boom"), initial_turns: 1, on_expire: "boom_expire".into() },
        );
        let mut daemon_defs = BTreeMap::new();
        daemon_defs.insert(
            wayfarer_data::DaemonId::new("drip"),
            DaemonDef { id: wayfarer_data::DaemonId::new("drip"), period: 1, on_tick: "drip_tick".into() },
        );
        GameState::new(BTreeMap::new(), BTreeMap::new(), player, fuse_defs, daemon_defs)
    }

    #[test]
    fn fuse_fires_exactly_once_on_expiry() {
        let mut state = base_state();
        state
            .apply(StateChange::set(PropertyKey::AddFuse(wayfarer_data::FuseId::new("boom"), 1), Value::Undefined))
            .unwrap();
        let blueprint = GameBlueprintBuilder::new()
            .event_handler(
                "boom_expire",
                Box::new(|_ctx: &ActionContext| {
                    Ok(ActionResult::new("BANG").with_changes(vec![StateChange::set(
                        PropertyKey::GlobalFlag(GlobalId::new("exploded")),
                        Value::Bool(true),
                    )]))
                }),
            )
            .build(minimal_def());
        let vocab = Vocabulary::default();

        let outcome = advance_clock(&mut state, &blueprint, &vocab);
        assert_eq!(outcome.narrations, vec!["BANG".to_string()]);
        assert!(state.global(&GlobalId::new("exploded")));
        assert!(state.active_fuses().is_empty());
    }

    fn minimal_def() -> wayfarer_data::GameDef {
        wayfarer_data::GameDef {
            title: "t".into(),
            abbreviated_title: "t".into(),
            introduction: String::new(),
            release: String::new(),
            maximum_score: 0,
            player: wayfarer_data::PlayerDef {
                starting_location: wayfarer_data::LocationId::new("start"),
                carrying_capacity: 10,
                sheet: Default::default(),
            },
            items: vec![],
            locations: vec![wayfarer_data::LocationDef {
                id: wayfarer_data::LocationId::new("start"),
                name: "Start".into(),
                description: "a room".into(),
                exits: vec![],
                scenery_items: Default::default(),
                flags: Default::default(),
            }],
            verbs: vec![],
            fuses: vec![],
            daemons: vec![],
        }
    }
}
