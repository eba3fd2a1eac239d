//! spec.md §8 scenario 4: a fuse with initial turns N fires its on_expire
//! hook exactly once, N turns after it's activated.

mod support;

use wayfarer_data::{FuseDef, GlobalId, Value};
use wayfarer_engine::state::{PropertyKey, StateChange};
use wayfarer_engine::{ActionResult, GameBlueprintBuilder};

#[test]
fn fuse_fires_bang_exactly_three_turns_after_activation() {
    let mut def = support::blank_def("start", vec![support::location("start", "Start", "A room.", true, vec![])], vec![]);
    def.fuses = vec![FuseDef { id: wayfarer_data::FuseId::new("boom"), initial_turns: 3, on_expire: "boom_expire".into() }];

    let builder = GameBlueprintBuilder::new().event_handler(
        "boom_expire",
        Box::new(|_ctx: &wayfarer_engine::ActionContext| {
            Ok(ActionResult::new("BANG").with_changes(vec![StateChange::set(
                PropertyKey::GlobalFlag(GlobalId::new("exploded")),
                Value::Bool(true),
            )]))
        }),
    );
    let mut engine = support::engine_with(&def, builder);

    engine
        .state
        .apply(StateChange::set(PropertyKey::AddFuse(wayfarer_data::FuseId::new("boom"), 3), Value::Undefined))
        .unwrap();

    for turn in 1..=2 {
        engine.sink.transcript.clear();
        engine.run_turn("wait");
        assert!(!engine.sink.output().contains("BANG"), "fuse fired early on turn {turn}");
        assert!(!engine.state.global(&GlobalId::new("exploded")));
    }

    engine.sink.transcript.clear();
    engine.run_turn("wait");
    assert!(engine.sink.output().contains("BANG"));
    assert!(engine.state.global(&GlobalId::new("exploded")));
    assert!(!engine.state.active_fuses().contains_key(&wayfarer_data::FuseId::new("boom")));
}
