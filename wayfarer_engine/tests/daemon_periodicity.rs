//! spec.md §8 scenario 5: a daemon with period N fires once every N turns,
//! starting counting from the turn it became active.

mod support;

use wayfarer_data::DaemonDef;
use wayfarer_engine::state::{PropertyKey, StateChange};
use wayfarer_engine::{ActionResult, GameBlueprintBuilder};

#[test]
fn daemon_with_period_five_drips_once_per_five_waits() {
    let mut def = support::blank_def("start", vec![support::location("start", "Start", "A room.", true, vec![])], vec![]);
    def.daemons = vec![DaemonDef { id: wayfarer_data::DaemonId::new("tick"), period: 5, on_tick: "drip_tick".into() }];

    let builder = GameBlueprintBuilder::new()
        .event_handler("drip_tick", Box::new(|_ctx: &wayfarer_engine::ActionContext| Ok(ActionResult::new("drip"))));
    let mut engine = support::engine_with(&def, builder);

    engine.state.apply(StateChange::set(PropertyKey::AddDaemon(wayfarer_data::DaemonId::new("tick")), wayfarer_data::Value::Undefined)).unwrap();

    for _ in 0..5 {
        engine.run_turn("wait");
    }
    assert_eq!(engine.sink.output().matches("drip").count(), 1);

    for _ in 0..5 {
        engine.run_turn("wait");
    }
    assert_eq!(engine.sink.output().matches("drip").count(), 2);
}
