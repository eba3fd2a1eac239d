//! spec.md §8 scenario 1: carrying a lit lamp into a dark room lights it up;
//! turning it off in the dark leaves `look` back at the dark-room message.

mod support;

use wayfarer_data::{Direction, ItemFlags};
use wayfarer_engine::TurnOutcome;

#[test]
fn lamp_carries_light_into_the_cave_and_back_to_dark() {
    let def = support::blank_def(
        "start",
        vec![
            support::location("start", "Start", "A cramped room.", false, vec![support::exit(Direction::North, "cave")]),
            support::location("cave", "Cave", "A damp cave.", false, vec![]),
        ],
        vec![support::item("lamp", "lamp", "start", ItemFlags { light_source: true, takable: true, ..Default::default() })],
    );
    let mut engine = support::engine(&def);

    assert_eq!(engine.run_turn("take lamp"), TurnOutcome::Continue);
    assert_eq!(engine.run_turn("turn on lamp"), TurnOutcome::Continue);
    assert_eq!(engine.run_turn("n"), TurnOutcome::Continue);
    assert_eq!(engine.run_turn("look"), TurnOutcome::Continue);
    let after_arrival = engine.sink.output();
    assert!(after_arrival.contains("Cave"), "expected the lit Cave description, got: {after_arrival}");

    engine.sink.transcript.clear();
    assert_eq!(engine.run_turn("turn off lamp"), TurnOutcome::Continue);
    assert_eq!(engine.run_turn("look"), TurnOutcome::Continue);
    let after_dark = engine.sink.output();
    assert!(after_dark.contains("pitch dark"), "expected the dark-room message, got: {after_dark}");
}
