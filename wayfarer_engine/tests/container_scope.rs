//! spec.md §8 scenario 2: a closed, non-transparent container hides its
//! contents from scope until it's opened.

mod support;

use wayfarer_data::ItemFlags;
use wayfarer_engine::TurnOutcome;

#[test]
fn coin_in_closed_chest_is_out_of_scope_until_opened() {
    let chest = support::item("chest", "chest", "start", ItemFlags { container: true, openable: true, ..Default::default() });
    let mut coin = support::item("coin", "coin", "start", ItemFlags { takable: true, ..Default::default() });
    coin.parent = wayfarer_data::Parent::Item(wayfarer_data::ItemId::new("chest"));
    let def = support::blank_def(
        "start",
        vec![support::location("start", "Start", "A small room.", true, vec![])],
        vec![chest, coin],
    );

    let mut engine = support::engine(&def);

    engine.run_turn("take coin");
    assert!(engine.sink.output().contains("can't see any such thing"));

    engine.sink.transcript.clear();
    assert_eq!(engine.run_turn("open chest"), TurnOutcome::Continue);
    assert!(engine.sink.output().contains("open"));

    engine.sink.transcript.clear();
    engine.run_turn("take coin");
    assert_eq!(
        engine.state.item(&wayfarer_data::ItemId::new("coin")).unwrap().parent,
        wayfarer_data::Parent::Player
    );
}
