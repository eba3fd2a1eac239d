//! Pure functions over a [`GameState`] snapshot: lit-ness, visibility, and
//! reachability. See spec.md §4.4.

use std::collections::BTreeSet;

use wayfarer_data::{ItemId, LocationId, Parent, PropertyId};

use crate::state::GameState;
use crate::world::PropertyView;

fn prop(name: &str) -> PropertyId {
    PropertyId::new(name)
}

/// True if `location` has light by any of the rules in spec.md §4.4:
/// inherently lit, a runtime `is_lit` flag, a carried lit light source, or
/// a lit light source directly present in the room.
pub fn is_lit(state: &GameState, location: &LocationId) -> bool {
    let Some(loc) = state.location(location) else {
        return false;
    };
    if loc.flag(&prop("inherently_lit")) || loc.flag(&prop("is_lit")) {
        return true;
    }
    let carried_light = state
        .player_inventory()
        .iter()
        .filter_map(|id| state.item(id))
        .any(|item| item.flag(&prop("light_source")) && item.flag(&prop("on")));
    if carried_light {
        return true;
    }
    state
        .items_in(&Parent::Location(location.clone()))
        .iter()
        .filter_map(|id| state.item(id))
        .any(|item| item.flag(&prop("light_source")) && item.flag(&prop("on")))
}

/// Items directly in `location`, excluding invisible ones, sorted by id.
/// Empty if the location is not lit.
pub fn visible_items_in(state: &GameState, location: &LocationId) -> Vec<ItemId> {
    if !is_lit(state, location) {
        return Vec::new();
    }
    state
        .items_in(&Parent::Location(location.clone()))
        .into_iter()
        .filter(|id| !state.item(id).map(|it| it.flag(&prop("invisible"))).unwrap_or(true))
        .collect()
}

/// The fixed-point set of items the player can currently act on: held
/// items, visible items in the current location, and — transitively —
/// contents of any open/transparent container or any surface already in
/// the reachable set.
pub fn reachable_by_player(state: &GameState) -> BTreeSet<ItemId> {
    let mut reachable: BTreeSet<ItemId> = state.player_inventory().into_iter().collect();
    reachable.extend(visible_items_in(state, &state.player().location));

    let mut processed: BTreeSet<ItemId> = BTreeSet::new();
    loop {
        let frontier: Vec<ItemId> = reachable.difference(&processed).cloned().collect();
        if frontier.is_empty() {
            break;
        }
        let mut added_any = false;
        for id in frontier {
            processed.insert(id.clone());
            let Some(item) = state.item(&id) else { continue };
            let exposes_contents = (item.flag(&prop("container")) && (item.flag(&prop("open")) || item.flag(&prop("transparent"))))
                || item.flag(&prop("surface"));
            if !exposes_contents {
                continue;
            }
            for child in state.items_in(&Parent::Item(id.clone())) {
                if reachable.insert(child) {
                    added_any = true;
                }
            }
        }
        if !added_any {
            break;
        }
    }
    reachable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Item, Location, Player};
    use std::collections::BTreeMap;
    use wayfarer_data::LocationId;

    fn empty_item(id: &str, parent: Parent) -> Item {
        Item {
            id: ItemId::new(id),
            name: id.into(),
            adjectives: Default::default(),
            synonyms: Default::default(),
            short_description: id.into(),
            first_description: None,
            long_description: None,
            read_text: None,
            capacity: 0,
            size: 1,
            parent,
            lock_key: None,
            properties: BTreeMap::new(),
        }
    }

    fn build_state() -> GameState {
        let loc = Location {
            id: LocationId::new("start"),
            name: "Start".into(),
            description: "a room".into(),
            exits: vec![],
            scenery_items: Default::default(),
            properties: BTreeMap::new(),
        };
        let mut items = BTreeMap::new();
        items.insert(ItemId::new("lamp"), empty_item("lamp", Parent::Location(LocationId::new("start"))));
        let mut locations = BTreeMap::new();
        locations.insert(loc.id.clone(), loc);
        let player = Player {
            location: LocationId::new("start"),
            moves: 0,
            score: 0,
            carrying_capacity: 10,
            sheet: Default::default(),
            properties: BTreeMap::new(),
        };
        GameState::new(items, locations, player, BTreeMap::new(), BTreeMap::new())
    }

    #[test]
    fn unlit_room_is_dark_without_a_light_source() {
        let state = build_state();
        assert!(!is_lit(&state, &LocationId::new("start")));
        assert!(visible_items_in(&state, &LocationId::new("start")).is_empty());
    }

    #[test]
    fn inherently_lit_flag_makes_room_lit() {
        let mut state = build_state();
        state
            .apply(crate::state::StateChange::set(
                crate::state::PropertyKey::LocationProperty(LocationId::new("start"), prop("inherently_lit")),
                wayfarer_data::Value::Bool(true),
            ))
            .unwrap();
        assert!(is_lit(&state, &LocationId::new("start")));
        assert_eq!(visible_items_in(&state, &LocationId::new("start")), vec![ItemId::new("lamp")]);
    }

    #[test]
    fn reachable_set_expands_through_open_containers() {
        let mut state = build_state();
        state
            .apply(crate::state::StateChange::set(
                crate::state::PropertyKey::LocationProperty(LocationId::new("start"), prop("inherently_lit")),
                wayfarer_data::Value::Bool(true),
            ))
            .unwrap();
        let mut chest = empty_item("chest", Parent::Location(LocationId::new("start")));
        chest.properties.insert(prop("container"), wayfarer_data::Value::Bool(true));
        chest.properties.insert(prop("open"), wayfarer_data::Value::Bool(true));
        state.insert_item_for_test(chest);
        let coin = empty_item("coin", Parent::Item(ItemId::new("chest")));
        state.insert_item_for_test(coin);

        let reachable = reachable_by_player(&state);
        assert!(reachable.contains(&ItemId::new("coin")));
    }
}
