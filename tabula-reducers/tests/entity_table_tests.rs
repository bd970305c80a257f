mod common;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{Value, json};
use tabula_model::{EventSet, ReduceError, Reducer, Transitions};
use tabula_reducers::{
    ArrayReplacement, EntityTable, EntityTableConfig, EntityTableReducer, EntityTransition,
};
use tabula_types::{Event, Id, Record};

fn record(value: Value) -> Record {
    Record::try_from(value).unwrap()
}

fn table(value: Value) -> EntityTable {
    serde_json::from_value(value).unwrap()
}

fn config() -> EntityTableConfig {
    EntityTableConfig {
        added: EventSet::of(["TODO_ADDED"]),
        updated: EventSet::of(["TODO_UPDATED"]),
        updated_in_bulk: EventSet::of(["TODOS_UPDATED"]),
        fetched: EventSet::of(["TODOS_FETCHED"]),
        removed: EventSet::of(["TODO_REMOVED"]),
        confirmed: EventSet::of(["TODO_CONFIRMED"]),
        added_to_array_attribute: EventSet::of(["TAGS_ADDED"]),
        removed_from_array_attribute: EventSet::of(["TAGS_REMOVED"]),
        replaced_in_array_attribute: EventSet::of(["TAGS_REPLACED"]),
        cleared: EventSet::of(["TODOS_CLEARED"]),
        ..EntityTableConfig::default()
    }
    .cascade_on("LIST_REMOVED", "listId")
}

fn reducer() -> EntityTableReducer {
    EntityTableReducer::new(config())
}

fn reduce(state: &EntityTable, kind: &str, payload: Value) -> EntityTable {
    reducer().reduce(state, &Event::new(kind, payload))
}

// ── Single-record families ───────────────────────────────────────

#[test]
fn added_stores_record_under_its_id() {
    let state = reduce(&EntityTable::new(), "TODO_ADDED", json!({"id": 1, "text": "a"}));
    assert_eq!(state, table(json!({"1": {"id": 1, "text": "a"}})));
    assert!(!state.get(&Id::Num(1)).unwrap().is_confirmed());
}

#[test]
fn added_applies_default_attributes() {
    let reducer = EntityTableReducer::new(
        config().with_default_attributes(record(json!({"done": false, "text": ""}))),
    );
    let state = reducer.reduce(
        &EntityTable::new(),
        &Event::new("TODO_ADDED", json!({"id": 1, "text": "a"})),
    );
    assert_eq!(
        state.get(&Id::Num(1)),
        Some(&record(json!({"id": 1, "text": "a", "done": false})))
    );
}

#[test]
fn added_replaces_existing_record() {
    let state = table(json!({"1": {"id": 1, "old": true}}));
    let state = reduce(&state, "TODO_ADDED", json!({"id": 1, "new": true}));
    assert_eq!(state, table(json!({"1": {"id": 1, "new": true}})));
}

#[test]
fn custom_id_key_is_honoured() {
    let reducer = EntityTableReducer::new(config().with_id_key("uuid"));
    let state = reducer.reduce(
        &EntityTable::new(),
        &Event::new("TODO_ADDED", json!({"uuid": "abc", "text": "a"})),
    );
    assert!(state.contains(&Id::from("abc")));
}

#[test]
fn updated_merges_shallowly() {
    let state = table(json!({"1": {"id": 1, "text": "a", "meta": {"x": 1}}}));
    let state = reduce(&state, "TODO_UPDATED", json!({"id": 1, "meta": {"y": 2}}));
    assert_eq!(
        state,
        table(json!({"1": {"id": 1, "text": "a", "meta": {"y": 2}}}))
    );
}

#[test]
fn removed_accepts_coercible_ids() {
    let state = table(json!({"1": {"id": 1}, "2": {"id": 2}}));
    let state = reduce(&state, "TODO_REMOVED", json!("1"));
    assert_eq!(state, table(json!({"2": {"id": 2}})));
}

#[test]
fn removed_accepts_keyed_id() {
    let state = table(json!({"1": {"id": 1}, "2": {"id": 2}}));
    let state = reduce(&state, "TODO_REMOVED", json!({"id": 1}));
    assert_eq!(state, table(json!({"2": {"id": 2}})));
}

#[test]
fn removed_accepts_order_list() {
    let state = table(json!({"1": {"id": 1}, "2": {"id": 2}, "3": {"id": 3}}));
    let state = reduce(&state, "TODO_REMOVED", json!({"order": [1, "3"]}));
    assert_eq!(state, table(json!({"2": {"id": 2}})));
}

#[test]
fn removed_unknown_id_is_noop() {
    let state = table(json!({"1": {"id": 1}}));
    assert_eq!(reduce(&state, "TODO_REMOVED", json!(9)), state);
}

// ── Bulk families ────────────────────────────────────────────────

#[test]
fn bulk_update_by_order_creates_missing_records() {
    let state = table(json!({"1": {"id": 1, "text": "a"}}));
    let state = reduce(&state, "TODOS_UPDATED", json!({"order": [1, 2], "done": true}));
    assert_eq!(
        state,
        table(json!({
            "1": {"id": 1, "text": "a", "done": true},
            "2": {"done": true},
        }))
    );
}

#[test]
fn bulk_update_by_entities_patches_existing_only() {
    let state = table(json!({"1": {"id": 1, "text": "a"}}));
    let state = reduce(
        &state,
        "TODOS_UPDATED",
        json!({"entities": {"1": {"text": "b"}, "2": {"text": "c"}}}),
    );
    assert_eq!(state, table(json!({"1": {"id": 1, "text": "b"}})));
}

#[test]
fn fetched_merges_confirmed_records() {
    let state = table(json!({"1": {"id": 1, "text": "local"}}));
    let state = reduce(
        &state,
        "TODOS_FETCHED",
        json!({"entities": {"2": {"id": 2, "text": "b"}}, "order": [2]}),
    );
    assert_eq!(state.len(), 2);
    assert!(!state.get(&Id::Num(1)).unwrap().is_confirmed());
    assert!(state.get(&Id::Num(2)).unwrap().is_confirmed());
}

#[test]
fn fetched_replaces_existing_record_entirely() {
    let state = table(json!({"1": {"id": 1, "stale": true}}));
    let state = reduce(&state, "TODOS_FETCHED", json!({"entities": {"1": {"id": 1}}}));
    assert_eq!(state, table(json!({"1": {"id": 1, "isConfirmed": true}})));
}

#[test]
fn fetched_is_idempotent() {
    let payload = json!({"entities": {"1": {"id": 1}, "2": {"id": 2}}});
    let once = reduce(&EntityTable::new(), "TODOS_FETCHED", payload.clone());
    let twice = reduce(&once, "TODOS_FETCHED", payload);
    assert_eq!(once, twice);
}

// ── Confirmation ─────────────────────────────────────────────────

#[test]
fn confirmed_renames_temporary_record() {
    let state = table(json!({"tmp-1": {"id": "tmp-1", "text": "a"}}));
    let state = reduce(
        &state,
        "TODO_CONFIRMED",
        json!({"oldId": "tmp-1", "newId": 42, "createdAt": 7}),
    );
    assert_eq!(
        state,
        table(json!({
            "42": {"id": 42, "text": "a", "createdAt": 7, "isConfirmed": true},
        }))
    );
}

#[test]
fn confirmed_unknown_old_id_is_noop() {
    let state = table(json!({"1": {"id": 1}}));
    let next = reduce(&state, "TODO_CONFIRMED", json!({"oldId": 5, "newId": 6}));
    assert_eq!(next, state);
}

#[test]
fn confirmed_without_ids_confirms_everything() {
    let state = table(json!({"1": {"id": 1}, "2": {"id": 2}}));
    let state = reduce(&state, "TODO_CONFIRMED", json!({}));
    assert!(state.iter().all(|(_, r)| r.is_confirmed()));
}

#[test]
fn confirmed_with_half_a_rename_is_rejected() {
    let state = table(json!({"1": {"id": 1}}));
    let event = Event::new("TODO_CONFIRMED", json!({"oldId": 1}));
    assert_eq!(reducer().reduce(&state, &event), state);
    assert!(reducer().try_reduce(&state, &event).is_err());
}

// ── Array attributes ─────────────────────────────────────────────

#[test]
fn array_add_skips_present_values() {
    let state = table(json!({"1": {"tags": ["b"]}}));
    let state = reduce(
        &state,
        "TAGS_ADDED",
        json!({"id": 1, "key": "tags", "values": ["a", "b", "a"]}),
    );
    assert_eq!(state, table(json!({"1": {"tags": ["b", "a"]}})));
}

#[test]
fn array_add_inserts_at_index() {
    let state = table(json!({"1": {"tags": ["x", "y"]}}));
    let state = reduce(
        &state,
        "TAGS_ADDED",
        json!({"id": 1, "key": "tags", "values": ["a"], "atIndex": 1}),
    );
    assert_eq!(state, table(json!({"1": {"tags": ["x", "a", "y"]}})));
}

#[test]
fn array_add_treats_missing_attribute_as_empty() {
    let state = table(json!({"1": {"id": 1}}));
    let state = reduce(&state, "TAGS_ADDED", json!({"id": 1, "key": "tags", "order": [3]}));
    assert_eq!(state, table(json!({"1": {"id": 1, "tags": [3]}})));
}

#[test]
fn array_edit_leaves_non_list_attribute_alone() {
    let state = table(json!({"1": {"tags": "oops"}}));
    let next = reduce(&state, "TAGS_ADDED", json!({"id": 1, "key": "tags", "values": [1]}));
    assert_eq!(next, state);
}

#[test]
fn array_remove_compares_with_id_coercion() {
    let state = table(json!({"1": {"members": [1, 2, 3]}}));
    let state = reduce(
        &state,
        "TAGS_REMOVED",
        json!({"id": 1, "key": "members", "values": ["2"]}),
    );
    assert_eq!(state, table(json!({"1": {"members": [1, 3]}})));
}

#[test]
fn array_add_then_remove_restores_list() {
    let state = table(json!({"1": {"tags": ["x"]}}));
    let added = reduce(&state, "TAGS_ADDED", json!({"id": 1, "key": "tags", "values": ["y", "z"]}));
    let removed = reduce(
        &added,
        "TAGS_REMOVED",
        json!({"id": 1, "key": "tags", "values": ["y", "z"]}),
    );
    assert_eq!(removed, state);
}

#[test]
fn array_replace_swaps_positionally() {
    let state = table(json!({"1": {"tags": ["a", "b", "c"]}}));
    let state = reduce(
        &state,
        "TAGS_REPLACED",
        json!({"id": 1, "key": "tags", "oldValues": ["c", "a"], "newValues": ["C", "A"]}),
    );
    assert_eq!(state, table(json!({"1": {"tags": ["A", "b", "C"]}})));
}

#[test]
fn array_replace_with_short_new_values_keeps_unpaired_items() {
    let state = table(json!({"1": {"tags": ["a", "b"]}}));
    let swap = ArrayReplacement {
        id: Id::Num(1),
        key: "tags".into(),
        old_values: vec![json!("a"), json!("b")],
        new_values: vec![json!("A")],
    };
    let state = reducer().apply(&state, EntityTransition::ArrayReplaced(swap));
    assert_eq!(state, table(json!({"1": {"tags": ["A", "b"]}})));
}

#[test]
fn array_replace_requires_equal_lengths() {
    let state = table(json!({"1": {"tags": ["a"]}}));
    let event = Event::new(
        "TAGS_REPLACED",
        json!({"id": 1, "key": "tags", "oldValues": ["a"], "newValues": []}),
    );
    assert_eq!(reducer().reduce(&state, &event), state);
    assert_eq!(
        reducer().try_reduce(&state, &event),
        Err(ReduceError::ShapeMismatch {
            event_type: "TAGS_REPLACED".into(),
            families: vec!["replacedInArrayAttribute"],
        })
    );
}

// ── Cascade and clear ────────────────────────────────────────────

#[test]
fn cascade_removes_one_level_of_dependents() {
    let state = table(json!({
        "1": {"listId": 10},
        "2": {"listId": 20},
        "3": {"text": "orphan"},
    }));
    let state = reduce(&state, "LIST_REMOVED", json!(10));
    assert_eq!(
        state,
        table(json!({"2": {"listId": 20}, "3": {"text": "orphan"}}))
    );
}

#[test]
fn cascade_matches_coerced_foreign_keys() {
    let state = table(json!({"1": {"listId": "10"}}));
    assert!(reduce(&state, "LIST_REMOVED", json!(10)).is_empty());
}

#[test]
fn cleared_accepts_bare_event() {
    let state = table(json!({"1": {"id": 1}}));
    let state = reducer().reduce(&state, &Event::bare("TODOS_CLEARED"));
    assert!(state.is_empty());
}

// ── Routing ──────────────────────────────────────────────────────

#[test]
fn shared_event_type_falls_through_to_matching_family() {
    common::init_tracing();
    let reducer = EntityTableReducer::new(EntityTableConfig {
        added: EventSet::of(["TODO"]),
        removed: EventSet::of(["TODO"]),
        ..EntityTableConfig::default()
    });
    let state = reducer.reduce(&EntityTable::new(), &Event::new("TODO", json!({"id": 1})));
    assert!(state.contains(&Id::Num(1)));

    let state = reducer.reduce(&state, &Event::with_id("TODO", 1));
    assert!(state.is_empty());
}

#[test]
fn rejected_payload_is_reported_by_strict_reduce() {
    common::init_tracing();
    let event = Event::new("TODO_ADDED", json!({"text": "no id"}));
    assert_eq!(reducer().reduce(&EntityTable::new(), &event), EntityTable::new());
    assert_eq!(
        reducer().try_reduce(&EntityTable::new(), &event),
        Err(ReduceError::ShapeMismatch {
            event_type: "TODO_ADDED".into(),
            families: vec!["added"],
        })
    );
}

#[test]
fn unrouted_event_is_not_an_error() {
    let event = Event::with_id("SOMETHING_ELSE", 1);
    assert_eq!(
        reducer().try_reduce(&EntityTable::new(), &event),
        Ok(EntityTable::new())
    );
}

#[test]
fn custom_behavior_handles_unclaimed_events() {
    let reducer = reducer().with_custom_behavior(|state, event| {
        if event.kind == "TODO_STARRED" {
            let id = event.bare_id().unwrap();
            let mut starred = state.get(&id).cloned().unwrap_or_default();
            starred.insert("starred", true);
            state.with(id, starred)
        } else {
            state.clone()
        }
    });
    let state = table(json!({"1": {"id": 1}}));
    let state = reducer.reduce(&state, &Event::with_id("TODO_STARRED", 1));
    assert_eq!(state, table(json!({"1": {"id": 1, "starred": true}})));
}

#[test]
fn config_deserializes_from_camel_case() {
    let config: EntityTableConfig = serde_json::from_value(json!({
        "added": ["A"],
        "addedToArrayAttribute": ["T"],
        "idKey": "uuid",
        "cascade": {"LIST_REMOVED": "listId"},
    }))
    .unwrap();
    assert!(config.added.contains("A"));
    assert!(config.added_to_array_attribute.contains("T"));
    assert_eq!(config.id_key, "uuid");
    assert_eq!(config.cascade.get("LIST_REMOVED").map(String::as_str), Some("listId"));
}

// ── Properties ───────────────────────────────────────────────────

fn added_events() -> impl Strategy<Value = Vec<Event>> {
    prop::collection::vec((0i64..50, "[a-z]{0,8}"), 0..20).prop_map(|items| {
        items
            .into_iter()
            .map(|(id, text)| Event::new("TODO_ADDED", json!({"id": id, "text": text})))
            .collect()
    })
}

proptest! {
    #[test]
    fn clear_after_anything_is_empty(events in added_events()) {
        let reducer = reducer();
        let state = reducer.fold(&events);
        let cleared = reducer.reduce(&state, &Event::bare("TODOS_CLEARED"));
        prop_assert!(cleared.is_empty());

        let readded = reducer.reduce(&cleared, &Event::new("TODO_ADDED", json!({"id": 99})));
        prop_assert_eq!(readded.len(), 1);
        prop_assert!(readded.contains(&Id::Num(99)));
    }

    #[test]
    fn added_ids_are_all_present(events in added_events()) {
        let reducer = reducer();
        let state = reducer.fold(&events);
        for event in &events {
            prop_assert!(state.contains(&event.payload_id("id").unwrap()));
        }
    }

    #[test]
    fn unrouted_events_never_change_state(events in added_events(), kind in "[A-Z]{3,6}_X") {
        let reducer = reducer();
        let state = reducer.fold(&events);
        let next = reducer.reduce(&state, &Event::with_id(kind, 1));
        prop_assert_eq!(next, state);
    }
}
