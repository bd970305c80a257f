use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::BTreeMap;
use tabula_model::{EventSet, Reducer};
use tabula_reducers::{SingletonConfig, SingletonReducer};
use tabula_store::{
    MultiplexerConfig, MultiplexerState, SelectionError, SelectorSet, SubstateMultiplexer,
    reselect, selected_substate,
};
use tabula_types::{Event, Id, Record};

fn state_with(selected: Option<i64>, substates: &[(i64, i64)]) -> MultiplexerState<i64> {
    MultiplexerState {
        selected: selected.map(Id::Num),
        substates: substates.iter().map(|(id, s)| (Id::Num(*id), *s)).collect(),
        ..MultiplexerState::new()
    }
}

// ── Single selector ──────────────────────────────────────────────

#[test]
fn reselect_reads_selected_substate() {
    let doubled = reselect(|count: &i64| count * 2);
    assert_eq!(doubled(&state_with(Some(1), &[(1, 21), (2, 5)])), Ok(42));
}

#[test]
fn reselect_fails_without_selection() {
    let doubled = reselect(|count: &i64| count * 2);
    assert_eq!(
        doubled(&state_with(None, &[(1, 21)])),
        Err(SelectionError::NoSelection)
    );
}

#[test]
fn reselect_fails_on_missing_substate() {
    assert_eq!(
        selected_substate(&state_with(Some(3), &[(1, 21)])),
        Err(SelectionError::MissingSubstate(Id::Num(3)))
    );
    assert_eq!(
        SelectionError::MissingSubstate(Id::Num(3)).to_string(),
        "selected id `3` has no substate"
    );
}

// ── Selector sets ────────────────────────────────────────────────

fn selectors() -> SelectorSet<i64, i64> {
    SelectorSet::new()
        .with("count", |count: &i64| *count)
        .with("negated", |count: &i64| -count)
        .with("squared", |count: &i64| count * count)
        .with("default", |_: &i64| 0)
        .exclude(["squared"])
}

#[test]
fn set_hides_default_and_excluded_names() {
    let set = selectors();
    let names: Vec<&str> = set.names().collect();
    assert_eq!(names, vec!["count", "negated"]);
}

#[test]
fn set_runs_named_selector() {
    let state = state_with(Some(1), &[(1, 4)]);
    assert_eq!(selectors().select("negated", &state), Ok(-4));
    assert_eq!(
        selectors().select("squared", &state),
        Err(SelectionError::UnknownSelector("squared".into()))
    );
    assert_eq!(
        selectors().select("missing", &state),
        Err(SelectionError::UnknownSelector("missing".into()))
    );
}

#[test]
fn set_runs_every_exposed_selector() {
    let state = state_with(Some(1), &[(1, 4)]);
    assert_eq!(
        selectors().select_all(&state),
        Ok(BTreeMap::from([("count".to_owned(), 4), ("negated".to_owned(), -4)]))
    );
    assert_eq!(
        selectors().select_all(&state_with(None, &[])),
        Err(SelectionError::NoSelection)
    );
}

// ── Through a live multiplexer ───────────────────────────────────

#[test]
fn selectors_follow_the_multiplexer_selection() {
    let mux = SubstateMultiplexer::new(
        MultiplexerConfig {
            added: EventSet::of(["DOC_ADDED"]),
            selected: EventSet::of(["DOC_SELECTED"]),
            ..MultiplexerConfig::default()
        },
        SingletonReducer::new(SingletonConfig {
            update: EventSet::of(["DRAFT_EDITED"]),
            ..SingletonConfig::default()
        }),
    );
    let title = reselect(|draft: &Option<Record>| {
        draft
            .as_ref()
            .and_then(|d| d.get_str("/title"))
            .map(str::to_owned)
    });

    let state = mux.fold(&[
        Event::new("DOC_ADDED", json!({"id": 1})),
        Event::new("DOC_ADDED", json!({"id": 2})),
        Event::new("DRAFT_EDITED", json!({"title": "first"})),
        Event::with_id("DOC_SELECTED", 2),
    ]);
    assert_eq!(title(&state), Ok(None));

    let state = mux.reduce(&state, &Event::with_id("DOC_SELECTED", 1));
    assert_eq!(title(&state), Ok(Some("first".to_owned())));
}
