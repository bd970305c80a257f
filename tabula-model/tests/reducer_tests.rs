use serde_json::json;
use tabula_model::{Fallback, FnFallback, Inert, Reducer, Unchanged};
use tabula_types::Event;

/// Counts events whose type is "TICK".
struct Ticks;

impl Reducer for Ticks {
    type State = u32;

    fn initial(&self) -> u32 {
        0
    }

    fn reduce(&self, state: &u32, event: &Event) -> u32 {
        if event.kind == "TICK" { state + 1 } else { *state }
    }
}

#[test]
fn fold_replays_from_initial_state() {
    let events = vec![Event::bare("TICK"), Event::bare("TOCK"), Event::bare("TICK")];
    assert_eq!(Ticks.fold(&events), 2);
    assert_eq!(Ticks.fold_from(&10, &events), 12);
}

#[test]
fn default_try_reduce_never_fails() {
    assert_eq!(Ticks.try_reduce(&0, &Event::bare("TICK")), Ok(1));
}

#[test]
fn unchanged_returns_clone() {
    let state = vec![1, 2, 3];
    assert_eq!(Unchanged.apply(&state, &Event::bare("ANY")), state);
}

#[test]
fn fn_fallback_delegates() {
    let double = FnFallback(|s: &i64, e: &Event| {
        if e.kind == "DOUBLE" { s * 2 } else { *s }
    });
    assert_eq!(double.apply(&21, &Event::bare("DOUBLE")), 42);
    assert_eq!(double.apply(&21, &Event::new("OTHER", json!(1))), 21);
}

#[test]
fn inert_keeps_default() {
    let inert: Inert<Vec<u8>> = Inert::new();
    assert!(inert.initial().is_empty());
    assert_eq!(inert.reduce(&vec![7], &Event::bare("X")), vec![7]);
}
