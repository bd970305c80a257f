use pretty_assertions::assert_eq;
use serde_json::json;
use tabula_types::{CONFIRMED_KEY, Id, Record};

fn record(value: serde_json::Value) -> Record {
    Record::try_from(value).unwrap()
}

// ── Construction ─────────────────────────────────────────────────

#[test]
fn try_from_rejects_non_objects() {
    assert!(Record::try_from(json!([1, 2])).is_err());
    assert!(Record::try_from(json!(3)).is_err());
}

#[test]
fn id_reads_configured_key() {
    let r = record(json!({"id": "7", "uuid": "abc"}));
    assert_eq!(r.id("id"), Some(Id::Num(7)));
    assert_eq!(r.id("uuid"), Some(Id::from("abc")));
    assert_eq!(r.id("missing"), None);
}

// ── Merging ──────────────────────────────────────────────────────

#[test]
fn merge_overwrites_shallowly() {
    let base = record(json!({"a": 1, "nested": {"x": 1, "y": 2}}));
    let patch = record(json!({"nested": {"x": 9}, "b": 2}));
    assert_eq!(
        base.merged(&patch),
        record(json!({"a": 1, "b": 2, "nested": {"x": 9}}))
    );
}

#[test]
fn without_drops_listed_keys() {
    let r = record(json!({"order": [1], "a": 1, "b": 2}));
    assert_eq!(r.without(&["order", "b"]), record(json!({"a": 1})));
}

#[test]
fn confirm_stamps_flag() {
    let mut r = Record::new();
    assert!(!r.is_confirmed());
    r.confirm();
    assert!(r.is_confirmed());
    assert_eq!(r.get(CONFIRMED_KEY), Some(&json!(true)));
}

// ── JSON pointer helpers ─────────────────────────────────────────

#[test]
fn pointer_helpers_resolve_nested_paths() {
    let r = record(json!({"meta": {"author": "Ada", "score": 3.5, "ok": true}, "a/b": 1}));
    assert_eq!(r.get_str("/meta/author"), Some("Ada"));
    assert_eq!(r.get_number("/meta/score"), Some(3.5));
    assert_eq!(r.get_bool("/meta/ok"), Some(true));
    assert_eq!(r.pointer("/a~1b"), Some(&json!(1)));
    assert_eq!(r.pointer("meta"), None);
    assert_eq!(r.get_str("/meta/missing"), None);
}

#[test]
fn list_only_returns_arrays() {
    let r = record(json!({"tags": ["a"], "name": "x"}));
    assert_eq!(r.list("tags"), Some(&vec![json!("a")]));
    assert_eq!(r.list("name"), None);
}
