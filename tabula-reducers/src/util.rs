//! Small helpers shared by the reducers.

use serde_json::Value;
use tabula_types::Id;

/// Equality for attribute values, applying identifier coercion when both
/// sides are identifiers (`5 == "5"`).
pub(crate) fn same_value(a: &Value, b: &Value) -> bool {
    match (Id::from_value(a), Id::from_value(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Decodes a JSON array whose every element is an identifier.
pub(crate) fn id_list(value: &Value) -> Option<Vec<Id>> {
    value.as_array()?.iter().map(Id::from_value).collect()
}

/// Reads a non-negative integer index.
pub(crate) fn index(value: &Value) -> Option<usize> {
    value.as_u64().and_then(|n| usize::try_from(n).ok())
}

/// Moves the slot at `old_index` to `new_index`.
///
/// Moving past the end pads with empty slots so the element lands exactly at
/// `new_index`. Returns `None` when `old_index` is out of range.
pub(crate) fn array_move<T: Clone>(
    slots: &[Option<T>],
    old_index: usize,
    new_index: usize,
) -> Option<Vec<Option<T>>> {
    if old_index >= slots.len() {
        return None;
    }
    let mut moved = slots.to_vec();
    if new_index >= moved.len() {
        moved.resize(new_index + 1, None);
    }
    let slot = moved.remove(old_index);
    moved.insert(new_index, slot);
    Some(moved)
}
