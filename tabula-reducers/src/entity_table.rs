//! Entity table: the identifier → record map at the heart of a normalized store.
//!
//! The reducer recognises eleven transition families, checked in a fixed
//! precedence order:
//!
//! added, updated, updatedInBulk, fetched, removed, confirmed,
//! addedToArrayAttribute, removedFromArrayAttribute, replacedInArrayAttribute,
//! cascade, cleared.
//!
//! A family applies only if the event type is registered for it *and* the
//! payload decodes into that family's shape. Otherwise routing falls through
//! to the next family, and finally to the configured [`Fallback`].

use crate::util::{id_list, index, same_value};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tabula_model::{
    EventSet, Fallback, FnFallback, ReduceResult, Reducer, Router, Routing, Transitions, Unchanged,
};
use tabula_types::{DEFAULT_ID_KEY, Event, Id, Record};
use tracing::debug;

/// Identifier → record mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityTable(BTreeMap<Id, Record>);

impl EntityTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &Id) -> Option<&Record> {
        self.0.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &Id) -> bool {
        self.0.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &Id> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Id, &Record)> {
        self.0.iter()
    }

    /// Returns a copy with `record` stored at `id`.
    #[must_use]
    pub fn with(&self, id: Id, record: Record) -> Self {
        let mut table = self.clone();
        table.0.insert(id, record);
        table
    }
}

impl FromIterator<(Id, Record)> for EntityTable {
    fn from_iter<I: IntoIterator<Item = (Id, Record)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Which event types trigger which entity-table family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EntityTableConfig {
    pub added: EventSet,
    pub updated: EventSet,
    pub updated_in_bulk: EventSet,
    pub fetched: EventSet,
    pub removed: EventSet,
    pub confirmed: EventSet,
    pub added_to_array_attribute: EventSet,
    pub removed_from_array_attribute: EventSet,
    pub replaced_in_array_attribute: EventSet,
    pub cleared: EventSet,
    /// Merged under every record created by "added" or "fetched".
    pub default_attributes: Record,
    pub id_key: String,
    /// Event type → foreign-key attribute for one-level cascade deletes.
    pub cascade: BTreeMap<String, String>,
}

impl Default for EntityTableConfig {
    fn default() -> Self {
        Self {
            added: EventSet::new(),
            updated: EventSet::new(),
            updated_in_bulk: EventSet::new(),
            fetched: EventSet::new(),
            removed: EventSet::new(),
            confirmed: EventSet::new(),
            added_to_array_attribute: EventSet::new(),
            removed_from_array_attribute: EventSet::new(),
            replaced_in_array_attribute: EventSet::new(),
            cleared: EventSet::new(),
            default_attributes: Record::new(),
            id_key: DEFAULT_ID_KEY.to_owned(),
            cascade: BTreeMap::new(),
        }
    }
}

impl EntityTableConfig {
    #[must_use]
    pub fn with_id_key(mut self, id_key: impl Into<String>) -> Self {
        self.id_key = id_key.into();
        self
    }

    #[must_use]
    pub fn with_default_attributes(mut self, defaults: Record) -> Self {
        self.default_attributes = defaults;
        self
    }

    /// Deletes records whose `foreign_key` equals the id carried by `event_type`.
    #[must_use]
    pub fn cascade_on(
        mut self,
        event_type: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        self.cascade.insert(event_type.into(), foreign_key.into());
        self
    }
}

/// A decoded entity-table transition.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityTransition {
    Added { id: Id, record: Record },
    Updated { id: Id, attributes: Record },
    /// `{order: [ids], ...attributes}`: merge into every listed id, creating missing ones.
    MergedInBulk { order: Vec<Id>, attributes: Record },
    /// `{entities: {id → partial}}`: merge into ids that already exist.
    PatchedInBulk(BTreeMap<Id, Record>),
    Fetched(BTreeMap<Id, Record>),
    /// Bare id, `{[idKey]: id}` or `{order: [ids]}`.
    Removed(Vec<Id>),
    Renamed { old_id: Id, new_id: Id, extra: Record },
    ConfirmedAll,
    ArrayInserted(ArrayEdit),
    ArrayRemoved(ArrayEdit),
    ArrayReplaced(ArrayReplacement),
    Cascaded { foreign_key: String, removed: Id },
    Cleared,
}

/// Values added to or removed from a list attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayEdit {
    pub id: Id,
    pub key: String,
    pub values: Vec<Value>,
    /// Insertion point for additions; `None` appends.
    pub at_index: Option<usize>,
}

/// Positional `old_values[i] → new_values[i]` substitution in a list attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayReplacement {
    pub id: Id,
    pub key: String,
    pub old_values: Vec<Value>,
    pub new_values: Vec<Value>,
}

const OLD_ID: &str = "oldId";
const NEW_ID: &str = "newId";

/// Configurable reducer over an [`EntityTable`].
#[derive(Clone)]
pub struct EntityTableReducer {
    config: EntityTableConfig,
    fallback: Arc<dyn Fallback<EntityTable>>,
}

impl EntityTableReducer {
    #[must_use]
    pub fn new(config: EntityTableConfig) -> Self {
        Self {
            config,
            fallback: Arc::new(Unchanged),
        }
    }

    /// Replaces the strategy used when no family claims an event.
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Fallback<EntityTable> + 'static) -> Self {
        self.fallback = Arc::new(fallback);
        self
    }

    /// Shorthand for [`Self::with_fallback`] with a plain function.
    #[must_use]
    pub fn with_custom_behavior<F>(self, behavior: F) -> Self
    where
        F: Fn(&EntityTable, &Event) -> EntityTable + Send + Sync + 'static,
    {
        self.with_fallback(FnFallback(behavior))
    }

    #[must_use]
    pub fn config(&self) -> &EntityTableConfig {
        &self.config
    }

    fn keyed_record(&self, event: &Event) -> Option<(Id, Record)> {
        let id = event.payload_id(&self.config.id_key)?;
        Some((id, Record::from_value(&event.payload)?))
    }

    fn decode_bulk(&self, event: &Event) -> Option<EntityTransition> {
        let payload = event.object()?;
        if let Some(order) = payload.get("order").and_then(id_list) {
            let attributes = Record::from(payload.clone()).without(&["order"]);
            return Some(EntityTransition::MergedInBulk { order, attributes });
        }
        entities(payload).map(EntityTransition::PatchedInBulk)
    }

    fn decode_removed(&self, event: &Event) -> Option<Vec<Id>> {
        event
            .field("order")
            .and_then(id_list)
            .or_else(|| event.bare_id().map(|id| vec![id]))
            .or_else(|| event.payload_id(&self.config.id_key).map(|id| vec![id]))
    }

    fn decode_confirmed(&self, event: &Event) -> Option<EntityTransition> {
        let payload = event.object()?;
        match (payload.get(OLD_ID), payload.get(NEW_ID)) {
            (None, None) => Some(EntityTransition::ConfirmedAll),
            (Some(old), Some(new)) => Some(EntityTransition::Renamed {
                old_id: Id::from_value(old)?,
                new_id: Id::from_value(new)?,
                extra: Record::from(payload.clone()).without(&[OLD_ID, NEW_ID]),
            }),
            _ => None,
        }
    }

    fn decode_array_edit(&self, event: &Event) -> Option<ArrayEdit> {
        let payload = event.object()?;
        let id = event.payload_id(&self.config.id_key)?;
        let key = payload.get("key")?.as_str()?.to_owned();
        let values = match payload.get("values").or_else(|| payload.get("order")) {
            Some(values) => values.as_array()?.clone(),
            None => Vec::new(),
        };
        let at_index = match payload.get("atIndex") {
            Some(at) => Some(index(at)?),
            None => None,
        };
        Some(ArrayEdit {
            id,
            key,
            values,
            at_index,
        })
    }

    fn decode_array_replacement(&self, event: &Event) -> Option<ArrayReplacement> {
        let payload = event.object()?;
        let id = event.payload_id(&self.config.id_key)?;
        let key = payload.get("key")?.as_str()?.to_owned();
        let list = |name: &str| match payload.get(name) {
            Some(values) => values.as_array().cloned(),
            None => Some(Vec::new()),
        };
        let old_values = list("oldValues")?;
        let new_values = list("newValues")?;
        (old_values.len() == new_values.len()).then_some(ArrayReplacement {
            id,
            key,
            old_values,
            new_values,
        })
    }

    fn with_defaults(&self, record: &Record) -> Record {
        self.config.default_attributes.merged(record)
    }

    /// Applies `edit` to the list attribute `key` of record `id`.
    ///
    /// Missing records and non-list attributes leave the table unchanged;
    /// a missing attribute counts as an empty list.
    fn edit_list<F>(&self, state: &EntityTable, id: &Id, key: &str, edit: F) -> EntityTable
    where
        F: FnOnce(&[Value]) -> Vec<Value>,
    {
        let Some(record) = state.get(id) else {
            debug!(%id, "array attribute edit targets a missing record");
            return state.clone();
        };
        let current = match record.get(key) {
            None => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(_) => {
                debug!(%id, key, "array attribute edit targets a non-list attribute");
                return state.clone();
            }
        };
        let mut updated = record.clone();
        updated.insert(key, Value::Array(edit(&current)));
        state.with(id.clone(), updated)
    }
}

fn entities(payload: &Map<String, Value>) -> Option<BTreeMap<Id, Record>> {
    payload
        .get("entities")?
        .as_object()?
        .iter()
        .map(|(key, value)| Some((Id::parse(key), Record::from_value(value)?)))
        .collect()
}

fn contains_value(values: &[Value], needle: &Value) -> bool {
    values.iter().any(|v| same_value(v, needle))
}

impl Transitions for EntityTableReducer {
    type State = EntityTable;
    type Transition = EntityTransition;

    fn route(&self, event: &Event) -> Routing<EntityTransition> {
        let c = &self.config;
        let kind = event.kind.as_str();
        let cascade_key = c.cascade.get(kind);

        Router::new(event)
            .family("added", c.added.contains(kind), |e| {
                self.keyed_record(e)
                    .map(|(id, record)| EntityTransition::Added { id, record })
            })
            .family("updated", c.updated.contains(kind), |e| {
                self.keyed_record(e)
                    .map(|(id, attributes)| EntityTransition::Updated { id, attributes })
            })
            .family("updatedInBulk", c.updated_in_bulk.contains(kind), |e| {
                self.decode_bulk(e)
            })
            .family("fetched", c.fetched.contains(kind), |e| {
                e.object().and_then(entities).map(EntityTransition::Fetched)
            })
            .family("removed", c.removed.contains(kind), |e| {
                self.decode_removed(e).map(EntityTransition::Removed)
            })
            .family("confirmed", c.confirmed.contains(kind), |e| {
                self.decode_confirmed(e)
            })
            .family(
                "addedToArrayAttribute",
                c.added_to_array_attribute.contains(kind),
                |e| self.decode_array_edit(e).map(EntityTransition::ArrayInserted),
            )
            .family(
                "removedFromArrayAttribute",
                c.removed_from_array_attribute.contains(kind),
                |e| self.decode_array_edit(e).map(EntityTransition::ArrayRemoved),
            )
            .family(
                "replacedInArrayAttribute",
                c.replaced_in_array_attribute.contains(kind),
                |e| {
                    self.decode_array_replacement(e)
                        .map(EntityTransition::ArrayReplaced)
                },
            )
            .family("cascade", cascade_key.is_some(), |e| {
                let foreign_key = cascade_key?.clone();
                e.bare_id()
                    .map(|removed| EntityTransition::Cascaded { foreign_key, removed })
            })
            .family("cleared", c.cleared.contains(kind), |_| {
                Some(EntityTransition::Cleared)
            })
            .finish()
    }

    fn apply(&self, state: &EntityTable, transition: EntityTransition) -> EntityTable {
        match transition {
            EntityTransition::Added { id, record } => state.with(id, self.with_defaults(&record)),

            EntityTransition::Updated { id, attributes } => {
                let merged = state.get(&id).cloned().unwrap_or_default().merged(&attributes);
                state.with(id, merged)
            }

            EntityTransition::MergedInBulk { order, attributes } => {
                let mut table = state.clone();
                for id in order {
                    let merged = table.get(&id).cloned().unwrap_or_default().merged(&attributes);
                    table.0.insert(id, merged);
                }
                table
            }

            EntityTransition::PatchedInBulk(patches) => {
                let mut table = state.clone();
                for (id, patch) in patches {
                    if let Some(record) = table.0.get_mut(&id) {
                        record.merge(&patch);
                    }
                }
                table
            }

            EntityTransition::Fetched(records) => {
                let mut table = state.clone();
                for (id, record) in records {
                    let mut fresh = self.with_defaults(&record);
                    fresh.confirm();
                    table.0.insert(id, fresh);
                }
                table
            }

            EntityTransition::Removed(ids) => {
                let mut table = state.clone();
                for id in &ids {
                    table.0.remove(id);
                }
                table
            }

            EntityTransition::Renamed {
                old_id,
                new_id,
                extra,
            } => {
                let mut table = state.clone();
                let Some(mut record) = table.0.remove(&old_id) else {
                    debug!(%old_id, %new_id, "confirmation for unknown id ignored");
                    return table;
                };
                record.merge(&extra);
                record.insert(self.config.id_key.as_str(), new_id.to_value());
                record.confirm();
                table.0.insert(new_id, record);
                table
            }

            EntityTransition::ConfirmedAll => {
                let mut table = state.clone();
                for record in table.0.values_mut() {
                    record.confirm();
                }
                table
            }

            EntityTransition::ArrayInserted(edit) => {
                self.edit_list(state, &edit.id, &edit.key, |current| {
                    let mut additions: Vec<Value> = Vec::new();
                    for value in edit.values {
                        if !contains_value(current, &value) && !contains_value(&additions, &value) {
                            additions.push(value);
                        }
                    }
                    let at = edit.at_index.unwrap_or(current.len()).min(current.len());
                    let mut list = current[..at].to_vec();
                    list.extend(additions);
                    list.extend_from_slice(&current[at..]);
                    list
                })
            }

            EntityTransition::ArrayRemoved(edit) => {
                self.edit_list(state, &edit.id, &edit.key, |current| {
                    current
                        .iter()
                        .filter(|v| !contains_value(&edit.values, v))
                        .cloned()
                        .collect()
                })
            }

            EntityTransition::ArrayReplaced(swap) => {
                self.edit_list(state, &swap.id, &swap.key, |current| {
                    current
                        .iter()
                        .map(|v| {
                            swap.old_values
                                .iter()
                                .position(|old| same_value(old, v))
                                .and_then(|i| swap.new_values.get(i))
                                .unwrap_or(v)
                                .clone()
                        })
                        .collect()
                })
            }

            // One level only: dependents of the deleted records are not visited.
            EntityTransition::Cascaded {
                foreign_key,
                removed,
            } => {
                let target = removed.to_value();
                state
                    .iter()
                    .filter(|(_, record)| {
                        record
                            .get(&foreign_key)
                            .is_none_or(|fk| !same_value(fk, &target))
                    })
                    .map(|(id, record)| (id.clone(), record.clone()))
                    .collect()
            }

            EntityTransition::Cleared => EntityTable::new(),
        }
    }

    fn unclaimed(&self, state: &EntityTable, event: &Event) -> EntityTable {
        self.fallback.apply(state, event)
    }
}

impl Reducer for EntityTableReducer {
    type State = EntityTable;

    fn initial(&self) -> EntityTable {
        EntityTable::new()
    }

    fn reduce(&self, state: &EntityTable, event: &Event) -> EntityTable {
        self.transition(state, event)
    }

    fn try_reduce(&self, state: &EntityTable, event: &Event) -> ReduceResult<EntityTable> {
        self.try_transition(state, event)
    }
}
