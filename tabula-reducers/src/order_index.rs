//! Ordered, deduplicated sequence of identifiers (display order).
//!
//! The sequence is stored as slots: a "sorted" move past the end pads with
//! empty slots, and readers such as [`OrderIndex::ids`] and
//! [`OrderIndex::first`] skip them.

use crate::util::{array_move, id_list, index};
use serde::{Deserialize, Serialize};
use tabula_model::{EventSet, ReduceResult, Reducer, Router, Routing, Transitions};
use tabula_types::{DEFAULT_ID_KEY, Event, Id};
use tracing::debug;

/// Display order of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderIndex(Vec<Option<Id>>);

impl OrderIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an order from ids, dropping repeats.
    pub fn from_ids<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Id>,
    {
        let mut order = Self::new();
        order.extend_unique(ids.into_iter().map(Into::into));
        order
    }

    /// Present identifiers in order, skipping empty slots.
    pub fn ids(&self) -> impl Iterator<Item = &Id> {
        self.0.iter().flatten()
    }

    /// Raw slots, including padding.
    #[must_use]
    pub fn slots(&self) -> &[Option<Id>] {
        &self.0
    }

    /// First present identifier.
    #[must_use]
    pub fn first(&self) -> Option<&Id> {
        self.ids().next()
    }

    #[must_use]
    pub fn contains(&self, id: &Id) -> bool {
        self.ids().any(|i| i == id)
    }

    /// Slot position of `id`.
    #[must_use]
    pub fn position(&self, id: &Id) -> Option<usize> {
        self.0.iter().position(|slot| slot.as_ref() == Some(id))
    }

    /// Number of present identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids().count()
    }

    /// True when no identifier is present (padding may remain).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first().is_none()
    }

    fn extend_unique(&mut self, ids: impl IntoIterator<Item = Id>) {
        for id in ids {
            if !self.contains(&id) {
                self.0.push(Some(id));
            }
        }
    }
}

/// Which event types trigger which order-index family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderIndexConfig {
    pub added: EventSet,
    pub fetched: EventSet,
    pub replaced: EventSet,
    pub removed: EventSet,
    pub confirmed: EventSet,
    pub cleared: EventSet,
    pub sorted: EventSet,
    pub id_key: String,
    /// Insert "added" ids at the head instead of the tail.
    pub prefer_prepend: bool,
}

impl Default for OrderIndexConfig {
    fn default() -> Self {
        Self {
            added: EventSet::new(),
            fetched: EventSet::new(),
            replaced: EventSet::new(),
            removed: EventSet::new(),
            confirmed: EventSet::new(),
            cleared: EventSet::new(),
            sorted: EventSet::new(),
            id_key: DEFAULT_ID_KEY.to_owned(),
            prefer_prepend: false,
        }
    }
}

impl OrderIndexConfig {
    #[must_use]
    pub fn with_id_key(mut self, id_key: impl Into<String>) -> Self {
        self.id_key = id_key.into();
        self
    }

    #[must_use]
    pub fn prefer_prepend(mut self, prepend: bool) -> Self {
        self.prefer_prepend = prepend;
        self
    }
}

/// A decoded order-index transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderTransition {
    Added(Id),
    /// Append ids not yet present, keeping their incoming relative order.
    Merged(Vec<Id>),
    Replaced(Vec<Id>),
    Removed(Vec<Id>),
    Renamed { old_id: Id, new_id: Id },
    /// Bulk confirmation without a rename; the order is unaffected.
    ConfirmedAll,
    Cleared,
    Moved { old_index: usize, new_index: usize },
}

/// Configurable reducer over an [`OrderIndex`].
#[derive(Debug, Clone, Default)]
pub struct OrderIndexReducer {
    config: OrderIndexConfig,
}

impl OrderIndexReducer {
    #[must_use]
    pub fn new(config: OrderIndexConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &OrderIndexConfig {
        &self.config
    }

    fn order_list(event: &Event) -> Option<Vec<Id>> {
        event.field("order").and_then(id_list)
    }

    fn decode_confirmed(event: &Event) -> Option<OrderTransition> {
        let payload = event.object()?;
        match (payload.get("oldId"), payload.get("newId")) {
            (None, None) => Some(OrderTransition::ConfirmedAll),
            (Some(old), Some(new)) => Some(OrderTransition::Renamed {
                old_id: Id::from_value(old)?,
                new_id: Id::from_value(new)?,
            }),
            _ => None,
        }
    }

    fn decode_removed(&self, event: &Event) -> Option<Vec<Id>> {
        Self::order_list(event)
            .or_else(|| event.bare_id().map(|id| vec![id]))
            .or_else(|| event.payload_id(&self.config.id_key).map(|id| vec![id]))
    }
}

impl Transitions for OrderIndexReducer {
    type State = OrderIndex;
    type Transition = OrderTransition;

    fn route(&self, event: &Event) -> Routing<OrderTransition> {
        let c = &self.config;
        let kind = event.kind.as_str();

        Router::new(event)
            .family("added", c.added.contains(kind), |e| {
                e.payload_id(&c.id_key).map(OrderTransition::Added)
            })
            .family("fetched", c.fetched.contains(kind), |e| {
                Self::order_list(e).map(OrderTransition::Merged)
            })
            .family("replaced", c.replaced.contains(kind), |e| {
                Self::order_list(e).map(OrderTransition::Replaced)
            })
            .family("removed", c.removed.contains(kind), |e| {
                self.decode_removed(e).map(OrderTransition::Removed)
            })
            .family("confirmed", c.confirmed.contains(kind), Self::decode_confirmed)
            .family("cleared", c.cleared.contains(kind), |_| {
                Some(OrderTransition::Cleared)
            })
            .family("sorted", c.sorted.contains(kind), |e| {
                Some(OrderTransition::Moved {
                    old_index: index(e.field("oldIndex")?)?,
                    new_index: index(e.field("newIndex")?)?,
                })
            })
            .finish()
    }

    fn apply(&self, state: &OrderIndex, transition: OrderTransition) -> OrderIndex {
        match transition {
            OrderTransition::Added(id) => {
                if state.contains(&id) {
                    return state.clone();
                }
                let mut slots = state.0.clone();
                if self.config.prefer_prepend {
                    slots.insert(0, Some(id));
                } else {
                    slots.push(Some(id));
                }
                OrderIndex(slots)
            }

            OrderTransition::Merged(ids) => {
                let mut order = state.clone();
                order.extend_unique(ids);
                order
            }

            OrderTransition::Replaced(ids) => OrderIndex::from_ids(ids),

            OrderTransition::Removed(ids) => OrderIndex(
                state
                    .0
                    .iter()
                    .filter(|slot| slot.as_ref().is_none_or(|id| !ids.contains(id)))
                    .cloned()
                    .collect(),
            ),

            OrderTransition::Renamed { old_id, new_id } => {
                if !state.contains(&old_id) || old_id == new_id {
                    return state.clone();
                }
                // Renaming onto an id already listed collapses into that entry.
                let collapse = state.contains(&new_id);
                OrderIndex(
                    state
                        .0
                        .iter()
                        .filter_map(|slot| match slot {
                            Some(id) if *id == old_id && collapse => None,
                            Some(id) if *id == old_id => Some(Some(new_id.clone())),
                            other => Some(other.clone()),
                        })
                        .collect(),
                )
            }

            OrderTransition::ConfirmedAll => state.clone(),

            OrderTransition::Cleared => OrderIndex::new(),

            OrderTransition::Moved {
                old_index,
                new_index,
            } => match array_move(&state.0, old_index, new_index) {
                Some(slots) => OrderIndex(slots),
                None => {
                    debug!(old_index, len = state.0.len(), "sort source out of range");
                    state.clone()
                }
            },
        }
    }
}

impl Reducer for OrderIndexReducer {
    type State = OrderIndex;

    fn initial(&self) -> OrderIndex {
        OrderIndex::new()
    }

    fn reduce(&self, state: &OrderIndex, event: &Event) -> OrderIndex {
        self.transition(state, event)
    }

    fn try_reduce(&self, state: &OrderIndex, event: &Event) -> ReduceResult<OrderIndex> {
        self.try_transition(state, event)
    }
}
