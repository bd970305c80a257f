//! Entity table, order and selection composed over one event stream, with one
//! nested substate per identifier.
//!
//! Each event is first applied independently to the three slices. The
//! resulting draft is then settled by the passes in [`crate::rules`], and
//! finally forwarded to the nested reducer of the selected identifier only.
//!
//! Slices may disagree on a payload: the table can accept a shape the order
//! rejects. The event counts as rejected only when no slice accepted it.

use crate::rules::SettlePass;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;
use tabula_model::{EventSet, ReduceError, ReduceResult, Reducer, Routing, Transitions};
use tabula_reducers::{
    EntityTable, EntityTableConfig, EntityTableReducer, OrderIndex, OrderIndexConfig,
    OrderIndexReducer, SelectionConfig, SelectionReducer,
};
use tabula_types::{DEFAULT_ID_KEY, Event, Id};
use tracing::{debug, warn};

/// What happens to a substate once its identifier leaves the order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubstateRetention {
    /// Keep it; re-adding the id restores its substate.
    #[default]
    Retain,
    /// Drop it on the next event.
    Prune,
}

/// Which event types drive the multiplexer's slices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MultiplexerConfig {
    pub added: EventSet,
    pub fetched: EventSet,
    pub removed: EventSet,
    pub cleared: EventSet,
    pub replaced: EventSet,
    pub confirmed: EventSet,
    pub sorted: EventSet,
    pub prefer_prepend: bool,
    pub selected: EventSet,
    pub all_deselected: EventSet,
    pub id_key: String,
    pub retention: SubstateRetention,
}

impl Default for MultiplexerConfig {
    fn default() -> Self {
        Self {
            added: EventSet::new(),
            fetched: EventSet::new(),
            removed: EventSet::new(),
            cleared: EventSet::new(),
            replaced: EventSet::new(),
            confirmed: EventSet::new(),
            sorted: EventSet::new(),
            prefer_prepend: false,
            selected: EventSet::new(),
            all_deselected: EventSet::new(),
            id_key: DEFAULT_ID_KEY.to_owned(),
            retention: SubstateRetention::Retain,
        }
    }
}

impl MultiplexerConfig {
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

    #[must_use]
    pub fn with_retention(mut self, retention: SubstateRetention) -> Self {
        self.retention = retention;
        self
    }

    fn entity_table(&self) -> EntityTableConfig {
        EntityTableConfig {
            added: self.added.clone(),
            fetched: self.fetched.clone(),
            removed: self.removed.clone(),
            confirmed: self.confirmed.clone(),
            cleared: self.cleared.clone(),
            ..EntityTableConfig::default()
        }
        .with_id_key(self.id_key.clone())
    }

    fn order_index(&self) -> OrderIndexConfig {
        OrderIndexConfig {
            added: self.added.clone(),
            fetched: self.fetched.clone(),
            replaced: self.replaced.clone(),
            removed: self.removed.clone(),
            confirmed: self.confirmed.clone(),
            cleared: self.cleared.clone(),
            sorted: self.sorted.clone(),
            ..OrderIndexConfig::default()
        }
        .with_id_key(self.id_key.clone())
        .prefer_prepend(self.prefer_prepend)
    }

    fn selection(&self) -> SelectionConfig {
        SelectionConfig {
            selected: self.selected.clone(),
            all_deselected: self.all_deselected.clone(),
            default: None,
        }
    }
}

/// State of a [`SubstateMultiplexer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiplexerState<S> {
    pub by_id: EntityTable,
    pub order: OrderIndex,
    pub selected: Option<Id>,
    pub substates: BTreeMap<Id, S>,
}

impl<S> Default for MultiplexerState<S> {
    fn default() -> Self {
        Self {
            by_id: EntityTable::new(),
            order: OrderIndex::new(),
            selected: None,
            substates: BTreeMap::new(),
        }
    }
}

impl<S> MultiplexerState<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn substate(&self, id: &Id) -> Option<&S> {
        self.substates.get(id)
    }

    /// Substate of the selected identifier, if both exist.
    #[must_use]
    pub fn selected_substate(&self) -> Option<&S> {
        self.selected.as_ref().and_then(|id| self.substates.get(id))
    }

    /// Order members with no record in the entity table.
    pub fn dangling_ids(&self) -> Vec<&Id> {
        self.order
            .ids()
            .filter(|id| !self.by_id.contains(id))
            .collect()
    }
}

/// Tracks whether any slice accepted the event being composed.
#[derive(Default)]
struct SliceVerdict {
    accepted: bool,
    rejected: Vec<&'static str>,
}

impl SliceVerdict {
    fn step<T: Transitions>(&mut self, slice: &T, state: &T::State, event: &Event) -> T::State {
        match slice.route(event) {
            Routing::Matched { transition, .. } => {
                self.accepted = true;
                slice.apply(state, transition)
            }
            Routing::Rejected { families } => {
                for family in families {
                    if !self.rejected.contains(&family) {
                        self.rejected.push(family);
                    }
                }
                slice.unclaimed(state, event)
            }
            Routing::Unrouted => slice.unclaimed(state, event),
        }
    }

    /// Families that rejected the payload, when no slice accepted it.
    fn rejection(self) -> Option<Vec<&'static str>> {
        (!self.accepted && !self.rejected.is_empty()).then_some(self.rejected)
    }
}

/// Composes an entity table, an order and a selection, and keeps one nested
/// state per identifier ever selected.
#[derive(Clone)]
pub struct SubstateMultiplexer<R> {
    config: MultiplexerConfig,
    by_id: EntityTableReducer,
    order: OrderIndexReducer,
    selection: SelectionReducer,
    nested: R,
}

impl<R: Reducer> SubstateMultiplexer<R> {
    #[must_use]
    pub fn new(config: MultiplexerConfig, nested: R) -> Self {
        Self {
            by_id: EntityTableReducer::new(config.entity_table()),
            order: OrderIndexReducer::new(config.order_index()),
            selection: SelectionReducer::new(config.selection()),
            config,
            nested,
        }
    }

    #[must_use]
    pub fn config(&self) -> &MultiplexerConfig {
        &self.config
    }

    #[must_use]
    pub fn nested(&self) -> &R {
        &self.nested
    }

    fn compose(
        &self,
        state: &MultiplexerState<R::State>,
        event: &Event,
    ) -> (MultiplexerState<R::State>, Option<Vec<&'static str>>) {
        let mut verdict = SliceVerdict::default();
        let draft = MultiplexerState {
            by_id: verdict.step(&self.by_id, &state.by_id, event),
            order: verdict.step(&self.order, &state.order, event),
            selected: verdict.step(&self.selection, &state.selected, event),
            substates: state.substates.clone(),
        };
        (draft, verdict.rejection())
    }

    fn settle(
        &self,
        event: &Event,
        mut draft: MultiplexerState<R::State>,
    ) -> MultiplexerState<R::State> {
        for pass in SettlePass::ALL {
            let before = draft.selected.clone();
            pass.apply(&self.config, event, &mut draft);
            if draft.selected != before {
                debug!(
                    event_type = %event.kind,
                    pass = pass.name(),
                    from = ?before,
                    to = ?draft.selected,
                    "selection settled"
                );
            }
        }

        if self.config.retention == SubstateRetention::Prune {
            let MultiplexerState {
                order,
                selected,
                substates,
                ..
            } = &mut draft;
            substates.retain(|id, _| order.contains(id) || selected.as_ref() == Some(id));
        }
        draft
    }

    /// Hands the event to the nested reducer of the selected identifier,
    /// starting from its initial state the first time that id is selected.
    fn forward<E>(
        &self,
        mut state: MultiplexerState<R::State>,
        nested: impl FnOnce(&R::State) -> Result<R::State, E>,
    ) -> Result<MultiplexerState<R::State>, E> {
        let Some(id) = state.selected.clone() else {
            return Ok(state);
        };
        let next = match state.substates.get(&id) {
            Some(existing) => nested(existing)?,
            None => nested(&self.nested.initial())?,
        };
        state.substates.insert(id, next);
        Ok(state)
    }
}

impl<R: Reducer> Reducer for SubstateMultiplexer<R> {
    type State = MultiplexerState<R::State>;

    fn initial(&self) -> Self::State {
        MultiplexerState::new()
    }

    fn reduce(&self, state: &Self::State, event: &Event) -> Self::State {
        let (draft, rejected) = self.compose(state, event);
        if let Some(families) = rejected {
            warn!(
                event_type = %event.kind,
                families = ?families,
                "event dropped: no slice accepted the payload"
            );
        }
        let settled = self.settle(event, draft);
        let Ok(next) =
            self.forward::<Infallible>(settled, |substate| Ok(self.nested.reduce(substate, event)));
        next
    }

    fn try_reduce(&self, state: &Self::State, event: &Event) -> ReduceResult<Self::State> {
        let (draft, rejected) = self.compose(state, event);
        if let Some(families) = rejected {
            return Err(ReduceError::ShapeMismatch {
                event_type: event.kind.clone(),
                families,
            });
        }
        let settled = self.settle(event, draft);
        self.forward(settled, |substate| self.nested.try_reduce(substate, event))
    }
}
