//! Identifiers with a request in flight.
//!
//! A multiset: the same id may be started more than once, and a single
//! success or failure for it clears every occurrence.

use serde::{Deserialize, Serialize};
use tabula_model::{EventSet, ReduceResult, Reducer, Router, Routing, Transitions};
use tabula_types::{DEFAULT_ID_KEY, Event, Id};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FetchStatusSet(Vec<Id>);

impl FetchStatusSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: &Id) -> bool {
        self.0.contains(id)
    }

    /// How many fetches were started for `id` and not yet settled.
    #[must_use]
    pub fn count(&self, id: &Id) -> usize {
        self.0.iter().filter(|i| *i == id).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Id> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FetchStatusConfig {
    pub started: EventSet,
    pub succeed: EventSet,
    pub failed: EventSet,
    pub id_key: String,
}

impl Default for FetchStatusConfig {
    fn default() -> Self {
        Self {
            started: EventSet::new(),
            succeed: EventSet::new(),
            failed: EventSet::new(),
            id_key: DEFAULT_ID_KEY.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchTransition {
    Started(Id),
    Settled(Id),
}

#[derive(Debug, Clone, Default)]
pub struct FetchStatusReducer {
    config: FetchStatusConfig,
}

impl FetchStatusReducer {
    #[must_use]
    pub fn new(config: FetchStatusConfig) -> Self {
        Self { config }
    }

    fn target(&self, event: &Event) -> Option<Id> {
        event
            .bare_id()
            .or_else(|| event.payload_id(&self.config.id_key))
    }
}

impl Transitions for FetchStatusReducer {
    type State = FetchStatusSet;
    type Transition = FetchTransition;

    fn route(&self, event: &Event) -> Routing<FetchTransition> {
        let c = &self.config;
        let kind = event.kind.as_str();
        Router::new(event)
            .family("started", c.started.contains(kind), |e| {
                self.target(e).map(FetchTransition::Started)
            })
            // Failures are reported as error records keyed by `objectId`.
            .family("failed", c.failed.contains(kind), |e| {
                e.payload_id("objectId").map(FetchTransition::Settled)
            })
            .family("succeed", c.succeed.contains(kind), |e| {
                self.target(e).map(FetchTransition::Settled)
            })
            .finish()
    }

    fn apply(&self, state: &FetchStatusSet, transition: FetchTransition) -> FetchStatusSet {
        match transition {
            FetchTransition::Started(id) => {
                let mut ids = state.0.clone();
                ids.push(id);
                FetchStatusSet(ids)
            }
            FetchTransition::Settled(id) => {
                FetchStatusSet(state.0.iter().filter(|i| **i != id).cloned().collect())
            }
        }
    }
}

impl Reducer for FetchStatusReducer {
    type State = FetchStatusSet;

    fn initial(&self) -> FetchStatusSet {
        FetchStatusSet::new()
    }

    fn reduce(&self, state: &FetchStatusSet, event: &Event) -> FetchStatusSet {
        self.transition(state, event)
    }

    fn try_reduce(&self, state: &FetchStatusSet, event: &Event) -> ReduceResult<FetchStatusSet> {
        self.try_transition(state, event)
    }
}
