//! Reducers holding at most one value.

use serde::{Deserialize, Serialize};
use tabula_model::{EventSet, ReduceResult, Reducer, Router, Routing, Transitions};
use tabula_types::{ErrorRecord, Event, Record};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SingletonConfig {
    pub populate: EventSet,
    pub update: EventSet,
    pub clear: EventSet,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SingletonTransition {
    Populated(Record),
    Updated(Record),
    Cleared,
}

/// One optional record (e.g. the signed-in user).
#[derive(Debug, Clone, Default)]
pub struct SingletonReducer {
    config: SingletonConfig,
}

impl SingletonReducer {
    #[must_use]
    pub fn new(config: SingletonConfig) -> Self {
        Self { config }
    }
}

impl Transitions for SingletonReducer {
    type State = Option<Record>;
    type Transition = SingletonTransition;

    fn route(&self, event: &Event) -> Routing<SingletonTransition> {
        let c = &self.config;
        let kind = event.kind.as_str();
        Router::new(event)
            .family("clear", c.clear.contains(kind), |_| {
                Some(SingletonTransition::Cleared)
            })
            .family("populate", c.populate.contains(kind), |e| {
                Record::from_value(&e.payload).map(SingletonTransition::Populated)
            })
            .family("update", c.update.contains(kind), |e| {
                Record::from_value(&e.payload).map(SingletonTransition::Updated)
            })
            .finish()
    }

    fn apply(&self, state: &Option<Record>, transition: SingletonTransition) -> Option<Record> {
        match transition {
            SingletonTransition::Populated(record) => Some(record),
            SingletonTransition::Updated(patch) => {
                Some(state.clone().unwrap_or_default().merged(&patch))
            }
            SingletonTransition::Cleared => None,
        }
    }
}

impl Reducer for SingletonReducer {
    type State = Option<Record>;

    fn initial(&self) -> Option<Record> {
        None
    }

    fn reduce(&self, state: &Option<Record>, event: &Event) -> Option<Record> {
        self.transition(state, event)
    }

    fn try_reduce(&self, state: &Option<Record>, event: &Event) -> ReduceResult<Option<Record>> {
        self.try_transition(state, event)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ErrorSlotConfig {
    pub populate: EventSet,
    pub clear: EventSet,
}

/// The latest error of a whole request, not tied to one identifier.
#[derive(Debug, Clone, Default)]
pub struct ErrorSlotReducer {
    config: ErrorSlotConfig,
}

impl ErrorSlotReducer {
    #[must_use]
    pub fn new(config: ErrorSlotConfig) -> Self {
        Self { config }
    }
}

impl Transitions for ErrorSlotReducer {
    type State = Option<ErrorRecord>;
    type Transition = Option<ErrorRecord>;

    fn route(&self, event: &Event) -> Routing<Option<ErrorRecord>> {
        let kind = event.kind.as_str();
        Router::new(event)
            .family("clear", self.config.clear.contains(kind), |_| Some(None))
            .family("populate", self.config.populate.contains(kind), |e| {
                ErrorRecord::from_payload(&e.payload).map(Some)
            })
            .finish()
    }

    fn apply(
        &self,
        _state: &Option<ErrorRecord>,
        transition: Option<ErrorRecord>,
    ) -> Option<ErrorRecord> {
        transition
    }
}

impl Reducer for ErrorSlotReducer {
    type State = Option<ErrorRecord>;

    fn initial(&self) -> Option<ErrorRecord> {
        None
    }

    fn reduce(&self, state: &Option<ErrorRecord>, event: &Event) -> Option<ErrorRecord> {
        self.transition(state, event)
    }

    fn try_reduce(
        &self,
        state: &Option<ErrorRecord>,
        event: &Event,
    ) -> ReduceResult<Option<ErrorRecord>> {
        self.try_transition(state, event)
    }
}
