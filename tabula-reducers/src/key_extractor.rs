//! Reducers that keep one attribute of the latest payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tabula_model::{EventSet, ReduceResult, Reducer, Router, Routing, Transitions};
use tabula_types::{DEFAULT_ID_KEY, Event, Id};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyExtractorConfig {
    pub set: EventSet,
    pub clear: EventSet,
    pub extraction_key: String,
    pub default: Value,
}

/// Keeps `payload[extractionKey]` of the latest "set" event.
#[derive(Debug, Clone, Default)]
pub struct KeyExtractorReducer {
    config: KeyExtractorConfig,
}

impl KeyExtractorReducer {
    #[must_use]
    pub fn new(config: KeyExtractorConfig) -> Self {
        Self { config }
    }
}

impl Transitions for KeyExtractorReducer {
    type State = Value;
    type Transition = Value;

    fn route(&self, event: &Event) -> Routing<Value> {
        let kind = event.kind.as_str();
        Router::new(event)
            .family("clear", self.config.clear.contains(kind), |_| {
                Some(self.config.default.clone())
            })
            .family("set", self.config.set.contains(kind), |e| {
                e.field(&self.config.extraction_key).cloned()
            })
            .finish()
    }

    fn apply(&self, _state: &Value, transition: Value) -> Value {
        transition
    }
}

impl Reducer for KeyExtractorReducer {
    type State = Value;

    fn initial(&self) -> Value {
        self.config.default.clone()
    }

    fn reduce(&self, state: &Value, event: &Event) -> Value {
        self.transition(state, event)
    }

    fn try_reduce(&self, state: &Value, event: &Event) -> ReduceResult<Value> {
        self.try_transition(state, event)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyExtractorByIdConfig {
    pub set: EventSet,
    pub clear: EventSet,
    pub extraction_key: String,
    pub id_key: String,
}

impl Default for KeyExtractorByIdConfig {
    fn default() -> Self {
        Self {
            set: EventSet::new(),
            clear: EventSet::new(),
            extraction_key: String::new(),
            id_key: DEFAULT_ID_KEY.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionTransition {
    Set(Id, Value),
    Forgotten(Id),
}

/// Keeps `payload[extractionKey]` per `payload[idKey]`.
#[derive(Debug, Clone, Default)]
pub struct KeyExtractorByIdReducer {
    config: KeyExtractorByIdConfig,
}

impl KeyExtractorByIdReducer {
    #[must_use]
    pub fn new(config: KeyExtractorByIdConfig) -> Self {
        Self { config }
    }
}

impl Transitions for KeyExtractorByIdReducer {
    type State = BTreeMap<Id, Value>;
    type Transition = ExtractionTransition;

    fn route(&self, event: &Event) -> Routing<ExtractionTransition> {
        let c = &self.config;
        let kind = event.kind.as_str();
        Router::new(event)
            .family("clear", c.clear.contains(kind), |e| {
                e.payload_id(&c.id_key).map(ExtractionTransition::Forgotten)
            })
            .family("set", c.set.contains(kind), |e| {
                let id = e.payload_id(&c.id_key)?;
                let value = e.field(&c.extraction_key).cloned().unwrap_or(Value::Null);
                Some(ExtractionTransition::Set(id, value))
            })
            .finish()
    }

    fn apply(
        &self,
        state: &BTreeMap<Id, Value>,
        transition: ExtractionTransition,
    ) -> BTreeMap<Id, Value> {
        let mut values = state.clone();
        match transition {
            ExtractionTransition::Set(id, value) => {
                values.insert(id, value);
            }
            ExtractionTransition::Forgotten(id) => {
                values.remove(&id);
            }
        }
        values
    }
}

impl Reducer for KeyExtractorByIdReducer {
    type State = BTreeMap<Id, Value>;

    fn initial(&self) -> BTreeMap<Id, Value> {
        BTreeMap::new()
    }

    fn reduce(&self, state: &BTreeMap<Id, Value>, event: &Event) -> BTreeMap<Id, Value> {
        self.transition(state, event)
    }

    fn try_reduce(
        &self,
        state: &BTreeMap<Id, Value>,
        event: &Event,
    ) -> ReduceResult<BTreeMap<Id, Value>> {
        self.try_transition(state, event)
    }
}
