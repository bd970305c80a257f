use serde::{Deserialize, Serialize};
use tabula_model::{EventSet, ReduceResult, Reducer, Router, Routing, Transitions};
use tabula_types::Event;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimestampConfig {
    pub set: EventSet,
    pub clear: EventSet,
    /// Attribute read from object payloads.
    pub timestamp_key: String,
    pub default: i64,
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            set: EventSet::new(),
            clear: EventSet::new(),
            timestamp_key: "timestamp".to_owned(),
            default: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampTransition {
    Set(i64),
    Cleared,
}

/// Last-seen timestamp (e.g. of the latest successful fetch).
#[derive(Debug, Clone, Default)]
pub struct TimestampReducer {
    config: TimestampConfig,
}

impl TimestampReducer {
    #[must_use]
    pub fn new(config: TimestampConfig) -> Self {
        Self { config }
    }
}

impl Transitions for TimestampReducer {
    type State = i64;
    type Transition = TimestampTransition;

    fn route(&self, event: &Event) -> Routing<TimestampTransition> {
        let kind = event.kind.as_str();
        Router::new(event)
            .family("clear", self.config.clear.contains(kind), |_| {
                Some(TimestampTransition::Cleared)
            })
            .family("set", self.config.set.contains(kind), |e| {
                let value = match e.object() {
                    Some(_) => e.field(&self.config.timestamp_key)?,
                    None => &e.payload,
                };
                value.as_i64().map(TimestampTransition::Set)
            })
            .finish()
    }

    fn apply(&self, _state: &i64, transition: TimestampTransition) -> i64 {
        match transition {
            TimestampTransition::Set(at) => at,
            TimestampTransition::Cleared => self.config.default,
        }
    }
}

impl Reducer for TimestampReducer {
    type State = i64;

    fn initial(&self) -> i64 {
        self.config.default
    }

    fn reduce(&self, state: &i64, event: &Event) -> i64 {
        self.transition(state, event)
    }

    fn try_reduce(&self, state: &i64, event: &Event) -> ReduceResult<i64> {
        self.try_transition(state, event)
    }
}
