use serde::{Deserialize, Serialize};
use tabula_model::{EventSet, ReduceResult, Reducer, Router, Routing, Transitions};
use tabula_types::Event;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CounterConfig {
    pub incremented: EventSet,
    pub decremented: EventSet,
    pub reset: EventSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterTransition {
    Incremented(i64),
    Decremented(i64),
    Reset,
}

/// Integer counter stepped by `payload.step` (1 when absent or zero).
#[derive(Debug, Clone, Default)]
pub struct CounterReducer {
    config: CounterConfig,
}

impl CounterReducer {
    #[must_use]
    pub fn new(config: CounterConfig) -> Self {
        Self { config }
    }
}

/// Step carried by a non-null payload.
fn step(event: &Event) -> Option<i64> {
    if !event.has_payload() {
        return None;
    }
    Some(
        event
            .field("step")
            .and_then(|s| s.as_i64())
            .filter(|s| *s != 0)
            .unwrap_or(1),
    )
}

impl Transitions for CounterReducer {
    type State = i64;
    type Transition = CounterTransition;

    fn route(&self, event: &Event) -> Routing<CounterTransition> {
        let kind = event.kind.as_str();
        Router::new(event)
            .family("incremented", self.config.incremented.contains(kind), |e| {
                step(e).map(CounterTransition::Incremented)
            })
            .family("decremented", self.config.decremented.contains(kind), |e| {
                step(e).map(CounterTransition::Decremented)
            })
            .family("reset", self.config.reset.contains(kind), |_| {
                Some(CounterTransition::Reset)
            })
            .finish()
    }

    fn apply(&self, state: &i64, transition: CounterTransition) -> i64 {
        match transition {
            CounterTransition::Incremented(step) => state.saturating_add(step),
            CounterTransition::Decremented(step) => state.saturating_sub(step),
            CounterTransition::Reset => 0,
        }
    }
}

impl Reducer for CounterReducer {
    type State = i64;

    fn initial(&self) -> i64 {
        0
    }

    fn reduce(&self, state: &i64, event: &Event) -> i64 {
        self.transition(state, event)
    }

    fn try_reduce(&self, state: &i64, event: &Event) -> ReduceResult<i64> {
        self.try_transition(state, event)
    }
}
