//! Single optional selected identifier.
//!
//! On its own the tracker does not know about any order: it records what the
//! host selected. Keeping the selection inside the order is the job of the
//! multiplexer's consistency passes.

use serde::{Deserialize, Serialize};
use tabula_model::{EventSet, ReduceResult, Reducer, Router, Routing, Transitions};
use tabula_types::{Event, Id};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectionConfig {
    pub selected: EventSet,
    pub all_deselected: EventSet,
    /// Selection before any event, and after "allDeselected".
    pub default: Option<Id>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionTransition {
    Selected(Id),
    Deselected,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionReducer {
    config: SelectionConfig,
}

impl SelectionReducer {
    #[must_use]
    pub fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }
}

impl Transitions for SelectionReducer {
    type State = Option<Id>;
    type Transition = SelectionTransition;

    fn route(&self, event: &Event) -> Routing<SelectionTransition> {
        let kind = event.kind.as_str();
        Router::new(event)
            .family("selected", self.config.selected.contains(kind), |e| {
                e.bare_id().map(SelectionTransition::Selected)
            })
            .family("allDeselected", self.config.all_deselected.contains(kind), |_| {
                Some(SelectionTransition::Deselected)
            })
            .finish()
    }

    fn apply(&self, _state: &Option<Id>, transition: SelectionTransition) -> Option<Id> {
        match transition {
            SelectionTransition::Selected(id) => Some(id),
            SelectionTransition::Deselected => self.config.default.clone(),
        }
    }
}

impl Reducer for SelectionReducer {
    type State = Option<Id>;

    fn initial(&self) -> Option<Id> {
        self.config.default.clone()
    }

    fn reduce(&self, state: &Option<Id>, event: &Event) -> Option<Id> {
        self.transition(state, event)
    }

    fn try_reduce(&self, state: &Option<Id>, event: &Event) -> ReduceResult<Option<Id>> {
        self.try_transition(state, event)
    }
}
