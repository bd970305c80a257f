//! Per-identifier error records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tabula_model::{EventSet, ReduceResult, Reducer, Router, Routing, Transitions};
use tabula_types::{DEFAULT_ID_KEY, ErrorRecord, Event, Id};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorTable(BTreeMap<Id, ErrorRecord>);

impl ErrorTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &Id) -> Option<&ErrorRecord> {
        self.0.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Id, &ErrorRecord)> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ErrorTableConfig {
    pub populate: EventSet,
    pub clear: EventSet,
    pub id_key: String,
}

impl Default for ErrorTableConfig {
    fn default() -> Self {
        Self {
            populate: EventSet::new(),
            clear: EventSet::new(),
            id_key: DEFAULT_ID_KEY.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorTransition {
    Populated(Id, ErrorRecord),
    Cleared(Id),
}

#[derive(Debug, Clone, Default)]
pub struct ErrorTableReducer {
    config: ErrorTableConfig,
}

impl ErrorTableReducer {
    #[must_use]
    pub fn new(config: ErrorTableConfig) -> Self {
        Self { config }
    }

    /// Keyed by `objectId` when present, otherwise by the configured id attribute.
    fn decode_populate(&self, event: &Event) -> Option<ErrorTransition> {
        let id = event
            .payload_id("objectId")
            .or_else(|| event.payload_id(&self.config.id_key))?;
        let record = ErrorRecord::from_payload(&event.payload)?;
        Some(ErrorTransition::Populated(id, record))
    }
}

impl Transitions for ErrorTableReducer {
    type State = ErrorTable;
    type Transition = ErrorTransition;

    fn route(&self, event: &Event) -> Routing<ErrorTransition> {
        let kind = event.kind.as_str();
        Router::new(event)
            .family("populate", self.config.populate.contains(kind), |e| {
                self.decode_populate(e)
            })
            .family("clear", self.config.clear.contains(kind), |e| {
                e.payload_id(&self.config.id_key).map(ErrorTransition::Cleared)
            })
            .finish()
    }

    fn apply(&self, state: &ErrorTable, transition: ErrorTransition) -> ErrorTable {
        let mut table = state.clone();
        match transition {
            ErrorTransition::Populated(id, record) => {
                table.0.insert(id, record);
            }
            ErrorTransition::Cleared(id) => {
                table.0.remove(&id);
            }
        }
        table
    }
}

impl Reducer for ErrorTableReducer {
    type State = ErrorTable;

    fn initial(&self) -> ErrorTable {
        ErrorTable::new()
    }

    fn reduce(&self, state: &ErrorTable, event: &Event) -> ErrorTable {
        self.transition(state, event)
    }

    fn try_reduce(&self, state: &ErrorTable, event: &Event) -> ReduceResult<ErrorTable> {
        self.try_transition(state, event)
    }
}
