//! Boolean reducers.

use serde::{Deserialize, Serialize};
use tabula_model::{EventSet, Reducer};
use tabula_types::Event;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToggleConfig {
    pub turned_on: EventSet,
    pub turned_off: EventSet,
    pub default: bool,
}

/// On/off switch with a configured default.
#[derive(Debug, Clone, Default)]
pub struct ToggleReducer {
    config: ToggleConfig,
}

impl ToggleReducer {
    #[must_use]
    pub fn new(config: ToggleConfig) -> Self {
        Self { config }
    }
}

impl Reducer for ToggleReducer {
    type State = bool;

    fn initial(&self) -> bool {
        self.config.default
    }

    fn reduce(&self, state: &bool, event: &Event) -> bool {
        if self.config.turned_on.contains(&event.kind) {
            true
        } else if self.config.turned_off.contains(&event.kind) {
            false
        } else {
            *state
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IsFetchingConfig {
    pub started: EventSet,
    pub succeed: EventSet,
    pub failed: EventSet,
}

/// Whether any request of one kind is in flight.
#[derive(Debug, Clone, Default)]
pub struct IsFetchingReducer {
    config: IsFetchingConfig,
}

impl IsFetchingReducer {
    #[must_use]
    pub fn new(config: IsFetchingConfig) -> Self {
        Self { config }
    }
}

impl Reducer for IsFetchingReducer {
    type State = bool;

    fn initial(&self) -> bool {
        false
    }

    fn reduce(&self, state: &bool, event: &Event) -> bool {
        let kind = event.kind.as_str();
        if self.config.started.contains(kind) {
            true
        } else if self.config.failed.contains(kind) || self.config.succeed.contains(kind) {
            false
        } else {
            *state
        }
    }
}
