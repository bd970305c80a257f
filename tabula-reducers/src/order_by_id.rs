//! Per-owner child orders (e.g. the item order of each list).

use crate::util::id_list;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tabula_model::{EventSet, ReduceResult, Reducer, Router, Routing, Transitions};
use tabula_types::{DEFAULT_ID_KEY, Event, Id};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderByIdConfig {
    pub fetched: EventSet,
    pub replaced: EventSet,
    /// Attribute naming the owner.
    pub id_key: String,
    /// Attribute carrying the owner's child ids.
    pub order_key: String,
}

impl Default for OrderByIdConfig {
    fn default() -> Self {
        Self {
            fetched: EventSet::new(),
            replaced: EventSet::new(),
            id_key: DEFAULT_ID_KEY.to_owned(),
            order_key: "order".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderByIdTransition {
    Merged { owner: Id, ids: Vec<Id> },
    Replaced { owner: Id, ids: Vec<Id> },
}

#[derive(Debug, Clone, Default)]
pub struct OrderByIdReducer {
    config: OrderByIdConfig,
}

impl OrderByIdReducer {
    #[must_use]
    pub fn new(config: OrderByIdConfig) -> Self {
        Self { config }
    }

    fn decode(&self, event: &Event) -> Option<(Id, Vec<Id>)> {
        let ids = event.field(&self.config.order_key).and_then(id_list)?;
        Some((event.payload_id(&self.config.id_key)?, ids))
    }
}

impl Transitions for OrderByIdReducer {
    type State = BTreeMap<Id, Vec<Id>>;
    type Transition = OrderByIdTransition;

    fn route(&self, event: &Event) -> Routing<OrderByIdTransition> {
        let kind = event.kind.as_str();
        Router::new(event)
            .family("fetched", self.config.fetched.contains(kind), |e| {
                self.decode(e)
                    .map(|(owner, ids)| OrderByIdTransition::Merged { owner, ids })
            })
            .family("replaced", self.config.replaced.contains(kind), |e| {
                self.decode(e)
                    .map(|(owner, ids)| OrderByIdTransition::Replaced { owner, ids })
            })
            .finish()
    }

    fn apply(
        &self,
        state: &BTreeMap<Id, Vec<Id>>,
        transition: OrderByIdTransition,
    ) -> BTreeMap<Id, Vec<Id>> {
        let mut orders = state.clone();
        match transition {
            OrderByIdTransition::Merged { owner, ids } => {
                let order = orders.entry(owner).or_default();
                for id in ids {
                    if !order.contains(&id) {
                        order.push(id);
                    }
                }
            }
            OrderByIdTransition::Replaced { owner, ids } => {
                orders.insert(owner, ids);
            }
        }
        orders
    }
}

impl Reducer for OrderByIdReducer {
    type State = BTreeMap<Id, Vec<Id>>;

    fn initial(&self) -> BTreeMap<Id, Vec<Id>> {
        BTreeMap::new()
    }

    fn reduce(&self, state: &BTreeMap<Id, Vec<Id>>, event: &Event) -> BTreeMap<Id, Vec<Id>> {
        self.transition(state, event)
    }

    fn try_reduce(
        &self,
        state: &BTreeMap<Id, Vec<Id>>,
        event: &Event,
    ) -> ReduceResult<BTreeMap<Id, Vec<Id>>> {
        self.try_transition(state, event)
    }
}
