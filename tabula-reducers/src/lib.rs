//! Configurable reducers for normalized entity stores.
//!
//! Each reducer is configured with the event type names that trigger each of
//! its transition families and is otherwise a pure `(state, event) -> state`
//! function:
//!
//! - [`EntityTableReducer`]: identifier → record table (add, merge, fetch,
//!   confirm-rename, array attributes, one-level cascade)
//! - [`OrderIndexReducer`]: ordered, deduplicated identifier sequence
//! - [`SelectionReducer`]: single optional selected identifier
//! - [`FetchStatusReducer`] / [`ErrorTableReducer`]: per-identifier status
//! - [`OrderByIdReducer`]: per-owner child orders
//! - scalar reducers: [`ToggleReducer`], [`IsFetchingReducer`],
//!   [`CounterReducer`], [`TimestampReducer`], [`SingletonReducer`],
//!   [`ErrorSlotReducer`], [`KeyExtractorReducer`], [`KeyExtractorByIdReducer`]
//! - decorators: [`WithReset`], [`WithReplace`] via [`ReducerExt`]
//!
//! Payloads that no registered family accepts leave state unchanged;
//! `Reducer::try_reduce` reports them instead.

mod counter;
mod entity_table;
mod error_table;
mod fetch_status;
mod flags;
mod key_extractor;
mod order_by_id;
mod order_index;
mod selection;
mod singleton;
mod timestamp;
mod util;
mod wrappers;

pub use counter::{CounterConfig, CounterReducer, CounterTransition};
pub use entity_table::{
    ArrayEdit, ArrayReplacement, EntityTable, EntityTableConfig, EntityTableReducer,
    EntityTransition,
};
pub use error_table::{ErrorTable, ErrorTableConfig, ErrorTableReducer, ErrorTransition};
pub use fetch_status::{FetchStatusConfig, FetchStatusReducer, FetchStatusSet, FetchTransition};
pub use flags::{IsFetchingConfig, IsFetchingReducer, ToggleConfig, ToggleReducer};
pub use key_extractor::{
    ExtractionTransition, KeyExtractorByIdConfig, KeyExtractorByIdReducer, KeyExtractorConfig,
    KeyExtractorReducer,
};
pub use order_by_id::{OrderByIdConfig, OrderByIdReducer, OrderByIdTransition};
pub use order_index::{OrderIndex, OrderIndexConfig, OrderIndexReducer, OrderTransition};
pub use selection::{SelectionConfig, SelectionReducer, SelectionTransition};
pub use singleton::{
    ErrorSlotConfig, ErrorSlotReducer, SingletonConfig, SingletonReducer, SingletonTransition,
};
pub use timestamp::{TimestampConfig, TimestampReducer, TimestampTransition};
pub use wrappers::{ReducerExt, WithReplace, WithReset};
