//! Reducer contracts for Tabula.
//!
//! Defines the pieces every configurable reducer is assembled from:
//! - [`Reducer`]: a pure `(state, event) -> state` transition with an initial state
//! - [`Fallback`]: strategy run when no configured family claims an event
//! - [`EventSet`]: the event type names registered for one transition family
//! - [`Router`] / [`Routing`]: precedence-ordered family dispatch with typed payloads
//! - [`Transitions`]: route-then-apply plumbing shared by the configurable reducers
//! - [`ReduceError`]: explicit rejection surfaced by [`Reducer::try_reduce`]

mod error;
mod event_set;
mod fallback;
mod reducer;
mod routing;

pub use error::{ReduceError, ReduceResult};
pub use event_set::EventSet;
pub use fallback::{Fallback, FnFallback, Unchanged};
pub use reducer::{Inert, Reducer, Transitions};
pub use routing::{Router, Routing};
