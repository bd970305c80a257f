//! Tabula Store - a selection-aware collection with one nested state per item.
//!
//! [`SubstateMultiplexer`] keeps an entity table, its display order and the
//! current selection consistent under one event stream, and forwards every
//! event to a caller-supplied [`Reducer`](tabula_model::Reducer) scoped to
//! the selected identifier. [`reselect`] and [`SelectorSet`] read through the
//! selection.

mod multiplexer;
pub mod rules;
mod selectors;

pub use multiplexer::{MultiplexerConfig, MultiplexerState, SubstateMultiplexer, SubstateRetention};
pub use rules::SettlePass;
pub use selectors::{Result, SelectionError, SelectorSet, reselect, selected_substate};
