//! Read helpers that resolve the selected substate before running a selector.

use crate::multiplexer::MultiplexerState;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tabula_types::Id;
use thiserror::Error;

/// Failure to resolve the selected substate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no substate is selected")]
    NoSelection,

    #[error("selected id `{0}` has no substate")]
    MissingSubstate(Id),

    #[error("unknown selector `{0}`")]
    UnknownSelector(String),
}

pub type Result<T, E = SelectionError> = std::result::Result<T, E>;

/// The selected identifier's substate.
pub fn selected_substate<S>(state: &MultiplexerState<S>) -> Result<&S> {
    let id = state.selected.as_ref().ok_or(SelectionError::NoSelection)?;
    state
        .substates
        .get(id)
        .ok_or_else(|| SelectionError::MissingSubstate(id.clone()))
}

/// Lifts a selector over one substate into a selector over the whole
/// multiplexer state.
pub fn reselect<S, T, F>(selector: F) -> impl Fn(&MultiplexerState<S>) -> Result<T>
where
    F: Fn(&S) -> T,
{
    move |state| selected_substate(state).map(&selector)
}

type Selector<S, T> = Arc<dyn Fn(&S) -> T + Send + Sync>;

/// A named batch of substate selectors sharing the [`reselect`] failure policy.
///
/// The name `default` is never exposed, nor are names passed to
/// [`SelectorSet::exclude`].
pub struct SelectorSet<S, T> {
    selectors: BTreeMap<String, Selector<S, T>>,
    excluded: BTreeSet<String>,
}

impl<S, T> Default for SelectorSet<S, T> {
    fn default() -> Self {
        Self {
            selectors: BTreeMap::new(),
            excluded: BTreeSet::new(),
        }
    }
}

impl<S, T> Clone for SelectorSet<S, T> {
    fn clone(&self) -> Self {
        Self {
            selectors: self.selectors.clone(),
            excluded: self.excluded.clone(),
        }
    }
}

const RESERVED: &str = "default";

impl<S, T> SelectorSet<S, T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, selector: F) -> Self
    where
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        self.selectors.insert(name.into(), Arc::new(selector));
        self
    }

    #[must_use]
    pub fn exclude<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.excluded.extend(names.into_iter().map(Into::into));
        self
    }

    fn exposed(&self, name: &str) -> bool {
        name != RESERVED && !self.excluded.contains(name)
    }

    /// Names of the selectors callers may run.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.selectors
            .keys()
            .map(String::as_str)
            .filter(|name| self.exposed(name))
    }

    /// Runs one selector against the selected substate.
    pub fn select(&self, name: &str, state: &MultiplexerState<S>) -> Result<T> {
        let selector = self
            .selectors
            .get(name)
            .filter(|_| self.exposed(name))
            .ok_or_else(|| SelectionError::UnknownSelector(name.to_owned()))?;
        selected_substate(state).map(|substate| selector(substate))
    }

    /// Runs every exposed selector against the selected substate.
    pub fn select_all(&self, state: &MultiplexerState<S>) -> Result<BTreeMap<String, T>> {
        let substate = selected_substate(state)?;
        Ok(self
            .names()
            .map(|name| (name.to_owned(), self.selectors[name](substate)))
            .collect())
    }
}
