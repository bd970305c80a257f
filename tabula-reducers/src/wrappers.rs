//! Reducer decorators.

use serde::de::DeserializeOwned;
use tabula_model::{EventSet, ReduceError, ReduceResult, Reducer};
use tabula_types::Event;
use tracing::debug;

/// Resets the inner reducer to its initial state on the listed event types.
#[derive(Debug, Clone)]
pub struct WithReset<R> {
    inner: R,
    reset: EventSet,
}

impl<R: Reducer> Reducer for WithReset<R> {
    type State = R::State;

    fn initial(&self) -> R::State {
        self.inner.initial()
    }

    fn reduce(&self, state: &R::State, event: &Event) -> R::State {
        if self.reset.contains(&event.kind) {
            self.inner.initial()
        } else {
            self.inner.reduce(state, event)
        }
    }

    fn try_reduce(&self, state: &R::State, event: &Event) -> ReduceResult<R::State> {
        if self.reset.contains(&event.kind) {
            Ok(self.inner.initial())
        } else {
            self.inner.try_reduce(state, event)
        }
    }
}

/// Replaces the whole state with the payload on the listed event types.
///
/// The payload must deserialize into the inner state type; otherwise the
/// state is left unchanged.
#[derive(Debug, Clone)]
pub struct WithReplace<R> {
    inner: R,
    replace: EventSet,
}

impl<R> WithReplace<R>
where
    R: Reducer,
    R::State: DeserializeOwned,
{
    fn replacement(&self, event: &Event) -> Option<Result<R::State, serde_json::Error>> {
        self.replace
            .contains(&event.kind)
            .then(|| serde_json::from_value(event.payload.clone()))
    }
}

impl<R> Reducer for WithReplace<R>
where
    R: Reducer,
    R::State: DeserializeOwned,
{
    type State = R::State;

    fn initial(&self) -> R::State {
        self.inner.initial()
    }

    fn reduce(&self, state: &R::State, event: &Event) -> R::State {
        match self.replacement(event) {
            Some(Ok(replaced)) => replaced,
            Some(Err(e)) => {
                debug!(event_type = %event.kind, error = %e, "replacement payload rejected");
                state.clone()
            }
            None => self.inner.reduce(state, event),
        }
    }

    fn try_reduce(&self, state: &R::State, event: &Event) -> ReduceResult<R::State> {
        match self.replacement(event) {
            Some(Ok(replaced)) => Ok(replaced),
            Some(Err(_)) => Err(ReduceError::ShapeMismatch {
                event_type: event.kind.clone(),
                families: vec!["replaced"],
            }),
            None => self.inner.try_reduce(state, event),
        }
    }
}

/// Decorator constructors for any [`Reducer`].
pub trait ReducerExt: Reducer + Sized {
    fn with_reset(self, reset: impl Into<EventSet>) -> WithReset<Self> {
        WithReset {
            inner: self,
            reset: reset.into(),
        }
    }

    fn with_replace(self, replace: impl Into<EventSet>) -> WithReplace<Self> {
        WithReplace {
            inner: self,
            replace: replace.into(),
        }
    }
}

impl<R: Reducer> ReducerExt for R {}
