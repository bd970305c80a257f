use crate::{ReduceResult, Routing};
use std::marker::PhantomData;
use tabula_types::Event;
use tracing::warn;

/// A pure state transition function.
///
/// Implementations never mutate their input: every call derives a new state
/// from `(state, event)`. The host serializes the event stream.
pub trait Reducer: Send + Sync {
    type State: Clone;

    /// The state before any event has been applied.
    fn initial(&self) -> Self::State;

    /// Applies one event. Payloads no family accepts leave state unchanged.
    fn reduce(&self, state: &Self::State, event: &Event) -> Self::State;

    /// Like [`Reducer::reduce`], but reports events whose payload every
    /// registered family rejected instead of dropping them silently.
    fn try_reduce(&self, state: &Self::State, event: &Event) -> ReduceResult<Self::State> {
        Ok(self.reduce(state, event))
    }

    /// Replays a stream of events starting from the initial state.
    fn fold<'a, I>(&self, events: I) -> Self::State
    where
        Self: Sized,
        I: IntoIterator<Item = &'a Event>,
    {
        let initial = self.initial();
        self.fold_from(&initial, events)
    }

    /// Replays a stream of events starting from `state`.
    fn fold_from<'a, I>(&self, state: &Self::State, events: I) -> Self::State
    where
        Self: Sized,
        I: IntoIterator<Item = &'a Event>,
    {
        events
            .into_iter()
            .fold(state.clone(), |acc, event| self.reduce(&acc, event))
    }
}

/// A reducer that ignores every event and keeps `S::default()`.
///
/// Useful as the nested reducer of a multiplexer that only needs the
/// table/order/selection bookkeeping.
#[derive(Debug)]
pub struct Inert<S>(PhantomData<fn() -> S>);

impl<S> Inert<S> {
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<S> Default for Inert<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone + Default> Reducer for Inert<S> {
    type State = S;

    fn initial(&self) -> S {
        S::default()
    }

    fn reduce(&self, state: &S, _event: &Event) -> S {
        state.clone()
    }
}

/// A reducer expressed as typed family routing plus an exhaustive apply.
///
/// Implementors get [`Transitions::transition`] and
/// [`Transitions::try_transition`], which back `Reducer::reduce` and
/// `Reducer::try_reduce` respectively.
pub trait Transitions {
    type State: Clone;
    type Transition;

    /// Decodes the event into the transition of the first accepting family.
    fn route(&self, event: &Event) -> Routing<Self::Transition>;

    /// Applies a decoded transition.
    fn apply(&self, state: &Self::State, transition: Self::Transition) -> Self::State;

    /// Runs when no family accepted the event.
    fn unclaimed(&self, state: &Self::State, _event: &Event) -> Self::State {
        state.clone()
    }

    fn transition(&self, state: &Self::State, event: &Event) -> Self::State {
        match self.route(event) {
            Routing::Matched { transition, .. } => self.apply(state, transition),
            Routing::Rejected { families } => {
                warn!(
                    event_type = %event.kind,
                    families = ?families,
                    "event dropped: no registered family accepted the payload"
                );
                self.unclaimed(state, event)
            }
            Routing::Unrouted => self.unclaimed(state, event),
        }
    }

    fn try_transition(&self, state: &Self::State, event: &Event) -> ReduceResult<Self::State> {
        match self.route(event).into_result(event)? {
            Some(transition) => Ok(self.apply(state, transition)),
            None => Ok(self.unclaimed(state, event)),
        }
    }
}
