use tabula_types::Event;

/// Strategy applied when none of a reducer's families claims an event.
///
/// Set at construction time. [`Unchanged`] is the default.
pub trait Fallback<S>: Send + Sync {
    fn apply(&self, state: &S, event: &Event) -> S;
}

/// Returns the state as it was.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unchanged;

impl<S: Clone> Fallback<S> for Unchanged {
    fn apply(&self, state: &S, _event: &Event) -> S {
        state.clone()
    }
}

/// Adapts a plain function into a [`Fallback`].
#[derive(Debug, Clone, Copy)]
pub struct FnFallback<F>(pub F);

impl<S, F> Fallback<S> for FnFallback<F>
where
    F: Fn(&S, &Event) -> S + Send + Sync,
{
    fn apply(&self, state: &S, event: &Event) -> S {
        (self.0)(state, event)
    }
}
