//! Error types for reducers.

use thiserror::Error;

/// Result type for strict reduction.
pub type ReduceResult<T> = Result<T, ReduceError>;

/// Errors surfaced by [`crate::Reducer::try_reduce`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReduceError {
    /// The event type is registered, but no registered family accepted the payload.
    #[error("payload of `{event_type}` rejected by {}", .families.join(", "))]
    ShapeMismatch {
        event_type: String,
        families: Vec<&'static str>,
    },
}
