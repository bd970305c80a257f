//! Precedence-ordered family dispatch.
//!
//! A reducer declares its families in precedence order. For each family the
//! event type is registered under, the payload is decoded into a typed
//! transition; the first successful decode wins. Families whose decode fails
//! are remembered so strict callers can see the event was dropped.

use crate::{ReduceError, ReduceResult};
use tabula_types::Event;
use tracing::debug;

/// Outcome of routing one event through a reducer's families.
#[derive(Debug, Clone, PartialEq)]
pub enum Routing<T> {
    /// A family accepted the payload.
    Matched {
        family: &'static str,
        transition: T,
    },
    /// The event type is registered, but every registered family rejected the payload.
    Rejected { families: Vec<&'static str> },
    /// The event type is not registered for any family.
    Unrouted,
}

impl<T> Routing<T> {
    /// Strict view: `Ok(Some(_))` on match, `Ok(None)` when unrouted.
    pub fn into_result(self, event: &Event) -> ReduceResult<Option<T>> {
        match self {
            Self::Matched { transition, .. } => Ok(Some(transition)),
            Self::Rejected { families } => Err(ReduceError::ShapeMismatch {
                event_type: event.kind.clone(),
                families,
            }),
            Self::Unrouted => Ok(None),
        }
    }

    /// Lenient view: rejections and unrouted events both yield `None`.
    pub fn into_transition(self) -> Option<T> {
        match self {
            Self::Matched { transition, .. } => Some(transition),
            _ => None,
        }
    }
}

/// Builder that walks families in the order they are declared.
pub struct Router<'e, T> {
    event: &'e Event,
    matched: Option<(&'static str, T)>,
    rejected: Vec<&'static str>,
}

impl<'e, T> Router<'e, T> {
    #[must_use]
    pub fn new(event: &'e Event) -> Self {
        Self {
            event,
            matched: None,
            rejected: Vec::new(),
        }
    }

    /// Offers the event to one family.
    ///
    /// `decode` only runs if no earlier family matched and `registered` is true.
    #[must_use]
    pub fn family<F>(mut self, name: &'static str, registered: bool, decode: F) -> Self
    where
        F: FnOnce(&Event) -> Option<T>,
    {
        if self.matched.is_some() || !registered {
            return self;
        }
        match decode(self.event) {
            Some(transition) => self.matched = Some((name, transition)),
            None => {
                debug!(
                    event_type = %self.event.kind,
                    family = name,
                    "payload shape rejected, falling through"
                );
                self.rejected.push(name);
            }
        }
        self
    }

    pub fn finish(self) -> Routing<T> {
        match self.matched {
            Some((family, transition)) => {
                debug!(event_type = %self.event.kind, family, "transition matched");
                Routing::Matched { family, transition }
            }
            None if !self.rejected.is_empty() => {
                debug!(
                    event_type = %self.event.kind,
                    families = ?self.rejected,
                    "no registered family accepted the payload"
                );
                Routing::Rejected {
                    families: self.rejected,
                }
            }
            None => Routing::Unrouted,
        }
    }
}
