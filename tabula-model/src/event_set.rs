use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The event type names that trigger one transition family.
///
/// Serialized as a plain JSON array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventSet(BTreeSet<String>);

impl EventSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a set built from literal names.
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().collect()
    }

    #[must_use]
    pub fn contains(&self, event_type: &str) -> bool {
        self.0.contains(event_type)
    }

    pub fn insert(&mut self, event_type: impl Into<String>) -> bool {
        self.0.insert(event_type.into())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for EventSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<const N: usize> From<[&str; N]> for EventSet {
    fn from(names: [&str; N]) -> Self {
        Self::of(names)
    }
}
