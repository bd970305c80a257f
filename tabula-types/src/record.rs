use crate::{Error, Id};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute used as identifier when no `idKey` is configured.
pub const DEFAULT_ID_KEY: &str = "id";

/// Flag stamped on records the server has acknowledged.
pub const CONFIRMED_KEY: &str = "isConfirmed";

/// A record stored in an entity table.
///
/// Records have no fixed schema: the attribute map is whatever JSON object
/// the host dispatched. List-valued attributes can be edited in place by the
/// array-attribute transitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON value if it is an object.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().cloned().map(Self)
    }

    /// Unwraps into a JSON object value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Borrows the underlying attribute map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Reads the identifier stored under `id_key`.
    #[must_use]
    pub fn id(&self, id_key: &str) -> Option<Id> {
        self.0.get(id_key).and_then(Id::from_value)
    }

    /// Shallow merge: every attribute of `other` overwrites ours.
    pub fn merge(&mut self, other: &Record) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Returns a new record with `other` merged over this one.
    #[must_use]
    pub fn merged(&self, other: &Record) -> Self {
        let mut result = self.clone();
        result.merge(other);
        result
    }

    /// Returns a copy without the given attributes.
    #[must_use]
    pub fn without(&self, keys: &[&str]) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(k, _)| !keys.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Returns the list stored under `key`, if that attribute is a list.
    #[must_use]
    pub fn list(&self, key: &str) -> Option<&Vec<Value>> {
        self.0.get(key).and_then(Value::as_array)
    }

    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.get_bool(&format!("/{CONFIRMED_KEY}")).unwrap_or(false)
    }

    pub fn confirm(&mut self) {
        self.0.insert(CONFIRMED_KEY.to_owned(), Value::Bool(true));
    }

    /// Resolves a JSON pointer (e.g. "/meta/author") against the record.
    #[must_use]
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let rest = pointer.strip_prefix('/')?;
        match rest.split_once('/') {
            None => self.0.get(&unescape(rest)),
            Some((head, tail)) => self.0.get(&unescape(head))?.pointer(&format!("/{tail}")),
        }
    }

    /// Extract a string value using a JSON pointer.
    #[must_use]
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.pointer(pointer).and_then(|v| v.as_str())
    }

    /// Extract a boolean value using a JSON pointer.
    #[must_use]
    pub fn get_bool(&self, pointer: &str) -> Option<bool> {
        self.pointer(pointer).and_then(|v| v.as_bool())
    }

    /// Extract a numeric value using a JSON pointer.
    #[must_use]
    pub fn get_number(&self, pointer: &str) -> Option<f64> {
        self.pointer(pointer).and_then(|v| v.as_f64())
    }
}

fn unescape(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::InvalidRecord(other.to_string())),
        }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.into_value()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
