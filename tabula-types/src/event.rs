//! The event unit consumed by every reducer.
//!
//! An event is a `type` name plus a free-form JSON payload. Reducers decide
//! which transition family an event belongs to by looking its type up in
//! their configuration and then decoding the payload into a typed variant.

use crate::{Id, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A discrete state transition request, as dispatched by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event type name, matched against configured event sets.
    #[serde(rename = "type")]
    pub kind: String,

    /// Payload; `Null` when the host sent none.
    #[serde(default)]
    pub payload: Value,
}

impl Event {
    /// Creates an event with the given payload.
    #[must_use]
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Creates an event without payload.
    #[must_use]
    pub fn bare(kind: impl Into<String>) -> Self {
        Self::new(kind, Value::Null)
    }

    /// Creates an event whose payload is a bare identifier.
    #[must_use]
    pub fn with_id(kind: impl Into<String>, id: impl Into<Id>) -> Self {
        Self::new(kind, id.into().into())
    }

    /// Creates an event from any serializable payload.
    pub fn from_serializable(kind: impl Into<String>, payload: &impl Serialize) -> Result<Self> {
        Ok(Self::new(kind, serde_json::to_value(payload)?))
    }

    #[must_use]
    pub fn has_payload(&self) -> bool {
        !self.payload.is_null()
    }

    /// The payload itself read as an identifier (`5`, `"abc"`).
    #[must_use]
    pub fn bare_id(&self) -> Option<Id> {
        Id::from_value(&self.payload)
    }

    /// The payload as a JSON object.
    #[must_use]
    pub fn object(&self) -> Option<&Map<String, Value>> {
        self.payload.as_object()
    }

    /// A top-level field of an object payload.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.object().and_then(|o| o.get(key))
    }

    /// The identifier stored under `id_key` in an object payload.
    #[must_use]
    pub fn payload_id(&self, id_key: &str) -> Option<Id> {
        self.field(id_key).and_then(Id::from_value)
    }
}
