//! Identifier type used throughout the Tabula core.
//!
//! Hosts hand identifiers over as JSON numbers, JSON strings, and JSON object
//! keys (which are always strings). All of them collapse into one canonical
//! [`Id`] at the boundary: a string that spells a canonical decimal integer
//! becomes [`Id::Num`], so `5`, `5.0` and `"5"` name the same entity while
//! `"05"` and `"tmp-…"` stay textual.

use crate::Error;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Prefix carried by client-generated identifiers awaiting confirmation.
pub const TEMPORARY_PREFIX: &str = "tmp-";

/// Unique identifier for an entity in a table, order, or selection.
///
/// Ordering places every numeric id before every textual id, which keeps
/// `BTreeMap<Id, _>` iteration deterministic across replays.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Id {
    Num(i64),
    Text(String),
}

impl Id {
    /// Creates a fresh client-side identifier for an optimistic insert.
    ///
    /// Uses UUID v7 so temporary ids sort by creation time.
    #[must_use]
    pub fn temporary() -> Self {
        Self::Text(format!("{TEMPORARY_PREFIX}{}", Uuid::now_v7()))
    }

    /// Returns true if this id was produced by [`Id::temporary`].
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::Text(s) if s.starts_with(TEMPORARY_PREFIX))
    }

    /// Parses an identifier from text, coercing canonical integers.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match canonical_int(s) {
            Some(n) => Self::Num(n),
            None => Self::Text(s.to_owned()),
        }
    }

    /// Reads an identifier out of a JSON value.
    ///
    /// Returns `None` for anything that is not an integral number or a string.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Num(i))
                } else {
                    n.as_f64().and_then(integral)
                }
            }
            Value::String(s) => Some(Self::parse(s)),
            _ => None,
        }
    }

    /// Converts back into the JSON value hosts expect to see.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Num(n) => Value::from(*n),
            Self::Text(s) => Value::from(s.as_str()),
        }
    }

    /// Returns the numeric form, if any.
    #[must_use]
    pub const fn as_num(&self) -> Option<i64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

fn canonical_int(s: &str) -> Option<i64> {
    let n: i64 = s.parse().ok()?;
    (n.to_string() == s).then_some(n)
}

fn integral(f: f64) -> Option<Id> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(Id::Num(f as i64))
    } else {
        None
    }
}

impl TryFrom<&Value> for Id {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or_else(|| Error::InvalidId(value.to_string()))
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Self::Num(n)
    }
}

impl From<i32> for Id {
    fn from(n: i32) -> Self {
        Self::Num(i64::from(n))
    }
}

impl From<u32> for Id {
    fn from(n: u32) -> Self {
        Self::Num(i64::from(n))
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        match canonical_int(&s) {
            Some(n) => Self::Num(n),
            None => Self::Text(s),
        }
    }
}

impl From<Id> for Value {
    fn from(id: Id) -> Self {
        match id {
            Id::Num(n) => Value::from(n),
            Id::Text(s) => Value::String(s),
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for Id {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Num(n) => serializer.serialize_i64(*n),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

struct IdVisitor;

impl Visitor<'_> for IdVisitor {
    type Value = Id;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or a string identifier")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Id, E> {
        Ok(Id::Num(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Id, E> {
        i64::try_from(v)
            .map(Id::Num)
            .map_err(|_| E::custom(format!("identifier {v} out of range")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Id, E> {
        integral(v).ok_or_else(|| E::custom(format!("identifier {v} is not integral")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Id, E> {
        Ok(Id::parse(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Id, E> {
        Ok(Id::from(v))
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IdVisitor)
    }
}
