//! Core type definitions for Tabula.
//!
//! This crate defines the vocabulary every reducer speaks:
//! - [`Id`]: canonical entity identifier (numeric or textual, coerced at the boundary)
//! - [`Record`]: open-ended attribute map stored per identifier
//! - [`Event`]: the `{ type, payload }` unit fed to reducers
//! - [`ErrorRecord`]: per-identifier error status
//!
//! Nothing here knows about transition families; those live in
//! `tabula-reducers`.

mod error_record;
mod event;
mod ids;
mod record;

pub use error_record::ErrorRecord;
pub use event::Event;
pub use ids::{Id, TEMPORARY_PREFIX};
pub use record::{CONFIRMED_KEY, DEFAULT_ID_KEY, Record};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("not an identifier: {0}")]
    InvalidId(String),

    #[error("not a record: {0}")]
    InvalidRecord(String),
}
