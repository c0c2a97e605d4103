//! Database models shared across the CRM repository.
//!
//! List and JSON valued attributes are stored as JSON text; the helpers below
//! keep the encoding in one place.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub mod activity;
pub mod config;
pub mod customer;
pub mod reminder;
pub mod tag;
pub mod todo;
pub mod user;

/// Encode a list for a JSON text column.
pub(crate) fn encode_list<T: Serialize>(items: &[T]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a JSON text column; malformed or empty content yields the default.
pub(crate) fn decode_or_default<T: DeserializeOwned + Default>(raw: &str) -> T {
    serde_json::from_str(raw).unwrap_or_default()
}

/// Decode a free-form JSON column, treating malformed content as an empty array.
pub(crate) fn decode_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::Array(Vec::new()))
}
