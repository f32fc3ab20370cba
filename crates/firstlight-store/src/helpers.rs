//! Row-to-entity parsing helpers.
//!
//! Audit reads convert `libsql::Row` (column-indexed) back into typed
//! records. These helpers isolate the parsing and keep the read queries
//! readable.

use chrono::{DateTime, Utc};

use crate::error::StoreError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// # Errors
///
/// Returns `StoreError::CorruptRow` if the string is not RFC 3339.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::CorruptRow(format!("bad datetime '{s}': {e}")))
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all firstlight-core enums that use
/// `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `StoreError::CorruptRow` if the string matches no variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, StoreError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| StoreError::CorruptRow(format!("bad enum value '{s}': {e}")))
}

/// Parse a TEXT column holding a JSON document.
///
/// # Errors
///
/// Returns `StoreError::CorruptRow` on invalid JSON.
pub fn parse_json(s: &str) -> Result<serde_json::Value, StoreError> {
    serde_json::from_str(s).map_err(|e| StoreError::CorruptRow(format!("bad JSON column: {e}")))
}
