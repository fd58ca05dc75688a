//! Row-to-entity parsing helpers.
//!
//! Converts `libsql::Row` columns into typed values and keeps the timestamp
//! format in one place. Timestamps are written as RFC 3339 UTC with fixed
//! microsecond precision so that text ordering is chronological ordering.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::DatabaseError;

/// Format a timestamp for the `created_at` column.
#[must_use]
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00.000000Z"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Convert a record id for the INTEGER column.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` if the id does not fit in an `i64`.
pub fn record_id_to_sql(id: u64) -> Result<i64, DatabaseError> {
    i64::try_from(id)
        .map_err(|_| DatabaseError::InvalidState(format!("record id {id} exceeds i64 range")))
}

/// Convert a stored record id back to its unsigned form.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` for negative stored ids.
pub fn record_id_from_sql(id: i64) -> Result<u64, DatabaseError> {
    u64::try_from(id)
        .map_err(|_| DatabaseError::InvalidState(format!("negative record id {id} in store")))
}
