use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::EventKind;
use crate::errors::CoreError;
use crate::{Changes, Snapshot};

/// An immutable entry in the version log, documenting one observed mutation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Version {
    pub id: i64,
    pub record_type: String,
    pub record_id: u64,
    pub event: EventKind,
    /// Empty when no actor was attached to the operation.
    pub actor: String,
    pub snapshot: Snapshot,
    /// Present on update events only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<Changes>,
    pub created_at: DateTime<Utc>,
}

/// A version record before append. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVersion {
    pub record_type: String,
    pub record_id: u64,
    pub event: EventKind,
    pub actor: String,
    pub snapshot: Snapshot,
    pub changes: Option<Changes>,
}

impl NewVersion {
    /// Version for a freshly inserted record. Carries no change set.
    pub fn insert(
        record_type: impl Into<String>,
        record_id: u64,
        actor: impl Into<String>,
        snapshot: Snapshot,
    ) -> Self {
        Self {
            record_type: record_type.into(),
            record_id,
            event: EventKind::Insert,
            actor: actor.into(),
            snapshot,
            changes: None,
        }
    }

    /// Version for an updated record, with its pairing against the previous one.
    pub fn update(
        record_type: impl Into<String>,
        record_id: u64,
        actor: impl Into<String>,
        snapshot: Snapshot,
        changes: Changes,
    ) -> Self {
        Self {
            record_type: record_type.into(),
            record_id,
            event: EventKind::Update,
            actor: actor.into(),
            snapshot,
            changes: Some(changes),
        }
    }

    /// Snapshot as stored JSON text.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Serialization` if a value cannot be encoded.
    pub fn snapshot_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(&self.snapshot)?)
    }

    /// Change set as stored JSON text, `None` for inserts.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Serialization` if a value cannot be encoded.
    pub fn changes_json(&self) -> Result<Option<String>, CoreError> {
        self.changes
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(CoreError::from)
    }
}

/// Decode a stored snapshot column.
///
/// # Errors
///
/// Returns `CoreError::Serialization` if `text` is not a JSON object.
pub fn parse_snapshot(text: &str) -> Result<Snapshot, CoreError> {
    Ok(serde_json::from_str(text)?)
}

/// Decode a stored change-set column. Empty or missing text means no changes.
///
/// # Errors
///
/// Returns `CoreError::Serialization` if non-empty `text` is not a map of pairs.
pub fn parse_changes(text: Option<&str>) -> Result<Option<Changes>, CoreError> {
    match text {
        Some(s) if !s.is_empty() => Ok(Some(serde_json::from_str(s)?)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_has_no_changes() {
        let v = NewVersion::insert(
            "User",
            1,
            "",
            Snapshot::from([("name".to_string(), json!("alice"))]),
        );
        assert_eq!(v.event, EventKind::Insert);
        assert_eq!(v.changes_json().unwrap(), None);
        assert_eq!(v.snapshot_json().unwrap(), r#"{"name":"alice"}"#);
    }

    #[test]
    fn update_serializes_changes() {
        let v = NewVersion::update(
            "User",
            1,
            "42",
            Snapshot::from([("name".to_string(), json!("bob"))]),
            Changes::from([("name".to_string(), (json!("alice"), json!("bob")))]),
        );
        assert_eq!(
            v.changes_json().unwrap().as_deref(),
            Some(r#"{"name":["alice","bob"]}"#)
        );
    }

    #[test]
    fn parse_rejects_non_object_snapshot() {
        assert!(parse_snapshot("[1,2]").is_err());
        assert!(parse_snapshot("{not json").is_err());
    }

    #[test]
    fn parse_changes_treats_empty_as_none() {
        assert_eq!(parse_changes(None).unwrap(), None);
        assert_eq!(parse_changes(Some("")).unwrap(), None);
        let parsed = parse_changes(Some(r#"{"a":[1,null]}"#)).unwrap().unwrap();
        assert_eq!(parsed["a"], (json!(1), serde_json::Value::Null));
    }
}
