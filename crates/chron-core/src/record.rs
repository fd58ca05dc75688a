//! Record descriptors and the field classifier.
//!
//! Tracked types declare their fields once, in a `static RecordSchema`. Each
//! field carries its in-memory name, its persistence (column) name, and
//! whether it is auditable. The record itself only has to hand back a
//! [`FieldValue`] for a field name; classification never inspects the type.
//!
//! A field holding its type's default value is left out of the snapshot, so
//! "reset to default" and "never set" read the same in history.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::Snapshot;
use crate::errors::CoreError;

/// Static description of a single field on a tracked record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// In-memory field name, used to ask the record for its value.
    pub name: &'static str,
    /// Persistence name. Snapshot and change keys use this.
    pub column: &'static str,
    /// Whether the field participates in snapshots and diffs.
    pub auditable: bool,
}

impl FieldDescriptor {
    /// A field that is persisted but not audited.
    #[must_use]
    pub const fn new(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            auditable: false,
        }
    }

    /// A field included in version snapshots.
    #[must_use]
    pub const fn auditable(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            auditable: true,
        }
    }
}

/// Static description of a tracked record type.
#[derive(Debug, Clone, Copy)]
pub struct RecordSchema {
    /// Type name. This is what the tracked-table allow-list matches against
    /// and what lands in `record_type`.
    pub name: &'static str,
    /// The identity field. Its committed value becomes `record_id`.
    pub identity: FieldDescriptor,
    /// Every other field of the type, auditable or not.
    pub fields: &'static [FieldDescriptor],
}

impl RecordSchema {
    #[must_use]
    pub const fn new(
        name: &'static str,
        identity: FieldDescriptor,
        fields: &'static [FieldDescriptor],
    ) -> Self {
        Self {
            name,
            identity,
            fields,
        }
    }

    /// Column names of the fields currently marked auditable.
    pub fn auditable_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter(|f| f.auditable).map(|f| f.column)
    }

    /// Whether `column` names a field that is auditable on this descriptor.
    #[must_use]
    pub fn is_auditable_column(&self, column: &str) -> bool {
        self.fields
            .iter()
            .any(|f| f.auditable && f.column == column)
    }

    /// Check the descriptor for mistakes that would make snapshots ambiguous.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the type name is empty or two fields
    /// share a column name.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.is_empty() {
            return Err(CoreError::Validation(
                "record schema name must not be empty".into(),
            ));
        }
        let mut seen = HashSet::new();
        seen.insert(self.identity.column);
        for field in self.fields {
            if !seen.insert(field.column) {
                return Err(CoreError::Validation(format!(
                    "{}: duplicate column '{}'",
                    self.name, field.column
                )));
            }
        }
        Ok(())
    }
}

/// A field's current value together with its zero-value test result.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub value: Value,
    pub is_zero: bool,
}

impl FieldValue {
    /// Capture a value. It counts as zero when it equals `T::default()`.
    ///
    /// A value that cannot be represented as JSON also counts as zero, so the
    /// field is left out of snapshots rather than recorded as `null`.
    pub fn of<T>(value: &T) -> Self
    where
        T: Serialize + Default + PartialEq,
    {
        match serde_json::to_value(value) {
            Ok(json) => Self {
                value: json,
                is_zero: *value == T::default(),
            },
            Err(_) => Self {
                value: Value::Null,
                is_zero: true,
            },
        }
    }
}

/// A live instance of a tracked type, as seen by the version recorder.
pub trait Record {
    /// The static descriptor for this record's type.
    fn schema(&self) -> &'static RecordSchema;

    /// Current value of the field with in-memory name `field`.
    ///
    /// Returns `None` for names the type does not know.
    fn value_of(&self, field: &str) -> Option<FieldValue>;
}

/// Capture the auditable, non-default fields of `record`, keyed by column.
#[must_use]
pub fn auditable_snapshot(record: &dyn Record) -> Snapshot {
    let mut snapshot = Snapshot::new();
    for field in record.schema().fields.iter().filter(|f| f.auditable) {
        match record.value_of(field.name) {
            Some(v) if !v.is_zero => {
                snapshot.insert(field.column.to_string(), v.value);
            }
            _ => {}
        }
    }
    snapshot
}

/// Resolve the committed identity of `record`.
///
/// Returns `None` when the identity field is unknown, holds its zero value, or
/// is not an unsigned integer.
#[must_use]
pub fn resolve_record_id(record: &dyn Record) -> Option<u64> {
    let identity = record.value_of(record.schema().identity.name)?;
    if identity.is_zero {
        return None;
    }
    identity.value.as_u64().filter(|id| *id != 0)
}

/// Drop every key of a stored snapshot that is no longer auditable on
/// `schema`. Keys that are still auditable keep their stored value.
#[must_use]
pub fn restrict_to_auditable(schema: &RecordSchema, stored: Snapshot) -> Snapshot {
    stored
        .into_iter()
        .filter(|(column, _)| schema.is_auditable_column(column))
        .collect()
}
