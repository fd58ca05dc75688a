//! Pairing diff between two snapshots.
//!
//! Every key of the previous snapshot is paired with whatever the current
//! snapshot holds for it (`null` when absent). Keys that appear only in the
//! current snapshot are not paired. Unchanged pairs are kept: the change set
//! records what the previous version knew, not only what moved.

use serde_json::Value;

use crate::{Changes, Snapshot};

/// Pair every field of `previous` with its value in `current`.
#[must_use]
pub fn pair_changes(previous: &Snapshot, current: &Snapshot) -> Changes {
    previous
        .iter()
        .map(|(column, before)| {
            let after = current.get(column).cloned().unwrap_or(Value::Null);
            (column.clone(), (before.clone(), after))
        })
        .collect()
}

/// Pairs whose two sides actually differ.
pub fn changed_fields(changes: &Changes) -> impl Iterator<Item = (&str, &Value, &Value)> {
    changes
        .iter()
        .filter(|(_, (before, after))| before != after)
        .map(|(column, (before, after))| (column.as_str(), before, after))
}
