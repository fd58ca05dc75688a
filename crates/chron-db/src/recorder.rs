//! Mutation recorder.
//!
//! Turns committed inserts and updates into version records:
//!
//! ```text
//! insert: rows > 0 → tracked → identity → snapshot → actor → append(insert)
//! update: rows > 0 → identity → tracked → snapshot → last version
//!         → restrict → pair → actor → append(update)
//! ```
//!
//! Every invocation is stateless. The only state that carries between calls is
//! the version log itself, read back through [`VersionStore::last_version`].
//! Nothing that goes wrong here is returned to the host; failures are logged
//! and reflected in the [`RecordOutcome`].

use std::collections::HashSet;
use std::fmt;

use chron_config::TrackingConfig;
use chron_core::Snapshot;
use chron_core::context::actor_or_empty;
use chron_core::diff::pair_changes;
use chron_core::entities::NewVersion;
use chron_core::record::{
    RecordSchema, auditable_snapshot, resolve_record_id, restrict_to_auditable,
};

use crate::hooks::{MutationEvent, MutationHooks};
use crate::store::VersionStore;

/// The set of record types whose mutations are versioned.
#[derive(Debug, Clone, Default)]
pub struct Tracking {
    tables: HashSet<String>,
}

impl Tracking {
    pub fn new<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tables: tables.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn from_config(config: &TrackingConfig) -> Self {
        Self::new(config.tables.iter().cloned())
    }

    #[must_use]
    pub fn is_tracked(&self, record_type: &str) -> bool {
        self.tables.contains(record_type)
    }
}

/// Why a mutation produced no version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The host statement affected no rows.
    NoRowsAffected,
    /// The record type is not in the tracked set.
    NotTracked,
    /// The record's identity is missing or zero.
    NoIdentity,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoRowsAffected => "no rows affected",
            Self::NotTracked => "record type not tracked",
            Self::NoIdentity => "record has no identity",
        })
    }
}

/// What a single recorder invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A version was appended with this id.
    Recorded(i64),
    /// The mutation was deliberately not versioned.
    Skipped(SkipReason),
    /// Appending the version failed. The host mutation is unaffected.
    Failed,
}

/// Records versions for committed mutations against a [`VersionStore`].
pub struct VersionRecorder<S> {
    store: S,
    tracking: Tracking,
}

impl<S: VersionStore> VersionRecorder<S> {
    pub const fn new(store: S, tracking: Tracking) -> Self {
        Self { store, tracking }
    }

    /// The store versions are appended to.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Record a committed insert.
    pub async fn record_insert(&self, event: &MutationEvent<'_>) -> RecordOutcome {
        let record_type = event.record_type();

        if event.rows_affected == 0 {
            return skipped(record_type, SkipReason::NoRowsAffected);
        }
        if !self.tracking.is_tracked(record_type) {
            return skipped(record_type, SkipReason::NotTracked);
        }
        let Some(record_id) = resolve_record_id(event.record) else {
            return skipped(record_type, SkipReason::NoIdentity);
        };

        let snapshot = auditable_snapshot(event.record);
        let actor = actor_or_empty(event.context);

        self.append(NewVersion::insert(record_type, record_id, actor, snapshot))
            .await
    }

    /// Record a committed update.
    pub async fn record_update(&self, event: &MutationEvent<'_>) -> RecordOutcome {
        let record_type = event.record_type();

        if event.rows_affected == 0 {
            return skipped(record_type, SkipReason::NoRowsAffected);
        }
        let Some(record_id) = resolve_record_id(event.record) else {
            return skipped(record_type, SkipReason::NoIdentity);
        };
        if !self.tracking.is_tracked(record_type) {
            return skipped(record_type, SkipReason::NotTracked);
        }

        let snapshot = auditable_snapshot(event.record);
        let previous = self
            .previous_snapshot(event.record.schema(), record_id)
            .await;
        let changes = pair_changes(&previous, &snapshot);
        let actor = actor_or_empty(event.context);

        self.append(NewVersion::update(
            record_type,
            record_id,
            actor,
            snapshot,
            changes,
        ))
        .await
    }

    /// The last stored snapshot for a record, limited to columns that are
    /// still auditable. Empty when there is none or it cannot be read.
    async fn previous_snapshot(&self, schema: &RecordSchema, record_id: u64) -> Snapshot {
        match self.store.last_version(schema.name, record_id).await {
            Ok(Some(version)) => restrict_to_auditable(schema, version.snapshot),
            Ok(None) => {
                tracing::debug!(
                    record_type = schema.name,
                    record_id,
                    "no previous version; pairing against empty snapshot"
                );
                Snapshot::new()
            }
            Err(error) => {
                tracing::warn!(
                    record_type = schema.name,
                    record_id,
                    %error,
                    "previous version unavailable; pairing against empty snapshot"
                );
                Snapshot::new()
            }
        }
    }

    async fn append(&self, version: NewVersion) -> RecordOutcome {
        match self.store.append(&version).await {
            Ok(id) => {
                tracing::debug!(
                    version_id = id,
                    record_type = %version.record_type,
                    record_id = version.record_id,
                    event = %version.event,
                    "version recorded"
                );
                RecordOutcome::Recorded(id)
            }
            Err(error) => {
                tracing::error!(
                    record_type = %version.record_type,
                    record_id = version.record_id,
                    event = %version.event,
                    %error,
                    "failed to append version"
                );
                RecordOutcome::Failed
            }
        }
    }
}

fn skipped(record_type: &str, reason: SkipReason) -> RecordOutcome {
    tracing::debug!(record_type, %reason, "mutation not versioned");
    RecordOutcome::Skipped(reason)
}

impl<S: VersionStore> MutationHooks for VersionRecorder<S> {
    async fn after_insert(&self, event: &MutationEvent<'_>) {
        self.record_insert(event).await;
    }

    async fn after_update(&self, event: &MutationEvent<'_>) {
        self.record_update(event).await;
    }
}
