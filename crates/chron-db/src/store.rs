//! Version store.
//!
//! Append-only persistence of version records plus the read surface exposed
//! to audit tooling. The [`VersionStore`] trait is the seam the recorder
//! depends on; [`VersionDb`] is the libSQL implementation.

use std::sync::Arc;

use chrono::Utc;

use chron_core::entities::{NewVersion, Version, parse_changes, parse_snapshot};
use chron_core::enums::EventKind;

use crate::VersionDb;
use crate::error::DatabaseError;
use crate::helpers::{
    format_timestamp, get_opt_string, parse_datetime, parse_enum, record_id_from_sql,
    record_id_to_sql,
};

const VERSION_COLUMNS: &str =
    "id, record_type, record_id, event, actor, snapshot, changes, created_at";

/// Append and latest-version lookup, the two operations the recorder needs.
#[allow(async_fn_in_trait)]
pub trait VersionStore {
    /// Persist a new version and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if storage rejects the write.
    async fn append(&self, version: &NewVersion) -> Result<i64, DatabaseError>;

    /// The most recent version for `(record_type, record_id)`, newest by
    /// `created_at` then `id`. `Ok(None)` when the identity has no history.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the lookup fails or the stored row cannot
    /// be decoded.
    async fn last_version(
        &self,
        record_type: &str,
        record_id: u64,
    ) -> Result<Option<Version>, DatabaseError>;
}

impl<T: VersionStore + ?Sized> VersionStore for &T {
    async fn append(&self, version: &NewVersion) -> Result<i64, DatabaseError> {
        (**self).append(version).await
    }

    async fn last_version(
        &self,
        record_type: &str,
        record_id: u64,
    ) -> Result<Option<Version>, DatabaseError> {
        (**self).last_version(record_type, record_id).await
    }
}

impl<T: VersionStore + ?Sized> VersionStore for Arc<T> {
    async fn append(&self, version: &NewVersion) -> Result<i64, DatabaseError> {
        (**self).append(version).await
    }

    async fn last_version(
        &self,
        record_type: &str,
        record_id: u64,
    ) -> Result<Option<Version>, DatabaseError> {
        (**self).last_version(record_type, record_id).await
    }
}

/// Filter criteria for version queries.
#[derive(Debug, Default)]
pub struct VersionFilter {
    pub record_type: Option<String>,
    pub record_id: Option<u64>,
    pub event: Option<EventKind>,
    pub actor: Option<String>,
    pub limit: Option<u32>,
}

fn row_to_version(row: &libsql::Row) -> Result<Version, DatabaseError> {
    Ok(Version {
        id: row.get::<i64>(0)?,
        record_type: row.get::<String>(1)?,
        record_id: record_id_from_sql(row.get::<i64>(2)?)?,
        event: parse_enum(&row.get::<String>(3)?)?,
        actor: get_opt_string(row, 4)?.unwrap_or_default(),
        snapshot: parse_snapshot(&row.get::<String>(5)?)?,
        changes: parse_changes(get_opt_string(row, 6)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl VersionStore for VersionDb {
    async fn append(&self, version: &NewVersion) -> Result<i64, DatabaseError> {
        let snapshot = version.snapshot_json()?;
        let changes = version.changes_json()?;
        let record_id = record_id_to_sql(version.record_id)?;
        let created_at = format_timestamp(Utc::now());

        let mut rows = self
            .conn()
            .query(
                "INSERT INTO versions (record_type, record_id, event, actor, snapshot, changes, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 RETURNING id",
                libsql::params![
                    version.record_type.as_str(),
                    record_id,
                    version.event.as_str(),
                    version.actor.as_str(),
                    snapshot,
                    changes,
                    created_at
                ],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)?)
    }

    async fn last_version(
        &self,
        record_type: &str,
        record_id: u64,
    ) -> Result<Option<Version>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {VERSION_COLUMNS} FROM versions
                     WHERE record_type = ?1 AND record_id = ?2
                     ORDER BY created_at DESC, id DESC LIMIT 1"
                ),
                libsql::params![record_type, record_id_to_sql(record_id)?],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_version(&row)?)),
            None => Ok(None),
        }
    }
}

impl VersionDb {
    /// Full history of one record, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a row cannot be decoded.
    pub async fn history(
        &self,
        record_type: &str,
        record_id: u64,
    ) -> Result<Vec<Version>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {VERSION_COLUMNS} FROM versions
                     WHERE record_type = ?1 AND record_id = ?2
                     ORDER BY created_at ASC, id ASC"
                ),
                libsql::params![record_type, record_id_to_sql(record_id)?],
            )
            .await?;

        let mut versions = Vec::new();
        while let Some(row) = rows.next().await? {
            versions.push(row_to_version(&row)?);
        }
        Ok(versions)
    }

    /// Query versions with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a row cannot be decoded.
    pub async fn query_versions(
        &self,
        filter: &VersionFilter,
    ) -> Result<Vec<Version>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref rt) = filter.record_type {
            params.push(libsql::Value::Text(rt.clone()));
            conditions.push(format!("record_type = ?{}", params.len()));
        }
        if let Some(rid) = filter.record_id {
            params.push(libsql::Value::Integer(record_id_to_sql(rid)?));
            conditions.push(format!("record_id = ?{}", params.len()));
        }
        if let Some(event) = filter.event {
            params.push(libsql::Value::Text(event.as_str().to_string()));
            conditions.push(format!("event = ?{}", params.len()));
        }
        if let Some(ref actor) = filter.actor {
            params.push(libsql::Value::Text(actor.clone()));
            conditions.push(format!("actor = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT {VERSION_COLUMNS} FROM versions {where_clause}
             ORDER BY created_at DESC, id DESC LIMIT {limit}"
        );

        let mut rows = self
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut versions = Vec::new();
        while let Some(row) = rows.next().await? {
            versions.push(row_to_version(&row)?);
        }
        Ok(versions)
    }

    /// Number of versions recorded for one record.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count_versions(
        &self,
        record_type: &str,
        record_id: u64,
    ) -> Result<u64, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT COUNT(*) FROM versions WHERE record_type = ?1 AND record_id = ?2",
                libsql::params![record_type, record_id_to_sql(record_id)?],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let count = row.get::<i64>(0)?;
        u64::try_from(count)
            .map_err(|_| DatabaseError::InvalidState(format!("negative version count {count}")))
    }
}
