//! # chron-db
//!
//! libSQL persistence and mutation recording for Chronicle.
//!
//! - [`VersionDb`]: database handle and migrations
//! - [`store`]: the append-only version store and its read surface
//! - [`recorder`]: the mutation interceptor that turns committed inserts and
//!   updates into version records
//! - [`hooks`]: the interface a host data layer calls after each commit
//! - [`export`]: JSONL export of version history
//!
//! The recorder never reports its own failures to the host. Lookups that fail
//! are logged at `warn`, appends that fail at `error`.

pub mod error;
pub mod export;
pub mod helpers;
pub mod hooks;
mod migrations;
pub mod recorder;
pub mod store;

use chron_config::DatabaseConfig;
use error::DatabaseError;
use libsql::Builder;

/// Central database handle for the version log.
///
/// Wraps a libSQL database and a single shared connection. Hosts may issue
/// their own statements on [`VersionDb::conn`]. Version appends go through
/// the same connection, so hosts must fire the hooks only after `COMMIT`;
/// a hook fired inside an open transaction writes into that transaction.
pub struct VersionDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl VersionDb {
    /// Open a local database at the given path and run migrations.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Self::connect_local(path).await?;
        db.run_migrations().await?;
        Ok(db)
    }

    /// Open the database described by `config`.
    ///
    /// Migrations only run when `auto_migrate` is set. A migration failure is
    /// returned to the caller, which is expected to abort startup.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let db = Self::connect_local(&config.path).await?;
        if config.auto_migrate {
            db.run_migrations().await?;
        } else {
            tracing::debug!(path = %config.path, "auto_migrate disabled; skipping migrations");
        }
        Ok(db)
    }

    async fn connect_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        Ok(Self { db, conn })
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
