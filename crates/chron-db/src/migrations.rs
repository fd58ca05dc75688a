//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements use `IF NOT EXISTS` for idempotent re-running.

use crate::VersionDb;
use crate::error::DatabaseError;

/// `versions` table, lookup indexes, and the append-only triggers.
const MIGRATION_001: &str = include_str!("../migrations/001_versions.sql");

impl VersionDb {
    /// Run all embedded migrations in sequence.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Migration` naming the migration that failed.
    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_versions: {e}")))?;
        Ok(())
    }
}
