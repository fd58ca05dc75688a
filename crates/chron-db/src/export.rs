//! JSONL export of version history.
//!
//! One [`Version`] per line, in the order the read surface returns them.
//! Uses `serde_jsonlines::append_json_lines`, so repeated exports to the same
//! file accumulate.

use std::path::{Path, PathBuf};

use chron_core::entities::Version;

use crate::VersionDb;
use crate::error::DatabaseError;
use crate::store::VersionFilter;

/// Writes versions to a JSONL file.
pub struct VersionExporter {
    path: PathBuf,
}

impl VersionExporter {
    /// Create an exporter targeting `path`.
    ///
    /// Creates the parent directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the parent directory cannot be created.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, DatabaseError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Other(e.into()))?;
        }
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `versions` to the file. Returns how many lines were written.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the file write fails.
    pub fn write(&self, versions: &[Version]) -> Result<usize, DatabaseError> {
        serde_jsonlines::append_json_lines(&self.path, versions)
            .map_err(|e| DatabaseError::Other(e.into()))?;
        tracing::debug!(path = %self.path.display(), count = versions.len(), "exported versions");
        Ok(versions.len())
    }

    /// Export the full history of one record, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the read or the write fails.
    pub async fn export_history(
        &self,
        db: &VersionDb,
        record_type: &str,
        record_id: u64,
    ) -> Result<usize, DatabaseError> {
        let versions = db.history(record_type, record_id).await?;
        self.write(&versions)
    }

    /// Export the versions matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the read or the write fails.
    pub async fn export_query(
        &self,
        db: &VersionDb,
        filter: &VersionFilter,
    ) -> Result<usize, DatabaseError> {
        let versions = db.query_versions(filter).await?;
        self.write(&versions)
    }
}

/// Read an exported file back.
///
/// # Errors
///
/// Returns `DatabaseError` if the file cannot be read or a line does not
/// decode as a version.
pub fn read_export(path: &Path) -> Result<Vec<Version>, DatabaseError> {
    serde_jsonlines::json_lines(path)
        .map_err(|e| DatabaseError::Other(e.into()))?
        .collect::<std::io::Result<Vec<Version>>>()
        .map_err(|e| DatabaseError::Other(e.into()))
}
