use anyhow::Context;

use chron_config::ChronConfig;
use chron_db::VersionDb;

/// Handle `chron migrate`. Runs migrations regardless of `auto_migrate`.
pub async fn handle(config: &ChronConfig) -> anyhow::Result<()> {
    VersionDb::open_local(&config.database.path)
        .await
        .with_context(|| format!("failed to migrate {}", config.database.path))?;
    tracing::info!(path = %config.database.path, "version log migrated");
    Ok(())
}
