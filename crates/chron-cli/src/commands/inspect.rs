use anyhow::bail;

use chron_config::ChronConfig;
use chron_db::VersionDb;
use chron_db::store::VersionStore;

use crate::cli::{GlobalFlags, LogArgs, RecordArgs};
use crate::output::output_versions;

/// Handle `chron last <type> <id>`.
pub async fn last(db: &VersionDb, args: &RecordArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let Some(version) = db.last_version(&args.record_type, args.record_id).await? else {
        bail!("no versions for {} {}", args.record_type, args.record_id);
    };
    output_versions(std::slice::from_ref(&version), flags.format)
}

/// Handle `chron history <type> <id>`.
pub async fn history(db: &VersionDb, args: &RecordArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let versions = db.history(&args.record_type, args.record_id).await?;
    output_versions(&versions, flags.format)
}

/// Handle `chron log`.
pub async fn log(
    db: &VersionDb,
    args: &LogArgs,
    config: &ChronConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let versions = db
        .query_versions(&super::filter_from(args, config, flags))
        .await?;
    output_versions(&versions, flags.format)
}
