use serde::Serialize;

use chron_config::ChronConfig;
use chron_db::VersionDb;
use chron_db::export::VersionExporter;

use crate::cli::{ExportArgs, GlobalFlags};
use crate::output::output;

#[derive(Debug, Serialize)]
struct ExportSummary {
    path: String,
    exported: usize,
}

/// Handle `chron export --out <file>`.
///
/// With both `--type` and `--id` the whole history is exported oldest first,
/// otherwise the filtered query newest first.
pub async fn handle(
    db: &VersionDb,
    args: &ExportArgs,
    config: &ChronConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let exporter = VersionExporter::new(&args.out)?;
    let exported = match (&args.filter.record_type, args.filter.record_id) {
        (Some(record_type), Some(record_id))
            if args.filter.event.is_none() && args.filter.actor.is_none() =>
        {
            exporter.export_history(db, record_type, record_id).await?
        }
        _ => {
            let filter = super::filter_from(&args.filter, config, flags);
            exporter.export_query(db, &filter).await?
        }
    };

    if flags.quiet {
        return Ok(());
    }
    output(
        &ExportSummary {
            path: exporter.path().display().to_string(),
            exported,
        },
        flags.format,
    )
}
