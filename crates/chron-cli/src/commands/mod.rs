use anyhow::Context;

use chron_config::ChronConfig;
use chron_db::VersionDb;
use chron_db::store::VersionFilter;

use crate::cli::{Commands, GlobalFlags, LogArgs};

pub mod demo;
pub mod export;
pub mod inspect;
pub mod migrate;
pub mod schema;

/// Route a parsed command to its handler.
pub async fn dispatch(
    command: Commands,
    config: &ChronConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Migrate => migrate::handle(config).await,
        Commands::Last(args) => inspect::last(&open(config).await?, &args, flags).await,
        Commands::History(args) => inspect::history(&open(config).await?, &args, flags).await,
        Commands::Log(args) => inspect::log(&open(config).await?, &args, config, flags).await,
        Commands::Export(args) => export::handle(&open(config).await?, &args, config, flags).await,
        Commands::Schema => schema::handle(flags),
        Commands::Demo(args) => demo::handle(&args, config, flags).await,
    }
}

/// Open the configured database, migrating first when `auto_migrate` is set.
async fn open(config: &ChronConfig) -> anyhow::Result<VersionDb> {
    let path = &config.database.path;
    VersionDb::open(&config.database)
        .await
        .with_context(|| format!("failed to open version database at {path}"))
}

/// Build a query filter from command-line filters and the effective limit.
fn filter_from(args: &LogArgs, config: &ChronConfig, flags: &GlobalFlags) -> VersionFilter {
    VersionFilter {
        record_type: args.record_type.clone(),
        record_id: args.record_id,
        event: args.event.map(Into::into),
        actor: args.actor.clone(),
        limit: Some(flags.limit.unwrap_or(config.general.default_limit)),
    }
}
