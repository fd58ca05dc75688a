use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output mode shared by every command that prints versions.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Raw,
}

/// Event filter accepted on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum EventArg {
    Insert,
    Update,
}

impl From<EventArg> for chron_core::enums::EventKind {
    fn from(value: EventArg) -> Self {
        match value {
            EventArg::Insert => Self::Insert,
            EventArg::Update => Self::Update,
        }
    }
}

/// Top-level CLI parser for the `chron` binary.
#[derive(Debug, Parser)]
#[command(name = "chron", version, about = "Chronicle - record version log")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database path, overriding configuration
    #[arg(long, global = true)]
    pub db: Option<String>,
}

/// Global flags handed to command handlers.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    pub limit: Option<u32>,
    pub quiet: bool,
    pub db: Option<String>,
}

impl Cli {
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            db: self.db.clone(),
        }
    }
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create the version table and indexes.
    Migrate,
    /// Show the latest version of a record.
    Last(RecordArgs),
    /// Show the full history of a record, oldest first.
    History(RecordArgs),
    /// List versions matching filters, newest first.
    Log(LogArgs),
    /// Write versions to a JSONL file.
    Export(ExportArgs),
    /// Print the JSON schema of a version record.
    Schema,
    /// Run a self-contained insert/update walkthrough.
    Demo(DemoArgs),
}

#[derive(Clone, Debug, Args)]
pub struct RecordArgs {
    /// Record type, e.g. `User`
    pub record_type: String,
    /// Record identity
    pub record_id: u64,
}

#[derive(Clone, Debug, Args)]
pub struct LogArgs {
    /// Only versions of this record type
    #[arg(long = "type")]
    pub record_type: Option<String>,
    /// Only versions of this record identity
    #[arg(long = "id")]
    pub record_id: Option<u64>,
    /// Only this event kind
    #[arg(long, value_enum)]
    pub event: Option<EventArg>,
    /// Only versions attributed to this actor
    #[arg(long)]
    pub actor: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ExportArgs {
    /// Destination JSONL file (appended to)
    #[arg(short, long)]
    pub out: String,
    #[command(flatten)]
    pub filter: LogArgs,
}

#[derive(Clone, Debug, Args)]
pub struct DemoArgs {
    /// Actor id the simulated request carries
    #[arg(long, default_value = "12344321")]
    pub user: String,
    /// Name of the user the demo creates
    #[arg(long, default_value = "alice")]
    pub name: String,
    /// Name the demo renames the user to
    #[arg(long, default_value = "bob")]
    pub rename: String,
}
