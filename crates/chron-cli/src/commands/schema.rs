use chron_core::entities::Version;

use crate::cli::GlobalFlags;
use crate::output::output;

/// Handle `chron schema`: print the JSON schema of a version record.
pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = schemars::schema_for!(Version);
    output(&schema, flags.format)
}
