use std::fmt::Write as _;

use chron_core::diff::changed_fields;
use chron_core::entities::Version;
use serde::Serialize;

use crate::cli::OutputFormat;

/// Render a serializable value as JSON. `Table` falls back to pretty JSON.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::Table => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Render versions in the requested format.
///
/// `Raw` prints one compact JSON object per line. `Table` lists one version
/// per line with only the fields that actually changed.
pub fn render_versions(versions: &[Version], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(versions)?),
        OutputFormat::Raw => {
            let lines = versions
                .iter()
                .map(serde_json::to_string)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(lines.join("\n"))
        }
        OutputFormat::Table => Ok(render_table(versions)),
    }
}

fn render_table(versions: &[Version]) -> String {
    if versions.is_empty() {
        return "(no versions)".to_string();
    }

    let mut out = format!(
        "{:>6}  {:<27}  {:<12}  {:>8}  {:<6}  {:<10}  {}",
        "id", "created_at", "type", "record", "event", "actor", "changed"
    );
    for version in versions {
        let _ = write!(
            out,
            "\n{:>6}  {:<27}  {:<12}  {:>8}  {:<6}  {:<10}  {}",
            version.id,
            version.created_at.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
            version.record_type,
            version.record_id,
            version.event,
            if version.actor.is_empty() {
                "-"
            } else {
                &version.actor
            },
            changed_summary(version),
        );
    }
    out
}

fn changed_summary(version: &Version) -> String {
    let Some(changes) = &version.changes else {
        return "-".to_string();
    };
    let moved: Vec<String> = changed_fields(changes)
        .map(|(column, before, after)| format!("{column}: {before} -> {after}"))
        .collect();
    if moved.is_empty() {
        "(none)".to_string()
    } else {
        moved.join(", ")
    }
}

/// Print versions in the requested format.
pub fn output_versions(versions: &[Version], format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", render_versions(versions, format)?);
    Ok(())
}

pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", render(value, format)?);
    Ok(())
}
