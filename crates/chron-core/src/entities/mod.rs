//! Entity structs persisted by Chronicle.
//!
//! There is one: the version record. It maps to the `versions` table and
//! derives `Serialize`, `Deserialize`, and `JsonSchema` for export and schema
//! generation.

mod version;

pub use version::{NewVersion, Version, parse_changes, parse_snapshot};
