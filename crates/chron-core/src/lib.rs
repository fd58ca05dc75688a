//! # chron-core
//!
//! Core types shared by every Chronicle crate.
//!
//! - Record descriptors and the field classifier that turns a live record into
//!   a snapshot of its auditable, non-default fields
//! - The per-operation context and actor resolution
//! - The pairing diff between two snapshots
//! - The `Version` entity and its event kind
//! - Cross-cutting error types

pub mod context;
pub mod diff;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod record;

/// Auditable column name → current value, as captured at version time.
///
/// Ordered so the serialized form is stable across runs.
pub type Snapshot = std::collections::BTreeMap<String, serde_json::Value>;

/// Column name → `(previous, current)` pairing recorded on update events.
pub type Changes = std::collections::BTreeMap<String, (serde_json::Value, serde_json::Value)>;
