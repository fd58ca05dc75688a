//! Cross-cutting error types for Chronicle.
//!
//! Storage errors (`DatabaseError`) and configuration errors (`ConfigError`)
//! live in their own crates. The binary converges everything through `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any Chronicle crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A record descriptor or value failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A snapshot or change set could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
