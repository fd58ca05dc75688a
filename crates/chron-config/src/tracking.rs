//! Tracked-table declaration and actor lookup key.

use serde::{Deserialize, Serialize};

fn default_current_user_key() -> String {
    "current_user_id".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackingConfig {
    /// Record type names whose inserts and updates are versioned.
    #[serde(default)]
    pub tables: Vec<String>,

    /// Key under which the request layer stores the current user's id.
    #[serde(default = "default_current_user_key")]
    pub current_user_key: String,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            tables: Vec::new(),
            current_user_key: default_current_user_key(),
        }
    }
}

impl TrackingConfig {
    /// Whether any table is tracked at all.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tracks_nothing() {
        let config = TrackingConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.current_user_key, "current_user_id");
    }
}
