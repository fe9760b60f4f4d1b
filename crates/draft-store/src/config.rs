//! Store configuration
//!
//! Can be built in code or deserialized, e.g. from a `[store]` TOML table.

use serde::{Deserialize, Serialize};

/// What dispatching an unknown action name does
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownActionPolicy {
    /// Silent no-op
    Ignore,
    /// Log a warning, then complete like a no-op
    #[default]
    Warn,
    /// Fail the dispatch with `StoreError::UnknownAction`
    Error,
}

/// Store configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct StoreConfig {
    /// Display name; generated when not set
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub unknown_action: UnknownActionPolicy,

    /// Log every resolved dispatch at debug level
    #[serde(default = "default_log_dispatches")]
    pub log_dispatches: bool,
}

fn default_log_dispatches() -> bool {
    false
}

impl StoreConfig {
    /// Default configuration with a fixed display name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}
