//! Error types surfaced through the dispatch completion signal

use thiserror::Error;

/// Result alias used by the store
pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Errors a dispatch can fail with
///
/// A failed dispatch never commits state and never notifies listeners.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Dispatch by name where the name is not in the action map.
    ///
    /// Only raised when the store is configured with
    /// [`UnknownActionPolicy::Error`](crate::UnknownActionPolicy::Error).
    #[error("{store}: unknown action \"{action}\"")]
    UnknownAction { store: String, action: String },

    /// A plugin action names a handler that is not registered at dispatch time
    #[error("{store}: no action handler registered as \"{handler}\" (needed by \"{action}\")")]
    HandlerNotRegistered {
        store: String,
        handler: String,
        action: String,
    },

    /// The action or the plugin handler's work failed
    #[error("{store}: action \"{action}\" failed: {source}")]
    ActionFailed {
        store: String,
        action: String,
        #[source]
        source: anyhow::Error,
    },
}

impl StoreError {
    /// Name of the action whose dispatch failed
    pub fn action(&self) -> &str {
        match self {
            StoreError::UnknownAction { action, .. }
            | StoreError::HandlerNotRegistered { action, .. }
            | StoreError::ActionFailed { action, .. } => action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_store() {
        let err = StoreError::HandlerNotRegistered {
            store: "Store[counter]".to_string(),
            handler: "rx".to_string(),
            action: "rxIncreaseA".to_string(),
        };
        let message = err.to_string();
        assert!(message.starts_with("Store[counter]"));
        assert!(message.contains("\"rx\""));
        assert_eq!(err.action(), "rxIncreaseA");
    }

    #[test]
    fn test_action_failed_keeps_source() {
        let err = StoreError::ActionFailed {
            store: "Store[counter]".to_string(),
            action: "explode".to_string(),
            source: anyhow::anyhow!("boom"),
        };
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("boom"));
    }
}
