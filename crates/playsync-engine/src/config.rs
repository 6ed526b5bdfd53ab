//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Settings for [`crate::ThreadedEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of simultaneously registered listeners.
    pub max_listeners: usize,
    /// Name given to the engine worker thread.
    pub thread_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_listeners: 16,
            thread_name: "playlist-engine".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_defaults() {
        let config: EngineConfig =
            playsync_core::config::from_json_str(r#"{"max_listeners": 2}"#).unwrap_or_default();
        assert_eq!(config.max_listeners, 2);
        assert_eq!(config.thread_name, "playlist-engine");
    }
}
