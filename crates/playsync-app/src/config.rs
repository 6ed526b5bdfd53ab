//! Application configuration.

use std::path::PathBuf;

use playsync_controller::ControllerConfig;
use playsync_core::config::{default_config_path, load_json_or_default};
use playsync_engine::EngineConfig;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the configuration path.
const CONFIG_ENV: &str = "PLAYSYNC_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub controller: ControllerConfig,
    pub engine: EngineConfig,
    /// Owner loop tick in milliseconds.
    pub tick_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            controller: ControllerConfig::default(),
            engine: EngineConfig::default(),
            tick_ms: 16,
        }
    }
}

impl AppConfig {
    /// Load from `$PLAYSYNC_CONFIG` or the platform config directory.
    pub fn load() -> playsync_core::Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(default_config_path);
        match path {
            Some(path) => load_json_or_default(&path),
            None => Ok(Self::default()),
        }
    }
}
