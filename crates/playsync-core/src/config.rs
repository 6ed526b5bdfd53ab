//! JSON configuration loading.

#![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::{Error, Result};

/// File name of the configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "playsync.json";

/// Default configuration path, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "playsync").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Parses a configuration from a JSON string.
pub fn from_json_str<T: DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|e| Error::Config(format!("Invalid configuration: {e}")))
}

/// Loads a configuration from `path`; a missing file yields `T::default()`.
pub fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            info!("Loaded configuration from {}", path.display());
            from_json_str(&contents)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No configuration at {}, using defaults", path.display());
            Ok(T::default())
        }
        Err(e) => Err(Error::Io(e)),
    }
}
