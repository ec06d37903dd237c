//! Config file location and loading.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the Billscope config directory.
/// Priority: `BILLSCOPE_CONFIG_DIR` env > `~/.billscope/` > `./.billscope`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BILLSCOPE_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .map(|home| home.join(".billscope"))
        .unwrap_or_else(|| PathBuf::from(".billscope"))
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Pick the config file: explicit path, then `BILLSCOPE_CONFIG`, then the
/// default location.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("BILLSCOPE_CONFIG") {
        return PathBuf::from(path);
    }
    config_file_path(&config_dir())
}

/// Load the config file as an untyped JSON value tree.
///
/// Returns an empty object if the file doesn't exist, so every field falls
/// back to its default.
pub async fn load_raw_config(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    // An empty YAML document parses as null.
    let value: Value = serde_yaml::from_str::<Option<Value>>(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?
        .unwrap_or_else(|| Value::Object(Default::default()));
    Ok(value)
}
