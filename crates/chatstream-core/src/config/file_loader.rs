//! File-based configuration loading

use super::model::Config;
use crate::error::{ChatError, ChatResult};
use std::fs;
use std::path::Path;

/// Load configuration from a file
///
/// TOML when the extension is `.toml`, JSON otherwise. Returns the default
/// config if the file doesn't exist.
pub fn load_from_file(path: &Path) -> ChatResult<Config> {
    if !path.exists() {
        tracing::debug!("Config file {} not found, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        ChatError::config_with_context(
            format!("Failed to read config file: {}", e),
            format!("Reading configuration from '{}'", path.display()),
        )
    })?;

    let config = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|e| {
            ChatError::config_with_context(
                format!("Failed to parse TOML config: {}", e),
                format!("Deserializing TOML configuration from '{}'", path.display()),
            )
        })?,
        _ => serde_json::from_str(&content).map_err(|e| {
            ChatError::config_with_context(
                format!("Failed to parse JSON config: {}", e),
                format!("Deserializing JSON configuration from '{}'", path.display()),
            )
        })?,
    };

    Ok(config)
}

/// Write a configuration file, format chosen by extension as in [`load_from_file`]
///
/// The API key is never written.
pub fn save_to_file(config: &Config, path: &Path) -> ChatResult<()> {
    let mut config = config.clone();
    config.provider.api_key = None;

    let content = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::to_string_pretty(&config)
            .map_err(|e| ChatError::config(format!("Failed to serialize config: {}", e)))?,
        _ => serde_json::to_string_pretty(&config)
            .map_err(|e| ChatError::config(format!("Failed to serialize config: {}", e)))?,
    };

    fs::write(path, content).map_err(|e| {
        ChatError::config_with_context(
            format!("Failed to write config file: {}", e),
            format!("Writing configuration to '{}'", path.display()),
        )
    })
}
