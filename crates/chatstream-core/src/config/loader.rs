//! Configuration loading from multiple sources

use super::env_loader::apply_env;
use super::file_loader::load_from_file;
use super::model::Config;
use crate::error::{ChatError, ChatResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Source of configuration data
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Configuration from a file; replaces everything loaded before it
    File(PathBuf),
    /// Overrides from environment variables (and `.env`)
    Environment,
    /// Overrides from command line arguments
    CommandLine(HashMap<String, String>),
    /// Default configuration
    Default,
}

/// Configuration loader with support for multiple sources
///
/// Sources are applied in the order they were added; later sources win.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    sources: Vec<ConfigSource>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a configuration source
    pub fn add_source(mut self, source: ConfigSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Add a file source
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Self {
        self.add_source(ConfigSource::File(path.as_ref().to_path_buf()))
    }

    /// Add environment variables source
    pub fn with_env(self) -> Self {
        self.add_source(ConfigSource::Environment)
    }

    /// Add command line arguments source
    pub fn with_args(self, args: HashMap<String, String>) -> Self {
        self.add_source(ConfigSource::CommandLine(args))
    }

    /// Add default configuration source
    pub fn with_defaults(self) -> Self {
        self.add_source(ConfigSource::Default)
    }

    /// Load configuration from all sources and validate the result
    pub fn load(self) -> ChatResult<Config> {
        let mut config = Config::default();

        for source in &self.sources {
            match source {
                ConfigSource::Default => {
                    tracing::debug!("Loading default config");
                    config = Config::default();
                }
                ConfigSource::File(path) => {
                    tracing::debug!("Loading config from file: {}", path.display());
                    config = load_from_file(path)?;
                }
                ConfigSource::Environment => {
                    tracing::debug!("Loading config from environment");
                    if let Err(e) = dotenvy::dotenv() {
                        if !e.not_found() {
                            tracing::warn!("Failed to load .env file: {}", e);
                        }
                    }
                    apply_env(&mut config, |key| std::env::var(key).ok())?;
                }
                ConfigSource::CommandLine(args) => {
                    tracing::debug!("Loading config from command line");
                    apply_args(&mut config, args)?;
                }
            }
        }

        config.validate()?;
        Ok(config)
    }
}

/// Apply command line overrides
///
/// Supported keys: `model`, `base_url`, `api_key`, `temperature`,
/// `max_tokens`, `storage_dir`, `log_level`.
fn apply_args(config: &mut Config, args: &HashMap<String, String>) -> ChatResult<()> {
    if let Some(model) = args.get("model") {
        config.model.name = model.clone();
    }
    if let Some(base_url) = args.get("base_url") {
        config.provider.base_url = base_url.clone();
    }
    if let Some(api_key) = args.get("api_key") {
        config.provider.api_key = Some(api_key.clone());
    }
    if let Some(temperature) = args.get("temperature") {
        config.model.temperature = temperature
            .parse()
            .map_err(|_| ChatError::config(format!("Invalid temperature: {}", temperature)))?;
    }
    if let Some(max_tokens) = args.get("max_tokens") {
        config.model.max_tokens_to_generate = max_tokens
            .parse()
            .map_err(|_| ChatError::config(format!("Invalid max_tokens: {}", max_tokens)))?;
    }
    if let Some(dir) = args.get("storage_dir") {
        config.storage.directory = Some(PathBuf::from(dir));
    }
    if let Some(level) = args.get("log_level") {
        config.logging.level = level.clone();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_later_sources_win() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("chatstream.json");
        fs::write(&path, r#"{ "model": { "name": "gpt-4o", "temperature": 0.5 } }"#).unwrap();

        let mut args = HashMap::new();
        args.insert("temperature".to_string(), "1.5".to_string());

        let config = ConfigLoader::new()
            .with_defaults()
            .with_file(&path)
            .with_args(args)
            .load()
            .unwrap();

        assert_eq!(config.model.name, "gpt-4o");
        assert_eq!(config.model.temperature, 1.5);
    }

    #[test]
    fn test_load_validates_result() {
        let mut args = HashMap::new();
        args.insert("temperature".to_string(), "5".to_string());

        let result = ConfigLoader::new().with_defaults().with_args(args).load();
        assert!(matches!(result, Err(ChatError::Config { .. })));
    }

    #[test]
    fn test_invalid_arg_value() {
        let mut args = HashMap::new();
        args.insert("max_tokens".to_string(), "many".to_string());

        let result = ConfigLoader::new().with_args(args).load();
        assert!(result.is_err());
    }
}
