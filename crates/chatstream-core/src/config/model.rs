//! Configuration data models

use super::logging_config::LoggingConfig;
use crate::error::{ChatError, ChatResult};
use crate::usecase::ChatCompletionConfigInput;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Model and sampling settings used when a new conversation is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Model identifier understood by the provider
    pub name: String,
    /// Context window size in tokens
    pub max_tokens: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub n: u32,
    pub stop: Vec<String>,
    /// Number of tokens to generate per reply
    pub max_tokens_to_generate: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    /// System message seeding every new conversation
    pub initial_system_message: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: "gpt-3.5-turbo".to_string(),
            max_tokens: 4096,
            temperature: 0.1,
            top_p: 1.0,
            n: 1,
            stop: Vec::new(),
            max_tokens_to_generate: 300,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            initial_system_message: "You are a helpful assistant.".to_string(),
        }
    }
}

impl ModelSettings {
    /// Conversation config carried in every use case input
    pub fn to_input_config(&self) -> ChatCompletionConfigInput {
        ChatCompletionConfigInput {
            model: self.name.clone(),
            model_max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            n: self.n,
            stop: self.stop.clone(),
            max_tokens: self.max_tokens_to_generate,
            presence_penalty: self.presence_penalty,
            frequency_penalty: self.frequency_penalty,
            initial_system_message: self.initial_system_message.clone(),
        }
    }
}

/// Completion provider connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// API key (usually from the environment)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Organization header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds, streamed body included
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            organization: None,
            connect_timeout_secs: 10,
            request_timeout_secs: 300,
        }
    }
}

/// Conversation storage settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for conversation files; `~/.chatstream/conversations` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// Keep conversations in memory only
    pub memory: bool,
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelSettings,
    pub provider: ProviderConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> ChatResult<()> {
        let model = &self.model;
        if model.name.trim().is_empty() {
            return Err(ChatError::config("Model name must not be empty"));
        }
        if model.max_tokens == 0 {
            return Err(ChatError::config("Model max tokens must be positive"));
        }
        if !(0.0..=2.0).contains(&model.temperature) {
            return Err(ChatError::config("Temperature must be between 0 and 2"));
        }
        if !(0.0..=1.0).contains(&model.top_p) {
            return Err(ChatError::config("Top P must be between 0 and 1"));
        }
        if !(-2.0..=2.0).contains(&model.presence_penalty)
            || !(-2.0..=2.0).contains(&model.frequency_penalty)
        {
            return Err(ChatError::config("Penalties must be between -2 and 2"));
        }
        if model.n == 0 {
            return Err(ChatError::config("N must be at least 1"));
        }
        if model.initial_system_message.trim().is_empty() {
            return Err(ChatError::config("Initial system message must not be empty"));
        }
        if self.provider.base_url.trim().is_empty() {
            return Err(ChatError::config("Provider base URL must not be empty"));
        }
        if self.provider.request_timeout_secs == 0 {
            return Err(ChatError::config("Request timeout must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut config = Config::default();
        config.model.temperature = 3.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.model.max_tokens = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.model.initial_system_message = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.provider.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_provider_timeouts() {
        let provider = ProviderConfig::default();
        assert_eq!(provider.connect_timeout_secs, 10);
        assert_eq!(provider.request_timeout_secs, 300);

        let provider: ProviderConfig =
            serde_json::from_str(r#"{ "request_timeout_secs": 45 }"#).unwrap();
        assert_eq!(provider.request_timeout_secs, 45);
        assert_eq!(provider.connect_timeout_secs, 10);
    }

    #[test]
    fn test_to_input_config() {
        let settings = ModelSettings {
            stop: vec!["END".to_string()],
            ..ModelSettings::default()
        };
        let input = settings.to_input_config();

        assert_eq!(input.model, "gpt-3.5-turbo");
        assert_eq!(input.model_max_tokens, 4096);
        assert_eq!(input.max_tokens, 300);
        assert_eq!(input.stop, vec!["END".to_string()]);
        assert_eq!(input.initial_system_message, "You are a helpful assistant.");
    }
}
