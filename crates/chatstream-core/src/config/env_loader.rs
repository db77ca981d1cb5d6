//! Environment variable-based configuration

use super::model::Config;
use crate::error::{ChatError, ChatResult};
use std::path::PathBuf;
use std::str::FromStr;

/// Apply environment overrides to `config`
///
/// `lookup` resolves a variable name to its value; the loader passes
/// `std::env::var`, tests pass a map.
pub fn apply_env<F>(config: &mut Config, lookup: F) -> ChatResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(api_key) = lookup("OPENAI_API_KEY") {
        config.provider.api_key = Some(api_key);
    }
    if let Some(base_url) = lookup("CHATSTREAM_BASE_URL") {
        config.provider.base_url = base_url;
    }
    if let Some(org) = lookup("CHATSTREAM_ORGANIZATION") {
        config.provider.organization = Some(org);
    }
    parse_into(
        &lookup,
        "CHATSTREAM_REQUEST_TIMEOUT",
        &mut config.provider.request_timeout_secs,
    )?;

    let model = &mut config.model;
    if let Some(name) = lookup("CHATSTREAM_MODEL") {
        model.name = name;
    }
    parse_into(&lookup, "CHATSTREAM_MODEL_MAX_TOKENS", &mut model.max_tokens)?;
    parse_into(&lookup, "CHATSTREAM_TEMPERATURE", &mut model.temperature)?;
    parse_into(&lookup, "CHATSTREAM_TOP_P", &mut model.top_p)?;
    parse_into(&lookup, "CHATSTREAM_N", &mut model.n)?;
    parse_into(&lookup, "CHATSTREAM_MAX_TOKENS", &mut model.max_tokens_to_generate)?;
    parse_into(&lookup, "CHATSTREAM_PRESENCE_PENALTY", &mut model.presence_penalty)?;
    parse_into(&lookup, "CHATSTREAM_FREQUENCY_PENALTY", &mut model.frequency_penalty)?;
    if let Some(stop) = lookup("CHATSTREAM_STOP") {
        model.stop = stop
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(message) = lookup("CHATSTREAM_INITIAL_MESSAGE") {
        model.initial_system_message = message;
    }

    if let Some(dir) = lookup("CHATSTREAM_STORAGE_DIR") {
        config.storage.directory = Some(PathBuf::from(dir));
    }
    if let Some(level) = lookup("CHATSTREAM_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = lookup("CHATSTREAM_LOG_FORMAT") {
        config.logging.format = format.parse()?;
    }

    Ok(())
}

fn parse_into<F, T>(lookup: &F, var: &str, target: &mut T) -> ChatResult<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(var) {
        *target = raw
            .trim()
            .parse()
            .map_err(|_| ChatError::config(format!("Invalid {} value: {}", var, raw)))?;
    }
    Ok(())
}
