//! Configuration management commands

use crate::console::CliConsole;
use anyhow::{Result, bail};
use chatstream_core::Config;
use chatstream_core::config::save_to_file;
use colored::*;
use std::path::Path;

/// Show the effective configuration
pub async fn show(config: &Config, config_file: &Path) -> Result<()> {
    let console = CliConsole::new(true);

    if config_file.exists() {
        console.success(&format!("Loaded configuration from: {}", config_file.display()));
    } else {
        console.warn(&format!(
            "Configuration file not found: {}",
            config_file.display()
        ));
    }

    print_config(&console, config);
    Ok(())
}

/// Initialize a new configuration file
pub async fn init(config_file: &Path, force: bool) -> Result<()> {
    let console = CliConsole::new(true);

    if config_file.exists() && !force {
        console.error(&format!(
            "Configuration file already exists: {}",
            config_file.display()
        ));
        bail!("use --force to overwrite {}", config_file.display());
    }

    save_to_file(&Config::default(), config_file)?;

    console.success(&format!("Created configuration file: {}", config_file.display()));
    console.warn("Set OPENAI_API_KEY in the environment or a .env file; it is never written to the config file");
    Ok(())
}

fn print_config(console: &CliConsole, config: &Config) {
    let model = &config.model;
    console.print_header("Model");
    console.field("Name", model.name.green());
    console.field("Context window", model.max_tokens);
    console.field("Temperature", model.temperature);
    console.field("Top P", model.top_p);
    console.field("N", model.n);
    console.field("Max tokens", model.max_tokens_to_generate);
    console.field("Presence", model.presence_penalty);
    console.field("Frequency", model.frequency_penalty);
    if !model.stop.is_empty() {
        console.field("Stop", model.stop.join(", "));
    }
    console.field("System message", &model.initial_system_message);

    console.print_header("Provider");
    console.field("Base URL", config.provider.base_url.cyan());
    let api_key = match &config.provider.api_key {
        Some(_) => "set".green(),
        None => "missing".red(),
    };
    console.field("API key", api_key);
    if let Some(org) = &config.provider.organization {
        console.field("Organization", org);
    }
    console.field(
        "Request timeout",
        format!("{}s", config.provider.request_timeout_secs),
    );

    console.print_header("Storage");
    if config.storage.memory {
        console.field("Backend", "memory");
    } else {
        let dir = config
            .storage
            .directory
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| "~/.chatstream/conversations".to_string());
        console.field("Directory", dir);
    }

    console.print_header("Logging");
    console.field("Level", &config.logging.level);
    console.field("Format", format!("{:?}", config.logging.format).to_lowercase());
}
