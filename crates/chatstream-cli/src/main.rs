//! Chatstream CLI application
//!
//! Chat with an OpenAI-compatible model from the terminal. Conversations are
//! stored between runs and trimmed to the model's context window as they
//! grow.
//!
//! # Installation
//!
//! ```bash
//! cargo install --path crates/chatstream-cli
//! ```
//!
//! # Usage
//!
//! - `chatstream chat "question"` streams one reply and prints the
//!   conversation id; pass `-c <id>` to continue it later.
//! - `chatstream chat` starts an interactive loop on stdin.
//! - `chatstream show <id>` / `chatstream end <id>` inspect or close a
//!   conversation.
//!
//! Logs go to stderr. Set `RUST_LOG` to override the configured level.

mod args;
mod commands;
mod console;
mod router;

use anyhow::Result;
use chatstream_core::config::{ConfigLoader, LogFormat, LoggingConfig};
use clap::Parser;
use tracing_subscriber::EnvFilter;

pub use args::{Cli, Commands, ConfigAction};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // `config init` must work even when the existing file is unreadable
    if let Commands::Config {
        action: ConfigAction::Init { force },
    } = &cli.command
    {
        init_logging(&LoggingConfig::default(), cli.verbose);
        return commands::config::init(&cli.config_file, *force).await;
    }

    let config = ConfigLoader::new()
        .with_defaults()
        .with_file(&cli.config_file)
        .with_env()
        .with_args(cli.config_overrides())
        .load()?;

    init_logging(&config.logging, cli.verbose);
    tracing::debug!(config_file = %cli.config_file.display(), "configuration loaded");

    router::route(cli, config).await
}

/// Initialize logging with environment-based filtering
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}
