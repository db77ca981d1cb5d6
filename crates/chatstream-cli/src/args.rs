//! CLI argument definitions using clap
//!
//! - chatstream chat "message"        # One turn, streamed
//! - chatstream chat                  # Interactive loop
//! - chatstream chat -c <id> "..."    # Continue a conversation
//! - chatstream show/end <id>         # Inspect or close a conversation
//! - chatstream config show/init      # Configuration utilities

use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;

/// Default configuration file name used across all CLI commands.
pub const DEFAULT_CONFIG_FILE: &str = "chatstream.json";

/// User id recorded on conversations started from the CLI
pub const DEFAULT_USER: &str = "cli";

#[derive(Debug, Parser)]
#[command(name = "chatstream")]
#[command(about = "Chat with an OpenAI-compatible model, keeping conversations inside the context window")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (.json or .toml)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,

    /// Override the model name
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Override the conversation storage directory
    #[arg(long, global = true)]
    pub storage_dir: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Command-line overrides in the form the config loader expects
    pub fn config_overrides(&self) -> HashMap<String, String> {
        let mut args = HashMap::new();
        if let Some(model) = &self.model {
            args.insert("model".to_string(), model.clone());
        }
        if let Some(dir) = &self.storage_dir {
            args.insert("storage_dir".to_string(), dir.display().to_string());
        }
        if self.verbose {
            args.insert("log_level".to_string(), "debug".to_string());
        }
        args
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Send a message, or start an interactive chat when none is given
    Chat {
        /// Message to send
        message: Option<String>,

        /// Conversation to continue
        #[arg(short = 'c', long = "conversation")]
        conversation_id: Option<String>,

        /// User id for new conversations
        #[arg(long = "user", default_value = DEFAULT_USER)]
        user_id: String,

        /// Wait for the whole reply instead of streaming it
        #[arg(long)]
        no_stream: bool,
    },

    /// Show a stored conversation
    Show {
        /// Conversation id
        id: String,
    },

    /// End a conversation so it accepts no further messages
    End {
        /// Conversation id
        id: String,
    },

    /// Manage configuration files
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand, Clone)]
pub enum ConfigAction {
    /// Display the effective configuration
    Show,

    /// Create a new configuration file with defaults
    Init {
        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}
