//! Command routing logic for CLI

use crate::args::{Cli, Commands, ConfigAction};
use crate::commands;
use crate::commands::chat::ChatArgs;
use anyhow::Result;
use chatstream_core::Config;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Chat {
            message,
            conversation_id,
            user_id,
            no_stream,
        } => {
            let args = ChatArgs {
                message,
                conversation_id,
                user_id,
                stream: !no_stream,
                verbose: cli.verbose,
            };
            commands::chat::execute(&config, args).await
        }
        Commands::Show { id } => commands::show::execute(&config, &id).await,
        Commands::End { id } => commands::end::execute(&config, &id).await,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config, &cli.config_file).await,
            ConfigAction::Init { force } => commands::config::init(&cli.config_file, force).await,
        },
    }
}
