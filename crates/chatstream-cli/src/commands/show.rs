//! Show a stored conversation

use crate::console::CliConsole;
use anyhow::{Context, Result};
use chatstream_core::{Config, Message, Role, Status};
use chatstream_session::store_from_config;
use colored::*;

pub async fn execute(config: &Config, id: &str) -> Result<()> {
    let console = CliConsole::new(true);
    let store = store_from_config(&config.storage)?;
    let conversation = store
        .find_by_id(id)
        .await
        .with_context(|| format!("Failed to load conversation {}", id))?;

    console.print_header(&format!("Conversation {}", conversation.id()));
    let status = match conversation.status() {
        Status::Active => "active".green(),
        Status::Ended => "ended".red(),
    };
    console.field("Status", status);
    console.field("User", conversation.user_id());
    console.field("Model", conversation.model().name());
    console.field(
        "Tokens",
        format!(
            "{} / {}",
            conversation.token_usage(),
            conversation.model().max_tokens()
        ),
    );

    console.print_header("Messages");
    for message in conversation.messages() {
        print_message(message, false);
    }

    if !conversation.erased_messages().is_empty() {
        console.print_header(&format!(
            "Evicted ({})",
            conversation.erased_messages().len()
        ));
        for message in conversation.erased_messages() {
            print_message(message, true);
        }
    }
    Ok(())
}

fn print_message(message: &Message, evicted: bool) {
    let role = match message.role() {
        Role::System => "system".magenta(),
        Role::User => "user".cyan(),
        Role::Assistant => "assistant".green(),
    };
    let header = format!("[{}] {} tokens", role, message.token_count());
    if evicted {
        println!("{}", header.dimmed());
        println!("{}", message.content().dimmed());
    } else {
        println!("{}", header);
        println!("{}", message.content());
    }
    println!();
}
