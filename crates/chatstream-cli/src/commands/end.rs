//! End a conversation

use crate::console::CliConsole;
use anyhow::Result;
use chatstream_core::{Config, end_conversation};
use chatstream_session::store_from_config;

pub async fn execute(config: &Config, id: &str) -> Result<()> {
    let console = CliConsole::new(true);
    let store = store_from_config(&config.storage)?;

    let conversation = end_conversation(store.as_ref(), id).await?;
    console.success(&format!(
        "Ended conversation {} ({} messages)",
        conversation.id(),
        conversation.message_count()
    ));
    Ok(())
}
