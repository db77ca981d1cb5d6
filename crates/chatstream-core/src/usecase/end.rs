//! Ending a conversation

use crate::entity::Conversation;
use crate::error::{ChatError, ChatResult};
use crate::store::ConversationStore;
use tracing::info;

/// Mark a stored conversation as ended and persist it
pub async fn end_conversation(
    store: &dyn ConversationStore,
    conversation_id: &str,
) -> ChatResult<Conversation> {
    let mut conversation =
        store
            .find_by_id(conversation_id)
            .await
            .map_err(|source| ChatError::ConversationLookup {
                conversation_id: conversation_id.to_string(),
                source,
            })?;

    conversation.end();
    store
        .save(&conversation)
        .await
        .map_err(|source| ChatError::persistence("save", conversation_id, source))?;

    info!(conversation_id, "conversation ended");
    Ok(conversation)
}
