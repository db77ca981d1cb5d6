//! Conversation resolution and turn admission shared by the use cases

use super::dto::ChatCompletionInput;
use crate::entity::{ChatConfig, Conversation, Message, Model, Role};
use crate::error::{ChatError, ChatResult, Stage};
use crate::store::{ConversationStore, StoreError};
use crate::tokens::TokenCounter;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Load the conversation named by the input, or create and persist a new one
///
/// An empty id skips the lookup. A non-empty id that is not found becomes the
/// id of the new conversation.
pub(super) async fn resolve_conversation(
    store: &dyn ConversationStore,
    counter: &dyn TokenCounter,
    input: &ChatCompletionInput,
    cancel: &CancellationToken,
) -> ChatResult<Conversation> {
    if !input.conversation_id.is_empty() {
        let lookup = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ChatError::cancelled(Stage::Lookup)),
            result = store.find_by_id(&input.conversation_id) => result,
        };

        match lookup {
            Ok(conversation) => {
                debug!(conversation_id = %conversation.id(), "loaded conversation");
                return Ok(conversation);
            }
            Err(StoreError::NotFound(_)) => {}
            Err(source) => {
                return Err(ChatError::ConversationLookup {
                    conversation_id: input.conversation_id.clone(),
                    source,
                });
            }
        }
    }

    let conversation = new_conversation(counter, input)?;

    let created = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ChatError::cancelled(Stage::Persistence)),
        result = store.create(&conversation) => result,
    };
    created.map_err(|source| ChatError::persistence("create", conversation.id(), source))?;

    debug!(conversation_id = %conversation.id(), "created conversation");
    Ok(conversation)
}

/// Build a conversation from the input's config, seeded with its system message
fn new_conversation(
    counter: &dyn TokenCounter,
    input: &ChatCompletionInput,
) -> ChatResult<Conversation> {
    let settings = &input.config;
    let model = Model::new(&settings.model, settings.model_max_tokens)
        .map_err(|e| e.with_context("creating new conversation"))?;

    let config = ChatConfig {
        model: model.clone(),
        temperature: settings.temperature,
        top_p: settings.top_p,
        n: settings.n,
        stop: settings.stop.clone(),
        max_tokens: settings.max_tokens,
        presence_penalty: settings.presence_penalty,
        frequency_penalty: settings.frequency_penalty,
    };

    let system = Message::new(
        Role::System,
        settings.initial_system_message.clone(),
        &model,
        counter,
    )
    .map_err(|e| e.with_context("creating initial system message"))?;

    let conversation = if input.conversation_id.is_empty() {
        Conversation::new(&input.user_id, system, config)
    } else {
        Conversation::with_id(&input.conversation_id, &input.user_id, system, config)
    };
    conversation.map_err(|e| e.with_context("creating new conversation"))
}

/// Build a message against the conversation's model and admit it
pub(super) fn admit(
    conversation: &mut Conversation,
    counter: &dyn TokenCounter,
    role: Role,
    content: String,
) -> ChatResult<()> {
    let message = Message::new(role, content, conversation.model(), counter)
        .map_err(|e| e.with_context(format!("creating {} message", role)))?;
    conversation.add_message(message)
}

/// Persist the conversation unless the caller has cancelled
pub(super) async fn save(
    store: &dyn ConversationStore,
    conversation: &Conversation,
    cancel: &CancellationToken,
) -> ChatResult<()> {
    let saved = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ChatError::cancelled(Stage::Persistence)),
        result = store.save(conversation) => result,
    };
    saved.map_err(|source| ChatError::persistence("save", conversation.id(), source))
}
