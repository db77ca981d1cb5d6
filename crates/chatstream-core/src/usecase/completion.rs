//! Non-streaming completion use case

use super::dto::{ChatCompletionInput, ChatCompletionOutput};
use super::resolve::{admit, resolve_conversation, save};
use crate::entity::Role;
use crate::error::{ChatError, ChatResult, Stage};
use crate::llm::{CompletionProvider, CompletionRequest};
use crate::store::ConversationStore;
use crate::tokens::TokenCounter;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

/// Runs one user turn and returns the complete assistant reply
pub struct ChatCompletionUseCase {
    store: Arc<dyn ConversationStore>,
    provider: Arc<dyn CompletionProvider>,
    token_counter: Arc<dyn TokenCounter>,
}

impl ChatCompletionUseCase {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        provider: Arc<dyn CompletionProvider>,
        token_counter: Arc<dyn TokenCounter>,
    ) -> Self {
        Self {
            store,
            provider,
            token_counter,
        }
    }

    #[instrument(
        skip(self, input, cancel),
        fields(conversation_id = %input.conversation_id, user_id = %input.user_id)
    )]
    pub async fn execute(
        &self,
        input: ChatCompletionInput,
        cancel: CancellationToken,
    ) -> ChatResult<ChatCompletionOutput> {
        let result = self.run(input, &cancel).await;
        if let Err(e) = &result {
            warn!(error = %e, stage = %e.stage(), "completion aborted");
        }
        result
    }

    async fn run(
        &self,
        input: ChatCompletionInput,
        cancel: &CancellationToken,
    ) -> ChatResult<ChatCompletionOutput> {
        let counter = self.token_counter.as_ref();
        let mut conversation =
            resolve_conversation(self.store.as_ref(), counter, &input, cancel).await?;

        admit(
            &mut conversation,
            counter,
            Role::User,
            input.user_message.clone(),
        )?;

        let request = CompletionRequest::from_conversation(&conversation, false);
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ChatError::cancelled(Stage::Completion)),
            result = self.provider.complete(request) => result?,
        };

        admit(
            &mut conversation,
            counter,
            Role::Assistant,
            response.content.clone(),
        )?;
        save(self.store.as_ref(), &conversation, cancel).await?;

        Ok(ChatCompletionOutput {
            conversation_id: conversation.id().to_string(),
            user_id: input.user_id,
            content: response.content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::StreamChunk;
    use crate::usecase::test_support::{MockStore, ScriptedProvider, input, stored_conversation, words};

    #[tokio::test]
    async fn test_complete_continues_stored_conversation() {
        let mut store = MockStore::new();
        store
            .expect_find_by_id()
            .times(1)
            .returning(|id| Ok(stored_conversation(id)));
        store.expect_create().times(0);
        store
            .expect_save()
            .times(1)
            .withf(|c| c.message_count() == 3 && c.messages()[2].content() == "Sure thing")
            .returning(|_| Ok(()));

        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(StreamChunk::content("Sure ")),
            Ok(StreamChunk::content("thing")),
            Ok(StreamChunk::final_chunk(Some("stop".to_string()))),
        ]));
        let use_case = ChatCompletionUseCase::new(Arc::new(store), provider.clone(), Arc::new(words));

        let output = use_case
            .execute(input("conv-1", "Help me"), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(output.conversation_id, "conv-1");
        assert_eq!(output.content, "Sure thing");
        assert!(!provider.requests.lock().unwrap()[0].stream);
    }

    #[tokio::test]
    async fn test_complete_propagates_provider_error() {
        let mut store = MockStore::new();
        store.expect_create().times(1).returning(|_| Ok(()));
        store.expect_save().times(0);

        let provider = Arc::new(ScriptedProvider::new(vec![Err(ChatError::llm_with_status(
            "rate limited",
            "scripted",
            429,
        ))]));
        let use_case = ChatCompletionUseCase::new(Arc::new(store), provider, Arc::new(words));

        let err = use_case
            .execute(input("", "Help me"), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ChatError::Llm {
                status_code: Some(429),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_cancel_during_completion_reports_completion_stage() {
        let mut store = MockStore::new();
        store.expect_create().times(1).returning(|_| Ok(()));
        store.expect_save().times(0);

        let provider = Arc::new(ScriptedProvider::hanging(vec![Ok(StreamChunk::content(
            "never finished",
        ))]));
        let use_case = ChatCompletionUseCase::new(Arc::new(store), provider.clone(), Arc::new(words));
        let cancel = CancellationToken::new();

        let canceller = async {
            while provider.call_count() == 0 {
                tokio::task::yield_now().await;
            }
            cancel.cancel();
        };
        let (result, _) = tokio::join!(
            use_case.execute(input("", "Help me"), cancel.clone()),
            canceller
        );

        let err = result.unwrap_err();
        assert!(matches!(err, ChatError::Cancelled { .. }));
        assert_eq!(err.stage(), Stage::Completion);
    }
}
