//! Streaming completion use case

use super::dto::{ChatCompletionInput, ChatCompletionOutput};
use super::resolve::{admit, resolve_conversation, save};
use crate::entity::Role;
use crate::error::{ChatError, ChatResult};
use crate::llm::{CompletionProvider, CompletionRequest};
use crate::store::ConversationStore;
use crate::tokens::TokenCounter;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Runs one user turn, streaming the growing assistant reply to a consumer
///
/// Every content delta produces one [`ChatCompletionOutput`] snapshot holding
/// the full reply accumulated so far. Sending waits for channel capacity, so a
/// slow consumer slows down reads from the provider. The sender is dropped
/// when `execute` returns, which closes the channel for the consumer.
///
/// Nothing from the turn is persisted unless the stream completes: a
/// provider error, a cancellation or a vanished consumer aborts the turn.
pub struct ChatCompletionStreamUseCase {
    store: Arc<dyn ConversationStore>,
    provider: Arc<dyn CompletionProvider>,
    token_counter: Arc<dyn TokenCounter>,
}

impl ChatCompletionStreamUseCase {
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

    /// Execute one turn, publishing snapshots to `output`
    #[instrument(
        skip(self, input, output, cancel),
        fields(conversation_id = %input.conversation_id, user_id = %input.user_id)
    )]
    pub async fn execute(
        &self,
        input: ChatCompletionInput,
        output: mpsc::Sender<ChatCompletionOutput>,
        cancel: CancellationToken,
    ) -> ChatResult<ChatCompletionOutput> {
        let result = self.run(input, output, &cancel).await;
        if let Err(e) = &result {
            warn!(error = %e, stage = %e.stage(), "streaming completion aborted");
        }
        result
    }

    async fn run(
        &self,
        input: ChatCompletionInput,
        output: mpsc::Sender<ChatCompletionOutput>,
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

        let request = CompletionRequest::from_conversation(&conversation, true);
        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ChatError::streaming_cancelled()),
            result = self.provider.stream_complete(request) => result,
        };
        let mut stream = opened.map_err(|e| {
            ChatError::streaming(format!("failed to open completion stream: {}", e))
                .with_context(self.provider.name())
        })?;
        debug!(
            conversation_id = %conversation.id(),
            messages = conversation.message_count(),
            "completion stream opened"
        );

        let mut full_response = String::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ChatError::streaming_cancelled()),
                next = stream.next() => next,
            };

            let chunk = match next {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    return Err(ChatError::streaming(format!("error streaming response: {}", e))
                        .with_context(self.provider.name()));
                }
                None => {
                    return Err(ChatError::streaming(
                        "completion stream ended before its final chunk",
                    )
                    .with_context(self.provider.name()));
                }
            };

            if let Some(delta) = chunk.content {
                full_response.push_str(&delta);
                let snapshot = ChatCompletionOutput {
                    conversation_id: conversation.id().to_string(),
                    user_id: input.user_id.clone(),
                    content: full_response.clone(),
                };

                let sent = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(ChatError::streaming_cancelled()),
                    sent = output.send(snapshot) => sent,
                };
                sent.map_err(|_| ChatError::streaming("output consumer disconnected"))?;
            }

            if chunk.is_final {
                break;
            }
        }
        drop(stream);

        info!(
            conversation_id = %conversation.id(),
            length = full_response.len(),
            "completion stream finished"
        );

        admit(
            &mut conversation,
            counter,
            Role::Assistant,
            full_response.clone(),
        )?;
        if cancel.is_cancelled() {
            return Err(ChatError::streaming_cancelled());
        }
        save(self.store.as_ref(), &conversation, cancel).await?;

        Ok(ChatCompletionOutput {
            conversation_id: conversation.id().to_string(),
            user_id: input.user_id,
            content: full_response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Role;
    use crate::error::Stage;
    use crate::llm::StreamChunk;
    use crate::store::StoreError;
    use crate::usecase::test_support::{MockStore, ScriptedProvider, input, stored_conversation, words};

    fn use_case(store: MockStore, provider: Arc<ScriptedProvider>) -> ChatCompletionStreamUseCase {
        ChatCompletionStreamUseCase::new(Arc::new(store), provider, Arc::new(words))
    }

    fn channel() -> (
        mpsc::Sender<ChatCompletionOutput>,
        mpsc::Receiver<ChatCompletionOutput>,
    ) {
        mpsc::channel(8)
    }

    fn hello_script() -> Vec<ChatResult<StreamChunk>> {
        vec![
            Ok(StreamChunk::content("Hel")),
            Ok(StreamChunk::content("lo")),
            Ok(StreamChunk::final_chunk(Some("stop".to_string()))),
        ]
    }

    async fn drain(mut rx: mpsc::Receiver<ChatCompletionOutput>) -> Vec<String> {
        let mut contents = Vec::new();
        while let Some(snapshot) = rx.recv().await {
            contents.push(snapshot.content);
        }
        contents
    }

    #[tokio::test]
    async fn test_new_conversation_streams_snapshots_and_saves() {
        let mut store = MockStore::new();
        store.expect_find_by_id().times(0);
        store.expect_create().times(1).returning(|_| Ok(()));
        store
            .expect_save()
            .times(1)
            .withf(|c| {
                let messages = c.messages();
                messages.len() == 3
                    && messages[1].role() == Role::User
                    && messages[2].role() == Role::Assistant
                    && messages[2].content() == "Hello"
            })
            .returning(|_| Ok(()));

        let provider = Arc::new(ScriptedProvider::new(hello_script()));
        let use_case = use_case(store, provider.clone());
        let (tx, rx) = channel();

        let (result, snapshots) = tokio::join!(
            use_case.execute(input("", "Hi"), tx, CancellationToken::new()),
            drain(rx)
        );

        let output = result.unwrap();
        assert_eq!(output.content, "Hello");
        assert_eq!(output.user_id, "user-1");
        assert!(!output.conversation_id.is_empty());
        assert_eq!(snapshots, vec!["Hel", "Hello"]);

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].stream);
        assert_eq!(requests[0].messages.len(), 2);
        assert_eq!(requests[0].messages[1].content, "Hi");
    }

    #[tokio::test]
    async fn test_missing_id_is_adopted_by_new_conversation() {
        let mut store = MockStore::new();
        store
            .expect_find_by_id()
            .times(1)
            .returning(|id| Err(StoreError::NotFound(id.to_string())));
        store
            .expect_create()
            .times(1)
            .withf(|c| c.id() == "conv-7")
            .returning(|_| Ok(()));
        store.expect_save().times(1).returning(|_| Ok(()));

        let provider = Arc::new(ScriptedProvider::new(hello_script()));
        let use_case = use_case(store, provider);
        let (tx, rx) = channel();
        let (result, _) = tokio::join!(
            use_case.execute(input("conv-7", "Hi"), tx, CancellationToken::new()),
            drain(rx)
        );

        assert_eq!(result.unwrap().conversation_id, "conv-7");
    }

    #[tokio::test]
    async fn test_ended_conversation_is_rejected_without_side_effects() {
        let mut ended = stored_conversation("conv-1");
        ended.end();

        let mut store = MockStore::new();
        store
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(ended.clone()));
        store.expect_create().times(0);
        store.expect_save().times(0);

        let provider = Arc::new(ScriptedProvider::new(hello_script()));
        let use_case = use_case(store, provider.clone());
        let (tx, rx) = channel();
        let (result, snapshots) = tokio::join!(
            use_case.execute(
                input("conv-1", "Hi"),
                tx,
                CancellationToken::new()
            ),
            drain(rx)
        );

        assert!(matches!(
            result.unwrap_err(),
            ChatError::ConversationClosed { .. }
        ));
        assert_eq!(provider.call_count(), 0);
        assert!(snapshots.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure_other_than_not_found_aborts() {
        let mut store = MockStore::new();
        store.expect_find_by_id().times(1).returning(|_| {
            Err(StoreError::Io(std::io::Error::other("disk gone")))
        });
        store.expect_create().times(0);
        store.expect_save().times(0);

        let provider = Arc::new(ScriptedProvider::new(hello_script()));
        let (tx, _rx) = channel();
        let err = use_case(store, provider.clone())
            .execute(input("conv-1", "Hi"), tx, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::ConversationLookup { .. }));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_create_failure_prevents_provider_call() {
        let mut store = MockStore::new();
        store
            .expect_create()
            .times(1)
            .returning(|c| Err(StoreError::AlreadyExists(c.id().to_string())));
        store.expect_save().times(0);

        let provider = Arc::new(ScriptedProvider::new(hello_script()));
        let (tx, _rx) = channel();
        let err = use_case(store, provider.clone())
            .execute(input("", "Hi"), tx, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ChatError::Persistence {
                operation: "create",
                ..
            }
        ));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_stream_error_aborts_without_save() {
        let mut store = MockStore::new();
        store.expect_create().times(1).returning(|_| Ok(()));
        store.expect_save().times(0);

        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(StreamChunk::content("Hel")),
            Err(ChatError::llm("connection reset")),
        ]));
        let use_case = use_case(store, provider);
        let (tx, rx) = channel();
        let (result, snapshots) = tokio::join!(
            use_case.execute(input("", "Hi"), tx, CancellationToken::new()),
            drain(rx)
        );

        let err = result.unwrap_err();
        assert!(matches!(err, ChatError::Streaming { cancelled: false, .. }));
        assert_eq!(snapshots, vec!["Hel"]);
    }

    #[tokio::test]
    async fn test_stream_without_final_chunk_is_not_persisted() {
        let mut store = MockStore::new();
        store.expect_create().times(1).returning(|_| Ok(()));
        store.expect_save().times(0);

        let provider = Arc::new(ScriptedProvider::new(vec![Ok(StreamChunk::content("Hel"))]));
        let use_case = use_case(store, provider);
        let (tx, rx) = channel();
        let (result, snapshots) = tokio::join!(
            use_case.execute(input("", "Hi"), tx, CancellationToken::new()),
            drain(rx)
        );

        let err = result.unwrap_err();
        assert!(matches!(err, ChatError::Streaming { cancelled: false, .. }));
        assert_eq!(err.stage(), Stage::Completion);
        assert_eq!(snapshots, vec!["Hel"]);
    }

    #[tokio::test]
    async fn test_empty_reply_is_not_persisted() {
        let mut store = MockStore::new();
        store.expect_create().times(1).returning(|_| Ok(()));
        store.expect_save().times(0);

        let provider = Arc::new(ScriptedProvider::new(vec![Ok(StreamChunk::final_chunk(
            Some("stop".to_string()),
        ))]));
        let (tx, _rx) = channel();
        let err = use_case(store, provider)
            .execute(input("", "Hi"), tx, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_dropped_consumer_aborts_without_save() {
        let mut store = MockStore::new();
        store.expect_create().times(1).returning(|_| Ok(()));
        store.expect_save().times(0);

        let provider = Arc::new(ScriptedProvider::new(hello_script()));
        let (tx, rx) = channel();
        drop(rx);

        let err = use_case(store, provider)
            .execute(input("", "Hi"), tx, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::Streaming { cancelled: false, .. }));
    }

    #[tokio::test]
    async fn test_cancel_mid_stream_aborts_without_save() {
        let mut store = MockStore::new();
        store.expect_create().times(1).returning(|_| Ok(()));
        store.expect_save().times(0);

        let provider = Arc::new(ScriptedProvider::hanging(vec![Ok(StreamChunk::content(
            "partial",
        ))]));
        let use_case = use_case(store, provider);
        let cancel = CancellationToken::new();
        let (tx, mut rx) = channel();

        let consumer = async {
            let first = rx.recv().await.map(|s| s.content);
            cancel.cancel();
            first
        };
        let (result, first) = tokio::join!(
            use_case.execute(input("", "Hi"), tx, cancel.clone()),
            consumer
        );

        assert_eq!(first.as_deref(), Some("partial"));
        let err = result.unwrap_err();
        assert!(err.is_cancelled());
        assert!(matches!(err, ChatError::Streaming { cancelled: true, .. }));
    }

    #[tokio::test]
    async fn test_cancel_before_start_touches_nothing() {
        let mut store = MockStore::new();
        store.expect_find_by_id().times(0);
        store.expect_create().times(0);
        store.expect_save().times(0);

        let provider = Arc::new(ScriptedProvider::new(hello_script()));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (tx, _rx) = channel();

        let err = use_case(store, provider.clone())
            .execute(input("conv-1", "Hi"), tx, cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::Cancelled { .. }));
        assert_eq!(err.stage(), Stage::Lookup);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_user_message_is_rejected() {
        let mut store = MockStore::new();
        store.expect_create().times(1).returning(|_| Ok(()));
        store.expect_save().times(0);

        let provider = Arc::new(ScriptedProvider::new(hello_script()));
        let huge = vec!["word"; 200].join(" ");
        let (tx, _rx) = channel();
        let err = use_case(store, provider.clone())
            .execute(input("", &huge), tx, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::MessageTooLarge { .. }));
        assert_eq!(provider.call_count(), 0);
    }
}
