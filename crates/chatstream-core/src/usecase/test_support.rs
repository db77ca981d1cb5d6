//! Shared fixtures for use case tests

use super::dto::{ChatCompletionConfigInput, ChatCompletionInput};
use crate::entity::{ChatConfig, Conversation, Message, Model, Role};
use crate::error::ChatResult;
use crate::llm::{
    CompletionProvider, CompletionRequest, CompletionResponse, CompletionStream, StreamChunk,
    stream_utils,
};
pub use crate::store::MockConversationStore as MockStore;
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One token per whitespace-separated word
pub fn words(_model: &str, text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn config_input() -> ChatCompletionConfigInput {
    ChatCompletionConfigInput {
        model: "gpt-test".to_string(),
        model_max_tokens: 100,
        temperature: 0.5,
        top_p: 1.0,
        n: 1,
        stop: Vec::new(),
        max_tokens: 50,
        presence_penalty: 0.0,
        frequency_penalty: 0.0,
        initial_system_message: "be brief".to_string(),
    }
}

pub fn input(conversation_id: &str, message: &str) -> ChatCompletionInput {
    ChatCompletionInput {
        conversation_id: conversation_id.to_string(),
        user_id: "user-1".to_string(),
        user_message: message.to_string(),
        config: config_input(),
    }
}

pub fn stored_conversation(id: &str) -> Conversation {
    let model = Model::new("gpt-test", 100).unwrap();
    let system = Message::new(Role::System, "be brief", &model, &words).unwrap();
    Conversation::with_id(id, "user-1", system, ChatConfig::new(model)).unwrap()
}

/// Provider that replays a fixed script and records what it was asked
pub struct ScriptedProvider {
    chunks: Mutex<Vec<ChatResult<StreamChunk>>>,
    hang_after_script: bool,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(chunks: Vec<ChatResult<StreamChunk>>) -> Self {
        Self {
            chunks: Mutex::new(chunks),
            hang_after_script: false,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Keep the stream open after the script instead of ending it
    pub fn hanging(chunks: Vec<ChatResult<StreamChunk>>) -> Self {
        Self {
            hang_after_script: true,
            ..Self::new(chunks)
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn take_script(&self, request: CompletionRequest) -> Vec<ChatResult<StreamChunk>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        std::mem::take(&mut *self.chunks.lock().unwrap())
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> ChatResult<CompletionResponse> {
        stream_utils::collect_stream(self.stream_complete(request).await?).await
    }

    async fn stream_complete(&self, request: CompletionRequest) -> ChatResult<CompletionStream> {
        let stream = stream_utils::from_chunks(self.take_script(request));
        if self.hang_after_script {
            Ok(stream.chain(futures::stream::pending()).boxed())
        } else {
            Ok(stream)
        }
    }
}
