//! Provider trait and request/response shapes

use super::streaming::CompletionStream;
use crate::entity::{Conversation, Role};
use crate::error::ChatResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A role + content pair as sent to the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: Role,
    pub content: String,
}

/// Sampling parameters forwarded with every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub n: u32,
    pub stop: Vec<String>,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
}

/// A chat completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<CompletionMessage>,
    pub sampling: SamplingParams,
    pub stream: bool,
}

impl CompletionRequest {
    /// Project a conversation's active window and sampling config into a request
    pub fn from_conversation(conversation: &Conversation, stream: bool) -> Self {
        let config = conversation.config();
        let messages = conversation
            .messages()
            .iter()
            .map(|m| CompletionMessage {
                role: m.role(),
                content: m.content().to_string(),
            })
            .collect();

        Self {
            model: config.model.name().to_string(),
            messages,
            sampling: SamplingParams {
                max_tokens: config.max_tokens,
                temperature: config.temperature,
                top_p: config.top_p,
                n: config.n,
                stop: config.stop.clone(),
                presence_penalty: config.presence_penalty,
                frequency_penalty: config.frequency_penalty,
            },
            stream,
        }
    }
}

/// A complete (non-streamed) response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: Option<String>,
    pub finish_reason: Option<String>,
}

/// Remote completion service
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name, used in logs and errors
    fn name(&self) -> &str;

    /// Request a single completion
    async fn complete(&self, request: CompletionRequest) -> ChatResult<CompletionResponse>;

    /// Request a streamed completion; the stream ends with a final chunk or exhaustion
    async fn stream_complete(&self, request: CompletionRequest) -> ChatResult<CompletionStream>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ChatConfig, Message, Model};

    fn chars(_model: &str, text: &str) -> usize {
        text.len()
    }

    #[test]
    fn test_request_from_conversation() {
        let model = Model::new("gpt-4o-mini", 1000).unwrap();
        let system = Message::new(Role::System, "be brief", &model, &chars).unwrap();
        let mut config = ChatConfig::new(model.clone());
        config.temperature = 0.2;
        config.stop = vec!["\n\n".to_string()];
        config.max_tokens = 64;

        let mut conv = Conversation::new("user-1", system, config).unwrap();
        conv.add_message(Message::new(Role::User, "hi", &model, &chars).unwrap())
            .unwrap();

        let request = CompletionRequest::from_conversation(&conv, true);
        assert_eq!(request.model, "gpt-4o-mini");
        assert!(request.stream);
        assert_eq!(
            request.messages,
            vec![
                CompletionMessage {
                    role: Role::System,
                    content: "be brief".to_string()
                },
                CompletionMessage {
                    role: Role::User,
                    content: "hi".to_string()
                },
            ]
        );
        assert_eq!(request.sampling.max_tokens, 64);
        assert_eq!(request.sampling.temperature, 0.2);
        assert_eq!(request.sampling.stop, vec!["\n\n".to_string()]);
    }
}
