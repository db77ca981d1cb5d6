//! The conversation token-window state machine

use super::{Message, Model, Role};
use crate::error::{ChatError, ChatResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Conversation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Accepting new messages
    Active,
    /// Terminal, no more messages allowed
    Ended,
}

/// Model and sampling parameters of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    pub model: Model,
    /// 0.0 to 2.0, lower is more precise and higher is more creative
    pub temperature: f32,
    /// 0.0 to 1.0, nucleus sampling mass
    pub top_p: f32,
    /// Number of choices to generate
    pub n: u32,
    /// Sequences that stop generation
    #[serde(default)]
    pub stop: Vec<String>,
    /// Number of tokens to generate
    pub max_tokens: u32,
    /// -2.0 to 2.0, positive values penalize tokens already present
    pub presence_penalty: f32,
    /// -2.0 to 2.0, positive values penalize frequent tokens
    pub frequency_penalty: f32,
}

impl ChatConfig {
    /// Config with the provider's default sampling parameters
    pub fn new(model: Model) -> Self {
        Self {
            model,
            temperature: 1.0,
            top_p: 1.0,
            n: 1,
            stop: Vec::new(),
            max_tokens: 256,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
        }
    }
}

/// A user's dialogue: active window, evicted history and token budget
///
/// Mutated only through [`Conversation::add_message`] and
/// [`Conversation::end`]; `token_usage` always equals the sum of the active
/// messages' token counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    id: String,
    user_id: String,
    initial_system_message: Message,
    messages: Vec<Message>,
    #[serde(default)]
    erased_messages: Vec<Message>,
    status: Status,
    token_usage: usize,
    config: ChatConfig,
}

impl Conversation {
    /// Create a conversation with a generated ID, seeded with the system message
    pub fn new(
        user_id: impl Into<String>,
        initial_system_message: Message,
        config: ChatConfig,
    ) -> ChatResult<Self> {
        Self::with_id(
            Uuid::new_v4().to_string(),
            user_id,
            initial_system_message,
            config,
        )
    }

    /// Create a conversation with a caller-chosen ID
    pub fn with_id(
        id: impl Into<String>,
        user_id: impl Into<String>,
        initial_system_message: Message,
        config: ChatConfig,
    ) -> ChatResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(ChatError::validation_field("conversation id is empty", "id"));
        }
        if initial_system_message.role() != Role::System {
            return Err(ChatError::validation_field(
                format!(
                    "initial message must have role system, got {}",
                    initial_system_message.role()
                ),
                "initial_system_message",
            ));
        }

        let mut conversation = Self {
            id,
            user_id: user_id.into(),
            initial_system_message: initial_system_message.clone(),
            messages: Vec::new(),
            erased_messages: Vec::new(),
            status: Status::Active,
            token_usage: 0,
            config,
        };
        conversation.add_message(initial_system_message)?;
        conversation.validate()?;

        Ok(conversation)
    }

    /// Check the conversation invariants, returning the first violation found
    pub fn validate(&self) -> ChatResult<()> {
        if self.user_id.is_empty() {
            return Err(ChatError::validation_field("user id is empty", "user_id"));
        }
        if !(0.0..=2.0).contains(&self.config.temperature) {
            return Err(ChatError::validation_field(
                "invalid temperature",
                "temperature",
            ));
        }
        if !(0.0..=1.0).contains(&self.config.top_p) {
            return Err(ChatError::validation_field("invalid top_p", "top_p"));
        }
        if !(-2.0..=2.0).contains(&self.config.presence_penalty) {
            return Err(ChatError::validation_field(
                "invalid presence penalty",
                "presence_penalty",
            ));
        }
        if !(-2.0..=2.0).contains(&self.config.frequency_penalty) {
            return Err(ChatError::validation_field(
                "invalid frequency penalty",
                "frequency_penalty",
            ));
        }
        if self.token_usage != self.sum_tokens() {
            return Err(ChatError::validation_field(
                "token usage does not match active messages",
                "token_usage",
            ));
        }
        Ok(())
    }

    /// Admit a message, evicting the oldest active messages until it fits
    ///
    /// Fails without mutating anything if the conversation is ended or if the
    /// message alone exceeds the model's context window.
    pub fn add_message(&mut self, message: Message) -> ChatResult<()> {
        if self.status == Status::Ended {
            return Err(ChatError::closed(&self.id));
        }

        let max_tokens = self.config.model.max_tokens();
        if message.token_count() > max_tokens {
            return Err(ChatError::MessageTooLarge {
                tokens: message.token_count(),
                max_tokens,
            });
        }

        let mut evicted = 0;
        while max_tokens < message.token_count() + self.token_usage {
            let oldest = self.messages.remove(0);
            self.erased_messages.push(oldest);
            self.refresh_token_usage();
            evicted += 1;
        }

        self.messages.push(message);
        self.refresh_token_usage();

        if evicted > 0 {
            tracing::debug!(
                conversation_id = %self.id,
                evicted,
                token_usage = self.token_usage,
                max_tokens,
                "evicted messages to fit context window"
            );
        }

        Ok(())
    }

    /// End the conversation; further messages are rejected
    pub fn end(&mut self) {
        self.status = Status::Ended;
    }

    fn sum_tokens(&self) -> usize {
        self.messages.iter().map(Message::token_count).sum()
    }

    fn refresh_token_usage(&mut self) {
        self.token_usage = self.sum_tokens();
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn initial_system_message(&self) -> &Message {
        &self.initial_system_message
    }

    /// Active messages, oldest first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Evicted messages, in eviction order
    pub fn erased_messages(&self) -> &[Message] {
        &self.erased_messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn token_usage(&self) -> usize {
        self.token_usage
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_ended(&self) -> bool {
        self.status == Status::Ended
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn model(&self) -> &Model {
        &self.config.model
    }
}
