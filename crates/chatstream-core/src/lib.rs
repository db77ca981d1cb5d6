//! Chatstream Core Library
//!
//! This crate provides the conversation model, the completion provider
//! abstraction and the use cases that run a chat turn end to end, including
//! token-window eviction and streamed replies.

pub mod config;
pub mod entity;
pub mod error;
pub mod llm;
pub mod store;
pub mod tokens;
pub mod usecase;

// Re-export commonly used types
pub use config::{Config, ConfigLoader, LogFormat, LoggingConfig, ModelSettings, StorageConfig};
pub use entity::{ChatConfig, Conversation, Message, Model, Role, Status};
pub use error::{ChatError, ChatResult, Stage};
pub use llm::{CompletionProvider, CompletionRequest, CompletionStream, OpenAiProvider, StreamChunk};
pub use store::{ConversationStore, StoreError, StoreResult};
pub use tokens::{TokenCounter, TokenEstimator};
pub use usecase::{
    ChatCompletionConfigInput, ChatCompletionInput, ChatCompletionOutput, ChatCompletionStreamUseCase,
    ChatCompletionUseCase, end_conversation,
};
