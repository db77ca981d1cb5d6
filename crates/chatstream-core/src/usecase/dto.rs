//! Use case input and output records

use serde::{Deserialize, Serialize};

/// Settings used to build a conversation when none exists yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionConfigInput {
    pub model: String,
    pub model_max_tokens: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub n: u32,
    pub stop: Vec<String>,
    /// Number of tokens to generate
    pub max_tokens: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    pub initial_system_message: String,
}

/// One user turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionInput {
    /// Conversation to continue; empty starts a new one
    pub conversation_id: String,
    pub user_id: String,
    pub user_message: String,
    pub config: ChatCompletionConfigInput,
}

/// A streamed snapshot or the final result of a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletionOutput {
    pub conversation_id: String,
    pub user_id: String,
    /// Assistant content accumulated so far
    pub content: String,
}
