//! Core error types for chatstream

use crate::store::StoreError;
use thiserror::Error;

/// Result type alias for chatstream operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Stage of a completion turn at which an error was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Building or validating messages and conversations
    Validation,
    /// Reading a conversation from the store
    Lookup,
    /// Admitting a message into the conversation window
    Admission,
    /// Talking to the completion provider
    Completion,
    /// Writing a conversation to the store
    Persistence,
    /// Loading configuration
    Configuration,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Validation => write!(f, "validation"),
            Stage::Lookup => write!(f, "lookup"),
            Stage::Admission => write!(f, "admission"),
            Stage::Completion => write!(f, "completion"),
            Stage::Persistence => write!(f, "persistence"),
            Stage::Configuration => write!(f, "configuration"),
        }
    }
}

/// Main error type for chatstream
#[derive(Error, Debug)]
pub enum ChatError {
    /// Malformed message or conversation input
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: Option<String>,
    },

    /// A single message does not fit the model's context window on its own
    #[error("Message of {tokens} tokens exceeds the model context window of {max_tokens} tokens")]
    MessageTooLarge { tokens: usize, max_tokens: usize },

    /// Attempted mutation of an ended conversation
    #[error("Conversation {conversation_id} is ended, no more messages allowed")]
    ConversationClosed { conversation_id: String },

    /// Store read failure other than not-found
    #[error("Failed to fetch conversation {conversation_id}: {source}")]
    ConversationLookup {
        conversation_id: String,
        #[source]
        source: StoreError,
    },

    /// Provider stream failed, was cancelled, or its consumer went away
    #[error("Streaming error: {message}")]
    Streaming {
        message: String,
        cancelled: bool,
        context: Option<String>,
    },

    /// Store write failure
    #[error("Failed to {operation} conversation {conversation_id}: {source}")]
    Persistence {
        operation: &'static str,
        conversation_id: String,
        #[source]
        source: StoreError,
    },

    /// Completion provider transport or protocol errors
    #[error("LLM error: {message}")]
    Llm {
        message: String,
        provider: Option<String>,
        status_code: Option<u16>,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// The caller cancelled a store or provider call outside the stream
    #[error("Operation was cancelled during {stage}")]
    Cancelled { stage: Stage },
}

impl ChatError {
    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ChatError::Validation { .. } => "CHAT_VALIDATION",
            ChatError::MessageTooLarge { .. } => "CHAT_MESSAGE_TOO_LARGE",
            ChatError::ConversationClosed { .. } => "CHAT_CONVERSATION_CLOSED",
            ChatError::ConversationLookup { .. } => "CHAT_CONVERSATION_LOOKUP",
            ChatError::Streaming { .. } => "CHAT_STREAMING",
            ChatError::Persistence { .. } => "CHAT_PERSISTENCE",
            ChatError::Llm { .. } => "CHAT_LLM",
            ChatError::Config { .. } => "CHAT_CONFIG",
            ChatError::Cancelled { .. } => "CHAT_CANCELLED",
        }
    }

    /// The stage of the turn that produced this error
    pub fn stage(&self) -> Stage {
        match self {
            ChatError::Validation { .. } => Stage::Validation,
            ChatError::MessageTooLarge { .. } | ChatError::ConversationClosed { .. } => {
                Stage::Admission
            }
            ChatError::ConversationLookup { .. } => Stage::Lookup,
            ChatError::Streaming { .. } | ChatError::Llm { .. } => Stage::Completion,
            ChatError::Persistence { .. } => Stage::Persistence,
            ChatError::Config { .. } => Stage::Configuration,
            ChatError::Cancelled { stage } => *stage,
        }
    }

    /// Context attached by the caller, if any
    pub fn context(&self) -> Option<&str> {
        match self {
            ChatError::Validation { context, .. }
            | ChatError::Streaming { context, .. }
            | ChatError::Config { context, .. } => context.as_deref(),
            _ => None,
        }
    }

    /// Whether this error was caused by cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            ChatError::Cancelled { .. } | ChatError::Streaming { cancelled: true, .. }
        )
    }

    /// Attach context to variants that carry it; other variants are returned unchanged
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        match &mut self {
            ChatError::Validation { context, .. }
            | ChatError::Streaming { context, .. }
            | ChatError::Config { context, .. } => *context = Some(ctx.into()),
            _ => {}
        }
        self
    }
}
