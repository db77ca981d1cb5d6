//! Constructor methods for ChatError

use super::types::{ChatError, Stage};
use crate::store::StoreError;

impl ChatError {
    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
            context: None,
        }
    }

    /// Create a validation error naming the offending field
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
            context: None,
        }
    }

    /// Create a closed-conversation error
    pub fn closed(conversation_id: impl Into<String>) -> Self {
        Self::ConversationClosed {
            conversation_id: conversation_id.into(),
        }
    }

    /// Create a new streaming error
    pub fn streaming(message: impl Into<String>) -> Self {
        Self::Streaming {
            message: message.into(),
            cancelled: false,
            context: None,
        }
    }

    /// Create a streaming error for a turn cancelled mid-flight
    pub fn streaming_cancelled() -> Self {
        Self::Streaming {
            message: "stream cancelled by caller".to_string(),
            cancelled: true,
            context: None,
        }
    }

    /// Create a cancellation error for a call made during `stage`
    pub fn cancelled(stage: Stage) -> Self {
        Self::Cancelled { stage }
    }

    /// Create a persistence error for a failed store write
    pub fn persistence(
        operation: &'static str,
        conversation_id: impl Into<String>,
        source: StoreError,
    ) -> Self {
        Self::Persistence {
            operation,
            conversation_id: conversation_id.into(),
            source,
        }
    }

    /// Create a new LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm {
            message: message.into(),
            provider: None,
            status_code: None,
        }
    }

    /// Create an LLM error with provider and HTTP status
    pub fn llm_with_status(
        message: impl Into<String>,
        provider: impl Into<String>,
        status_code: u16,
    ) -> Self {
        Self::Llm {
            message: message.into(),
            provider: Some(provider.into()),
            status_code: Some(status_code),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }
}
