//! Completion model descriptor

use crate::error::{ChatError, ChatResult};
use serde::{Deserialize, Serialize};

/// A named completion model and its context window size in tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    name: String,
    max_tokens: usize,
}

impl Model {
    /// Create a model descriptor; the name must be non-empty and the window positive
    pub fn new(name: impl Into<String>, max_tokens: usize) -> ChatResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ChatError::validation_field("model name is empty", "model"));
        }
        if max_tokens == 0 {
            return Err(ChatError::validation_field(
                "model max tokens must be positive",
                "model_max_tokens",
            ));
        }
        Ok(Self { name, max_tokens })
    }

    /// Identifier understood by the completion provider
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hard context budget in tokens
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }
}
