//! Token counting
//!
//! Message construction needs a token count per (model, text) pair. The
//! counter is an injected capability; [`TokenEstimator`] is the default
//! character-ratio approximation.

/// Maps a model identifier and a text to a token count
pub trait TokenCounter: Send + Sync {
    /// Count the tokens `text` costs for `model`
    fn count(&self, model: &str, text: &str) -> usize;
}

impl<F> TokenCounter for F
where
    F: Fn(&str, &str) -> usize + Send + Sync,
{
    fn count(&self, model: &str, text: &str) -> usize {
        self(model, text)
    }
}

/// Character-ratio token estimator
///
/// Exact tokenization varies by provider, so this approximates with an
/// average characters-per-token ratio chosen by model family.
#[derive(Debug, Clone)]
pub struct TokenEstimator {
    /// Characters per token for models without a specific ratio
    default_chars_per_token: f32,
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenEstimator {
    /// Create a new token estimator with default settings
    pub fn new() -> Self {
        Self {
            default_chars_per_token: 4.0, // Common approximation for English text
        }
    }

    /// Characters per token for the given model
    fn chars_per_token(&self, model: &str) -> f32 {
        let model = model.to_lowercase();
        if model.starts_with("gpt") || model.starts_with("o1") || model.starts_with("o3") {
            4.0
        } else if model.starts_with("claude") {
            3.5 // Claude tends to have slightly smaller tokens
        } else {
            self.default_chars_per_token
        }
    }
}

impl TokenCounter for TokenEstimator {
    fn count(&self, model: &str, text: &str) -> usize {
        let chars = text.chars().count();
        (chars as f32 / self.chars_per_token(model)).ceil() as usize
    }
}
