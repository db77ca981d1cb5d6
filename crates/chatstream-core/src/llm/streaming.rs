//! Streaming response support

use super::provider::CompletionResponse;
use crate::error::{ChatError, ChatResult};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// A chunk of streaming response data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Incremental content
    pub content: Option<String>,
    /// Whether this is the final chunk
    pub is_final: bool,
    /// Finish reason (if final)
    pub finish_reason: Option<String>,
}

impl StreamChunk {
    /// Create a new content chunk
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            is_final: false,
            finish_reason: None,
        }
    }

    /// Create the end-of-stream chunk
    pub fn final_chunk(finish_reason: Option<String>) -> Self {
        Self {
            content: None,
            is_final: true,
            finish_reason,
        }
    }
}

/// Stream of completion chunks
pub type CompletionStream = Pin<Box<dyn Stream<Item = ChatResult<StreamChunk>> + Send>>;

/// Utility functions for working with streams
pub mod stream_utils {
    use super::*;
    use futures::StreamExt;

    /// Collect a stream into a complete response
    ///
    /// A stream that ends without a final chunk is a truncated reply and
    /// yields an `Llm` error.
    pub async fn collect_stream(mut stream: CompletionStream) -> ChatResult<CompletionResponse> {
        let mut content = String::new();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result?;

            if let Some(chunk_content) = chunk.content {
                content.push_str(&chunk_content);
            }

            if chunk.is_final {
                return Ok(CompletionResponse {
                    content,
                    model: None,
                    finish_reason: chunk.finish_reason,
                });
            }
        }

        Err(ChatError::llm("Stream ended before its final chunk"))
    }

    /// Build a stream from already-known chunks
    pub fn from_chunks(chunks: Vec<ChatResult<StreamChunk>>) -> CompletionStream {
        Box::pin(futures::stream::iter(chunks))
    }
}
