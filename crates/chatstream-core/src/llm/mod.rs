//! Completion provider abstraction
//!
//! The core talks to the remote completion service only through the
//! [`CompletionProvider`] trait: a single completion or a lazy stream of
//! content deltas.

pub mod provider;
pub mod providers;
pub mod sse_decoder;
pub mod streaming;

pub use provider::{
    CompletionMessage, CompletionProvider, CompletionRequest, CompletionResponse, SamplingParams,
};
pub use providers::OpenAiProvider;
pub use sse_decoder::{SseDecoder, SseEvent};
pub use streaming::{CompletionStream, StreamChunk, stream_utils};
