//! Completion use cases
//!
//! Each use case runs one turn against a conversation: resolve it from the
//! store (creating it when missing), admit the user message, ask the provider
//! for a reply, admit the reply and persist the result.

mod completion;
mod completion_stream;
mod dto;
mod end;
mod resolve;

#[cfg(test)]
mod test_support;

pub use completion::ChatCompletionUseCase;
pub use completion_stream::ChatCompletionStreamUseCase;
pub use dto::{ChatCompletionConfigInput, ChatCompletionInput, ChatCompletionOutput};
pub use end::end_conversation;
