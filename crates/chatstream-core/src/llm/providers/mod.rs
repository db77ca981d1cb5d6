//! Completion provider implementations

mod openai;
mod openai_stream;

pub use openai::OpenAiProvider;
