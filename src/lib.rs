//! Chatstream
//!
//! Token-window chat conversations with streamed completions from an
//! OpenAI-compatible service. This crate re-exports the core library and the
//! storage backends.
//!
//! # Example
//!
//! ```no_run
//! use chatstream::{
//!     ChatCompletionInput, ChatCompletionOutput, ChatCompletionStreamUseCase, Config,
//!     OpenAiProvider, TokenEstimator, store_from_config,
//! };
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let use_case = ChatCompletionStreamUseCase::new(
//!     store_from_config(&config.storage)?,
//!     Arc::new(OpenAiProvider::new(config.provider.clone())?),
//!     Arc::new(TokenEstimator::new()),
//! );
//!
//! let input = ChatCompletionInput {
//!     conversation_id: String::new(),
//!     user_id: "me".to_string(),
//!     user_message: "Hello!".to_string(),
//!     config: config.model.to_input_config(),
//! };
//! let (tx, mut rx) = mpsc::channel::<ChatCompletionOutput>(16);
//! let printer = tokio::spawn(async move {
//!     while let Some(snapshot) = rx.recv().await {
//!         println!("{}", snapshot.content);
//!     }
//! });
//! let output = use_case.execute(input, tx, CancellationToken::new()).await?;
//! printer.await?;
//! println!("conversation {}", output.conversation_id);
//! # Ok(())
//! # }
//! ```

pub use chatstream_core::*;
pub use chatstream_session::{InMemoryConversationStore, LocalConversationStore, store_from_config};
