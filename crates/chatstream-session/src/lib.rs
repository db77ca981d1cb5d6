//! Conversation persistence for chatstream
//!
//! This crate provides the concrete [`ConversationStore`] backends:
//! - In-memory storage for tests and throwaway sessions
//! - Local file storage, one JSON document per conversation
//!
//! [`ConversationStore`]: chatstream_core::ConversationStore

pub mod storage;

pub use storage::{InMemoryConversationStore, LocalConversationStore, store_from_config};
