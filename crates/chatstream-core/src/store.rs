//! Conversation store contract
//!
//! The store is the single source of truth across requests: the core keeps no
//! in-memory cache of conversations, so concurrent turns on the same id race
//! here and the last `save` wins.

use crate::entity::Conversation;
use async_trait::async_trait;
use thiserror::Error;

/// Store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conversation not found: {0}")]
    NotFound(String),

    #[error("Conversation already exists: {0}")]
    AlreadyExists(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid conversation data: {0}")]
    InvalidData(String),

    #[error("Storage path not available")]
    PathUnavailable,
}

impl StoreError {
    /// Whether this error means the conversation does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value persistence for conversation snapshots
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Load a conversation by ID; a missing conversation is `StoreError::NotFound`
    async fn find_by_id(&self, id: &str) -> StoreResult<Conversation>;

    /// Persist a newly created conversation
    async fn create(&self, conversation: &Conversation) -> StoreResult<()>;

    /// Overwrite the stored snapshot of a conversation
    async fn save(&self, conversation: &Conversation) -> StoreResult<()>;
}
