//! In-memory conversation storage

use async_trait::async_trait;
use chatstream_core::{Conversation, ConversationStore, StoreError, StoreResult};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Conversation store backed by a map; contents are lost on drop
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored conversations
    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Conversation> {
        self.conversations
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn create(&self, conversation: &Conversation) -> StoreResult<()> {
        let mut conversations = self.conversations.write().await;
        if conversations.contains_key(conversation.id()) {
            return Err(StoreError::AlreadyExists(conversation.id().to_string()));
        }
        conversations.insert(conversation.id().to_string(), conversation.clone());
        Ok(())
    }

    async fn save(&self, conversation: &Conversation) -> StoreResult<()> {
        self.conversations
            .write()
            .await
            .insert(conversation.id().to_string(), conversation.clone());
        Ok(())
    }
}
