//! Local filesystem conversation storage
//!
//! Stores conversations as JSON files in the user's home directory.

use async_trait::async_trait;
use chatstream_core::{Conversation, ConversationStore, StoreError, StoreResult};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Local filesystem conversation storage
///
/// Conversations are stored as `<id>.json` files in:
/// - `~/.chatstream/conversations/` (default)
/// - Custom path if specified
///
/// Saves go through a sibling `<id>.json.tmp` file that is renamed into place,
/// so readers never observe a half-written conversation.
#[derive(Debug, Clone)]
pub struct LocalConversationStore {
    /// Base directory for conversation files
    base_path: PathBuf,
}

impl LocalConversationStore {
    /// Create storage with default path (~/.chatstream/conversations)
    pub fn new() -> StoreResult<Self> {
        let base_path = dirs::home_dir()
            .ok_or(StoreError::PathUnavailable)?
            .join(".chatstream")
            .join("conversations");

        Ok(Self { base_path })
    }

    /// Create storage with custom base path
    pub fn with_path(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Ensure storage directory exists
    async fn ensure_dir(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }

    /// Get file path for a conversation ID
    fn conversation_path(&self, id: &str) -> StoreResult<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(StoreError::InvalidData(format!(
                "conversation id {:?} is not usable as a file name",
                id
            )));
        }
        Ok(self.base_path.join(format!("{}.json", id)))
    }

    async fn replace(&self, path: &Path, conversation: &Conversation) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(conversation)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        if let Err(e) = fs::rename(&tmp, path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        debug!("Saved conversation {} to {:?}", conversation.id(), path);
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for LocalConversationStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Conversation> {
        let path = self.conversation_path(id)?;

        if !fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let content = fs::read_to_string(&path).await?;
        let conversation: Conversation = serde_json::from_str(&content)?;
        conversation
            .validate()
            .map_err(|e| StoreError::InvalidData(format!("{}: {}", id, e)))?;
        if conversation.id() != id {
            return Err(StoreError::InvalidData(format!(
                "{} holds conversation {}",
                path.display(),
                conversation.id()
            )));
        }

        debug!("Loaded conversation {} from {:?}", id, path);
        Ok(conversation)
    }

    async fn create(&self, conversation: &Conversation) -> StoreResult<()> {
        self.ensure_dir().await?;

        let path = self.conversation_path(conversation.id())?;
        let content = serde_json::to_string_pretty(conversation)?;
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(conversation.id().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        debug!("Created conversation {} at {:?}", conversation.id(), path);
        Ok(())
    }

    async fn save(&self, conversation: &Conversation) -> StoreResult<()> {
        self.ensure_dir().await?;

        let path = self.conversation_path(conversation.id())?;
        self.replace(&path, conversation).await
    }
}
