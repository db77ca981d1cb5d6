//! Conversation store implementations

mod local;
mod memory;

pub use local::LocalConversationStore;
pub use memory::InMemoryConversationStore;

use chatstream_core::config::StorageConfig;
use chatstream_core::{ConversationStore, StoreResult};
use std::sync::Arc;

/// Build the store selected by the storage configuration
pub fn store_from_config(config: &StorageConfig) -> StoreResult<Arc<dyn ConversationStore>> {
    if config.memory {
        return Ok(Arc::new(InMemoryConversationStore::new()));
    }

    let store = match &config.directory {
        Some(dir) => LocalConversationStore::with_path(dir.clone()),
        None => LocalConversationStore::new()?,
    };
    Ok(Arc::new(store))
}
