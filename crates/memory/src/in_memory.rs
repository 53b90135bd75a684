//! In-memory store, useful for testing and ephemeral sessions.

use std::sync::Arc;

use async_trait::async_trait;
use ironwren_core::error::MemoryError;
use ironwren_core::stats::{AnalysisRecord, GlobalStats, UserStats};
use ironwren_core::store::MemoryStore;
use ironwren_core::turn::{ConversationKey, Turn, TurnHistory};
use tokio::sync::RwLock;

use crate::document::StoreDocument;

/// A store that keeps the whole document in memory and never touches disk.
pub struct InMemoryStore {
    doc: Arc<RwLock<StoreDocument>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            doc: Arc::new(RwLock::new(StoreDocument::default())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn history(&self, key: &ConversationKey) -> Result<TurnHistory, MemoryError> {
        Ok(self.doc.read().await.history_for(key))
    }

    async fn append(&self, key: &ConversationKey, turn: Turn) -> Result<(), MemoryError> {
        self.doc.write().await.append_turn(key, turn);
        Ok(())
    }

    async fn clear(&self, key: &ConversationKey) -> Result<(), MemoryError> {
        self.doc.write().await.clear_history(key);
        Ok(())
    }

    async fn set_auto_channel(&self, guild_id: &str, channel_id: &str) -> Result<(), MemoryError> {
        self.doc.write().await.set_auto_channel(guild_id, channel_id);
        Ok(())
    }

    async fn remove_auto_channel(&self, guild_id: &str) -> Result<bool, MemoryError> {
        Ok(self.doc.write().await.remove_auto_channel(guild_id))
    }

    async fn auto_channel(&self, guild_id: &str) -> Result<Option<String>, MemoryError> {
        Ok(self.doc.read().await.auto_channel(guild_id))
    }

    async fn record_request(&self, user_id: &str) -> Result<(), MemoryError> {
        self.doc.write().await.record_request(user_id);
        Ok(())
    }

    async fn record_analysis(&self, record: AnalysisRecord) -> Result<(), MemoryError> {
        self.doc.write().await.record_analysis(record);
        Ok(())
    }

    async fn user_stats(&self, user_id: &str) -> Result<Option<UserStats>, MemoryError> {
        Ok(self.doc.read().await.user_stats.get(user_id).cloned())
    }

    async fn global_stats(&self) -> Result<GlobalStats, MemoryError> {
        Ok(self.doc.read().await.global_stats())
    }

    async fn analysis_log(&self) -> Result<Vec<AnalysisRecord>, MemoryError> {
        Ok(self.doc.read().await.analysis_log.clone())
    }
}
