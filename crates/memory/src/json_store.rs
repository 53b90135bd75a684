//! JSON-file memory store: the whole document in one pretty-printed file.
//!
//! The document is loaded into memory on creation and flushed to disk on
//! every mutation. This gives fast reads with durable writes, and the file
//! stays human-inspectable.
//!
//! Storage location: `~/.ironwren/data/store.json`
//!
//! All mutations run under one write lock, so concurrent appends to the
//! same conversation can never drop a turn. The lock is released before
//! any provider call happens upstream.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use ironwren_core::error::MemoryError;
use ironwren_core::stats::{AnalysisRecord, GlobalStats, UserStats};
use ironwren_core::store::MemoryStore;
use ironwren_core::turn::{ConversationKey, Turn, TurnHistory};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::document::StoreDocument;

/// A file-backed store holding the whole document as one JSON file.
pub struct JsonFileStore {
    path: PathBuf,
    doc: Arc<RwLock<StoreDocument>>,
}

impl JsonFileStore {
    /// Create a new store at the given path.
    ///
    /// If the file exists its document is loaded; an unreadable or
    /// unparseable file logs a warning and starts empty rather than
    /// failing startup.
    pub fn new(path: PathBuf) -> Self {
        let doc = Self::load_from_disk(&path);
        debug!(
            path = %path.display(),
            conversations = doc.conversations.len(),
            "JSON store loaded"
        );
        Self {
            path,
            doc: Arc::new(RwLock::new(doc)),
        }
    }

    /// Default path: `~/.ironwren/data/store.json`
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join(".ironwren")
            .join("data")
            .join("store.json")
    }

    fn load_from_disk(path: &PathBuf) -> StoreDocument {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return StoreDocument::default(), // no file yet, start empty
        };

        match serde_json::from_str(&content) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Store file unreadable, starting empty");
                StoreDocument::default()
            }
        }
    }

    /// Flush the document to disk.
    async fn flush(&self) -> Result<(), MemoryError> {
        let doc = self.doc.read().await;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MemoryError::Storage(format!("Failed to create data directory: {e}"))
            })?;
        }

        let content = serde_json::to_string_pretty(&*doc)
            .map_err(|e| MemoryError::Storage(format!("Failed to serialize store: {e}")))?;

        std::fs::write(&self.path, &content)
            .map_err(|e| MemoryError::Storage(format!("Failed to write store file: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl MemoryStore for JsonFileStore {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn history(&self, key: &ConversationKey) -> Result<TurnHistory, MemoryError> {
        Ok(self.doc.read().await.history_for(key))
    }

    async fn append(&self, key: &ConversationKey, turn: Turn) -> Result<(), MemoryError> {
        self.doc.write().await.append_turn(key, turn);
        self.flush().await
    }

    async fn clear(&self, key: &ConversationKey) -> Result<(), MemoryError> {
        self.doc.write().await.clear_history(key);
        self.flush().await
    }

    async fn set_auto_channel(&self, guild_id: &str, channel_id: &str) -> Result<(), MemoryError> {
        self.doc.write().await.set_auto_channel(guild_id, channel_id);
        self.flush().await
    }

    async fn remove_auto_channel(&self, guild_id: &str) -> Result<bool, MemoryError> {
        let removed = self.doc.write().await.remove_auto_channel(guild_id);
        if removed {
            self.flush().await?;
        }
        Ok(removed)
    }

    async fn auto_channel(&self, guild_id: &str) -> Result<Option<String>, MemoryError> {
        Ok(self.doc.read().await.auto_channel(guild_id))
    }

    async fn record_request(&self, user_id: &str) -> Result<(), MemoryError> {
        self.doc.write().await.record_request(user_id);
        self.flush().await
    }

    async fn record_analysis(&self, record: AnalysisRecord) -> Result<(), MemoryError> {
        self.doc.write().await.record_analysis(record);
        self.flush().await
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
