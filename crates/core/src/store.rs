//! MemoryStore trait: durable conversation memory plus operational state.
//!
//! The store owns every turn history; other components touch them only
//! through this interface. Memory is best-effort: callers treat a failed
//! read as an empty history and a failed write as a logged no-op, so a
//! broken disk degrades the assistant to stateless replies instead of
//! taking it down.

use async_trait::async_trait;

use crate::error::MemoryError;
use crate::stats::{AnalysisRecord, GlobalStats, UserStats};
use crate::turn::{ConversationKey, Turn, TurnHistory};

/// The core MemoryStore trait.
///
/// Implementations: JSON file document, in-memory (for testing).
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// The backend name (e.g., "json-file", "in-memory").
    fn name(&self) -> &str;

    /// The stored history for `key`. A key never written yet yields an
    /// empty history, not an error.
    async fn history(&self, key: &ConversationKey)
        -> std::result::Result<TurnHistory, MemoryError>;

    /// Append one turn, evicting past the scope cap. Atomic per key:
    /// concurrent appends to the same key never drop an update.
    async fn append(
        &self,
        key: &ConversationKey,
        turn: Turn,
    ) -> std::result::Result<(), MemoryError>;

    /// Reset the history for `key` to empty. Idempotent.
    async fn clear(&self, key: &ConversationKey) -> std::result::Result<(), MemoryError>;

    /// Bind a guild's auto-response channel.
    async fn set_auto_channel(
        &self,
        guild_id: &str,
        channel_id: &str,
    ) -> std::result::Result<(), MemoryError>;

    /// Unbind a guild's auto-response channel. Returns whether one was set.
    async fn remove_auto_channel(&self, guild_id: &str)
        -> std::result::Result<bool, MemoryError>;

    /// The auto-response channel configured for a guild, if any.
    async fn auto_channel(
        &self,
        guild_id: &str,
    ) -> std::result::Result<Option<String>, MemoryError>;

    /// Count one request against a user, creating their counters on first
    /// sight.
    async fn record_request(&self, user_id: &str) -> std::result::Result<(), MemoryError>;

    /// Log one file analysis and bump the per-user and global counters.
    async fn record_analysis(&self, record: AnalysisRecord)
        -> std::result::Result<(), MemoryError>;

    /// Usage counters for one user, if they have ever made a request.
    async fn user_stats(&self, user_id: &str)
        -> std::result::Result<Option<UserStats>, MemoryError>;

    /// Aggregate counters across all users.
    async fn global_stats(&self) -> std::result::Result<GlobalStats, MemoryError>;

    /// The retained analysis-log entries, oldest first.
    async fn analysis_log(&self) -> std::result::Result<Vec<AnalysisRecord>, MemoryError>;
}
