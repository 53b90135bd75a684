//! The whole-document state shared by the store backends.
//!
//! Everything the assistant persists lives in one serializable document:
//! conversation histories keyed by namespaced conversation key, the
//! per-guild auto-response channel bindings, usage counters, and the
//! rolling analysis log. Backends differ only in where the document
//! lives.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use ironwren_core::stats::{AnalysisRecord, GlobalStats, UserStats, ANALYSIS_LOG_CAP};
use ironwren_core::turn::{ConversationKey, Turn, TurnHistory};
use serde::{Deserialize, Serialize};

/// The complete persisted state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDocument {
    /// Turn sequences keyed by `ConversationKey::storage_key()`
    #[serde(default)]
    pub conversations: HashMap<String, Vec<Turn>>,

    /// guild id -> auto-response channel id
    #[serde(default)]
    pub auto_channels: HashMap<String, String>,

    /// user id -> usage counters
    #[serde(default)]
    pub user_stats: HashMap<String, UserStats>,

    /// Rolling log of file analyses, oldest first
    #[serde(default)]
    pub analysis_log: Vec<AnalysisRecord>,

    /// When this document was first created
    #[serde(default = "Utc::now")]
    pub since: DateTime<Utc>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            conversations: HashMap::new(),
            auto_channels: HashMap::new(),
            user_stats: HashMap::new(),
            analysis_log: Vec::new(),
            since: Utc::now(),
        }
    }
}

impl StoreDocument {
    /// The history for `key`, empty if the key was never written.
    pub fn history_for(&self, key: &ConversationKey) -> TurnHistory {
        match self.conversations.get(&key.storage_key()) {
            Some(turns) => TurnHistory::from_turns(turns.clone(), key.cap()),
            None => TurnHistory::for_key(key),
        }
    }

    /// Append a turn, evicting the oldest beyond the scope cap.
    pub fn append_turn(&mut self, key: &ConversationKey, turn: Turn) {
        let turns = self.conversations.entry(key.storage_key()).or_default();
        turns.push(turn);
        let cap = key.cap();
        if turns.len() > cap {
            let excess = turns.len() - cap;
            turns.drain(..excess);
        }
    }

    /// Drop the history for `key`. Removing an absent key is a no-op.
    pub fn clear_history(&mut self, key: &ConversationKey) {
        self.conversations.remove(&key.storage_key());
    }

    pub fn set_auto_channel(&mut self, guild_id: &str, channel_id: &str) {
        self.auto_channels
            .insert(guild_id.to_string(), channel_id.to_string());
    }

    pub fn remove_auto_channel(&mut self, guild_id: &str) -> bool {
        self.auto_channels.remove(guild_id).is_some()
    }

    pub fn auto_channel(&self, guild_id: &str) -> Option<String> {
        self.auto_channels.get(guild_id).cloned()
    }

    /// Count one request against a user.
    pub fn record_request(&mut self, user_id: &str) {
        match self.user_stats.get_mut(user_id) {
            Some(stats) => stats.record_request(),
            None => {
                self.user_stats
                    .insert(user_id.to_string(), UserStats::first_request());
            }
        }
    }

    /// Log a file analysis and bump the uploader's counters.
    pub fn record_analysis(&mut self, record: AnalysisRecord) {
        self.user_stats
            .entry(record.user_id.clone())
            .or_insert_with(UserStats::first_request)
            .record_analysis();

        self.analysis_log.push(record);
        if self.analysis_log.len() > ANALYSIS_LOG_CAP {
            let excess = self.analysis_log.len() - ANALYSIS_LOG_CAP;
            self.analysis_log.drain(..excess);
        }
    }

    /// Aggregate counters derived from the per-user table.
    pub fn global_stats(&self) -> GlobalStats {
        GlobalStats {
            total_requests: self.user_stats.values().map(|s| s.total_requests).sum(),
            unique_users: self.user_stats.len() as u64,
            files_analyzed: self.user_stats.values().map(|s| s.files_analyzed).sum(),
            since: self.since,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironwren_core::attachment::FileVerdict;

    #[test]
    fn append_respects_channel_cap() {
        let mut doc = StoreDocument::default();
        let key = ConversationKey::channel("c1");
        for i in 0..25 {
            doc.append_turn(&key, Turn::user(format!("message {i}")));
        }
        let history = doc.history_for(&key);
        assert_eq!(history.len(), 20);
        assert_eq!(history.turns()[0].content, "message 5");
    }

    #[test]
    fn histories_are_isolated_per_key() {
        let mut doc = StoreDocument::default();
        doc.append_turn(&ConversationKey::channel("42"), Turn::user("in channel"));
        doc.append_turn(&ConversationKey::user("42"), Turn::user("in dm"));

        let channel = doc.history_for(&ConversationKey::channel("42"));
        let user = doc.history_for(&ConversationKey::user("42"));
        assert_eq!(channel.len(), 1);
        assert_eq!(user.len(), 1);
        assert_eq!(channel.turns()[0].content, "in channel");
        assert_eq!(user.turns()[0].content, "in dm");
    }

    #[test]
    fn clear_is_idempotent() {
        let mut doc = StoreDocument::default();
        let key = ConversationKey::user("u1");
        doc.append_turn(&key, Turn::user("hello"));
        doc.clear_history(&key);
        doc.clear_history(&key);
        assert!(doc.history_for(&key).is_empty());
    }

    #[test]
    fn request_counters_accumulate() {
        let mut doc = StoreDocument::default();
        doc.record_request("u1");
        doc.record_request("u1");
        doc.record_request("u2");

        assert_eq!(doc.user_stats["u1"].total_requests, 2);
        assert_eq!(doc.user_stats["u2"].total_requests, 1);

        let global = doc.global_stats();
        assert_eq!(global.total_requests, 3);
        assert_eq!(global.unique_users, 2);
    }

    #[test]
    fn analysis_log_keeps_newest_fifty() {
        let mut doc = StoreDocument::default();
        for i in 0..55 {
            doc.record_analysis(AnalysisRecord::new(
                format!("file{i}.py"),
                "u1",
                FileVerdict::Processable,
            ));
        }
        assert_eq!(doc.analysis_log.len(), 50);
        assert_eq!(doc.analysis_log[0].filename, "file5.py");
        assert_eq!(doc.analysis_log[49].filename, "file54.py");
        assert_eq!(doc.global_stats().files_analyzed, 55);
    }

    #[test]
    fn document_roundtrips_through_json() {
        let mut doc = StoreDocument::default();
        doc.append_turn(&ConversationKey::channel("c"), Turn::named_user("A", "hi"));
        doc.set_auto_channel("g1", "c9");

        let json = serde_json::to_string(&doc).unwrap();
        let back: StoreDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back.auto_channel("g1").as_deref(), Some("c9"));
        assert_eq!(
            back.history_for(&ConversationKey::channel("c")).len(),
            1
        );
    }
}
