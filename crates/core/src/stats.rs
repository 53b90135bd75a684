//! Usage counters and the rolling file-analysis log.
//!
//! All counters only ever grow; nothing here resets except through an
//! operator wiping the store itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attachment::FileVerdict;

/// How many analysis-log entries the store retains (newest win).
pub const ANALYSIS_LOG_CAP: usize = 50;

/// Usage counters for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    /// Total requests this user has made
    pub total_requests: u64,

    /// How many of those were file analyses
    #[serde(default)]
    pub files_analyzed: u64,

    /// First time this user was seen
    pub first_seen: DateTime<Utc>,

    /// Most recent request
    pub last_used: DateTime<Utc>,
}

impl UserStats {
    /// Counters for a user making their first request right now.
    pub fn first_request() -> Self {
        let now = Utc::now();
        Self {
            total_requests: 1,
            files_analyzed: 0,
            first_seen: now,
            last_used: now,
        }
    }

    /// Count one more request.
    pub fn record_request(&mut self) {
        self.total_requests += 1;
        self.last_used = Utc::now();
    }

    /// Count one more file analysis.
    pub fn record_analysis(&mut self) {
        self.files_analyzed += 1;
        self.last_used = Utc::now();
    }
}

/// Aggregate counters across every user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalStats {
    /// Requests across all users
    pub total_requests: u64,

    /// Distinct users ever seen
    pub unique_users: u64,

    /// Files run through the analysis pipeline
    pub files_analyzed: u64,

    /// When counting started
    pub since: DateTime<Utc>,
}

impl Default for GlobalStats {
    fn default() -> Self {
        Self {
            total_requests: 0,
            unique_users: 0,
            files_analyzed: 0,
            since: Utc::now(),
        }
    }
}

/// One entry in the rolling file-analysis log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// The uploaded file's name
    pub filename: String,

    /// Who uploaded it
    pub user_id: String,

    /// How the pipeline classified it
    pub verdict: FileVerdict,

    /// When the analysis ran
    pub timestamp: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(
        filename: impl Into<String>,
        user_id: impl Into<String>,
        verdict: FileVerdict,
    ) -> Self {
        Self {
            filename: filename.into(),
            user_id: user_id.into(),
            verdict,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_starts_at_one() {
        let stats = UserStats::first_request();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.files_analyzed, 0);
        assert_eq!(stats.first_seen, stats.last_used);
    }

    #[test]
    fn counters_only_grow() {
        let mut stats = UserStats::first_request();
        stats.record_request();
        stats.record_analysis();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.files_analyzed, 1);
        assert!(stats.last_used >= stats.first_seen);
    }

    #[test]
    fn analysis_record_serialization() {
        let record = AnalysisRecord::new("main.py", "u42", FileVerdict::Processable);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("main.py"));
        assert!(json.contains("processable"));
    }
}
