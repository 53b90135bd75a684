//! Conversation keys, turns, and bounded histories.
//!
//! These are the core value objects that flow through the entire system:
//! a chat exchange becomes a pair of `Turn`s appended to the `TurnHistory`
//! addressed by one `ConversationKey`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How many turns a channel-scope history retains.
pub const CHANNEL_HISTORY_CAP: usize = 20;

/// How many turns a user-scope history retains.
pub const USER_HISTORY_CAP: usize = 15;

/// The scope a conversation history belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Shared history for everyone talking in one channel
    Channel,
    /// Private history for one user, independent of where they write
    User,
}

impl Scope {
    /// The retention cap for histories in this scope.
    pub fn cap(&self) -> usize {
        match self {
            Scope::Channel => CHANNEL_HISTORY_CAP,
            Scope::User => USER_HISTORY_CAP,
        }
    }
}

/// Addresses one bounded turn history.
///
/// Channel keys and user keys occupy disjoint namespaces: the storage key
/// is prefixed with the scope, so a channel and a user sharing the same
/// platform id never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationKey {
    scope: Scope,
    id: String,
}

impl ConversationKey {
    /// Key for the shared history of a channel.
    pub fn channel(id: impl Into<String>) -> Self {
        Self {
            scope: Scope::Channel,
            id: id.into(),
        }
    }

    /// Key for the private history of a user.
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            scope: Scope::User,
            id: id.into(),
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The retention cap of the history this key addresses.
    pub fn cap(&self) -> usize {
        self.scope.cap()
    }

    /// Namespaced form used by storage backends.
    pub fn storage_key(&self) -> String {
        match self.scope {
            Scope::Channel => format!("channel:{}", self.id),
            Scope::User => format!("user:{}", self.id),
        }
    }
}

impl std::fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.storage_key())
    }
}

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (persona, rules)
    System,
    /// The end user
    User,
    /// The assistant
    Assistant,
}

/// A single remembered exchange entry. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Who authored this turn
    pub role: Role,

    /// Author display name; present on channel-scope user turns so the
    /// model can tell speakers apart
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// The text content
    pub content: String,

    /// When the turn was recorded
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a user turn with no attribution (user-scope conversations).
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            display_name: None,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a user turn attributed to a display name (channel scope).
    pub fn named_user(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            display_name: Some(name.into()),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            display_name: None,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// An ordered sequence of turns, oldest first, bounded by a cap.
///
/// Appending past the cap evicts from the front, so the history always
/// holds the most recent turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnHistory {
    turns: Vec<Turn>,
    cap: usize,
}

impl TurnHistory {
    /// An empty history with an explicit cap.
    pub fn with_cap(cap: usize) -> Self {
        Self {
            turns: Vec::new(),
            cap,
        }
    }

    /// An empty history sized for the scope of `key`.
    pub fn for_key(key: &ConversationKey) -> Self {
        Self::with_cap(key.cap())
    }

    /// Rebuild a history from stored turns, evicting from the front if the
    /// stored sequence exceeds the cap.
    pub fn from_turns(turns: Vec<Turn>, cap: usize) -> Self {
        let mut history = Self { turns, cap };
        history.evict();
        history
    }

    /// Append a turn, evicting the oldest entries beyond the cap.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
        self.evict();
    }

    fn evict(&mut self) {
        if self.turns.len() > self.cap {
            let excess = self.turns.len() - self.cap;
            self.turns.drain(..excess);
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_caps() {
        assert_eq!(Scope::Channel.cap(), 20);
        assert_eq!(Scope::User.cap(), 15);
    }

    #[test]
    fn storage_keys_are_disjoint_across_scopes() {
        let channel = ConversationKey::channel("12345");
        let user = ConversationKey::user("12345");
        assert_ne!(channel.storage_key(), user.storage_key());
        assert_eq!(channel.storage_key(), "channel:12345");
        assert_eq!(user.storage_key(), "user:12345");
    }

    #[test]
    fn named_user_turn_carries_display_name() {
        let turn = Turn::named_user("Asha", "hello there");
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.display_name.as_deref(), Some("Asha"));
        assert_eq!(turn.content, "hello there");
    }

    #[test]
    fn history_evicts_oldest_beyond_cap() {
        let key = ConversationKey::channel("c1");
        let mut history = TurnHistory::for_key(&key);
        for i in 0..25 {
            history.push(Turn::user(format!("message {i}")));
        }
        assert_eq!(history.len(), 20);
        // the first five were evicted, so the head is the sixth append
        assert_eq!(history.turns()[0].content, "message 5");
        assert_eq!(history.turns()[19].content, "message 24");
    }

    #[test]
    fn user_scope_history_caps_at_fifteen() {
        let key = ConversationKey::user("u1");
        let mut history = TurnHistory::for_key(&key);
        for i in 0..18 {
            history.push(Turn::user(format!("m{i}")));
        }
        assert_eq!(history.len(), 15);
        assert_eq!(history.turns()[0].content, "m3");
    }

    #[test]
    fn from_turns_trims_oversized_stored_sequence() {
        let turns: Vec<Turn> = (0..30).map(|i| Turn::user(format!("t{i}"))).collect();
        let history = TurnHistory::from_turns(turns, 20);
        assert_eq!(history.len(), 20);
        assert_eq!(history.turns()[0].content, "t10");
    }

    #[test]
    fn turn_serialization_roundtrip() {
        let turn = Turn::named_user("Ravi", "what is rust");
        let json = serde_json::to_string(&turn).unwrap();
        let back: Turn = serde_json::from_str(&json).unwrap();
        assert_eq!(back.content, "what is rust");
        assert_eq!(back.display_name.as_deref(), Some("Ravi"));
    }

    #[test]
    fn plain_turn_omits_display_name_in_json() {
        let turn = Turn::user("hi");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(!json.contains("display_name"));
    }
}
