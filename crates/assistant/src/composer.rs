//! Prompt assembly from persona, stored history, and the new input.

use std::sync::Arc;

use ironwren_core::{ChatMessage, ConversationKey, MemoryStore, Role, Scope, Turn, TurnHistory};
use tracing::warn;

use crate::persona::PERSONA_PREAMBLE;

/// Builds the message list sent to the provider. History comes from the
/// store; a failed read degrades to an empty history so the exchange still
/// happens, just without context.
pub struct PromptComposer {
    store: Arc<dyn MemoryStore>,
}

impl PromptComposer {
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self { store }
    }

    /// Assemble the full prompt: persona first, prior turns in order, then
    /// the new input as the final user message. The input is not yet in the
    /// store; callers append it after the exchange completes.
    pub async fn compose(&self, key: &ConversationKey, input: &Turn) -> Vec<ChatMessage> {
        let history = match self.store.history(key).await {
            Ok(history) => history,
            Err(error) => {
                warn!(key = %key, error = %error, "History read failed, composing without context");
                TurnHistory::for_key(key)
            }
        };

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(PERSONA_PREAMBLE));
        for turn in history.turns() {
            messages.push(render(key.scope(), turn));
        }
        messages.push(render(key.scope(), input));
        messages
    }
}

/// Channel conversations are shared, so user turns carry the speaker's name
/// inline. Direct conversations have one speaker and stay unprefixed.
fn render(scope: Scope, turn: &Turn) -> ChatMessage {
    let content = match (&scope, &turn.display_name) {
        (Scope::Channel, Some(name)) if turn.role == Role::User => {
            format!("{name}: {}", turn.content)
        }
        _ => turn.content.clone(),
    };
    ChatMessage {
        role: turn.role,
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ironwren_core::{
        AnalysisRecord, GlobalStats, MemoryError, Role, UserStats,
    };
    use ironwren_memory::InMemoryStore;

    struct BrokenStore;

    #[async_trait]
    impl MemoryStore for BrokenStore {
        fn name(&self) -> &str {
            "broken"
        }

        async fn history(&self, _key: &ConversationKey) -> Result<TurnHistory, MemoryError> {
            Err(MemoryError::Storage("disk on fire".into()))
        }

        async fn append(&self, _key: &ConversationKey, _turn: Turn) -> Result<(), MemoryError> {
            Err(MemoryError::Storage("disk on fire".into()))
        }

        async fn clear(&self, _key: &ConversationKey) -> Result<(), MemoryError> {
            Ok(())
        }

        async fn set_auto_channel(
            &self,
            _guild_id: &str,
            _channel_id: &str,
        ) -> Result<(), MemoryError> {
            Ok(())
        }

        async fn remove_auto_channel(&self, _guild_id: &str) -> Result<bool, MemoryError> {
            Ok(false)
        }

        async fn auto_channel(&self, _guild_id: &str) -> Result<Option<String>, MemoryError> {
            Ok(None)
        }

        async fn record_request(&self, _user_id: &str) -> Result<(), MemoryError> {
            Ok(())
        }

        async fn record_analysis(&self, _record: AnalysisRecord) -> Result<(), MemoryError> {
            Ok(())
        }

        async fn user_stats(&self, _user_id: &str) -> Result<Option<UserStats>, MemoryError> {
            Ok(None)
        }

        async fn global_stats(&self) -> Result<GlobalStats, MemoryError> {
            Ok(GlobalStats::default())
        }

        async fn analysis_log(&self) -> Result<Vec<AnalysisRecord>, MemoryError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn persona_leads_and_input_closes() {
        let store = Arc::new(InMemoryStore::new());
        let key = ConversationKey::user("42");
        store
            .append(&key, Turn::user("earlier question"))
            .await
            .unwrap();
        store
            .append(&key, Turn::assistant("earlier answer"))
            .await
            .unwrap();

        let composer = PromptComposer::new(store);
        let messages = composer.compose(&key, &Turn::user("new question")).await;

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("Ironwren"));
        assert_eq!(messages[1].content, "earlier question");
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages.last().unwrap().content, "new question");
    }

    #[tokio::test]
    async fn channel_turns_carry_speaker_names() {
        let store = Arc::new(InMemoryStore::new());
        let key = ConversationKey::channel("900");
        store
            .append(&key, Turn::named_user("ada", "hello there"))
            .await
            .unwrap();
        store.append(&key, Turn::assistant("hi ada")).await.unwrap();

        let composer = PromptComposer::new(store);
        let messages = composer
            .compose(&key, &Turn::named_user("bob", "what did ada say?"))
            .await;

        assert_eq!(messages[1].content, "ada: hello there");
        assert_eq!(messages[2].content, "hi ada");
        assert_eq!(messages[3].content, "bob: what did ada say?");
    }

    #[tokio::test]
    async fn direct_turns_stay_unprefixed() {
        let store = Arc::new(InMemoryStore::new());
        let key = ConversationKey::user("42");
        store
            .append(&key, Turn::user("just me here"))
            .await
            .unwrap();

        let composer = PromptComposer::new(store);
        let messages = composer.compose(&key, &Turn::user("still me")).await;

        assert_eq!(messages[1].content, "just me here");
        assert_eq!(messages[2].content, "still me");
    }

    #[tokio::test]
    async fn broken_store_degrades_to_empty_context() {
        let composer = PromptComposer::new(Arc::new(BrokenStore));
        let key = ConversationKey::user("42");
        let messages = composer.compose(&key, &Turn::user("anyone home?")).await;

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].content, "anyone home?");
    }
}
