//! Discord platform adapter (stub).
//!
//! Implements the Platform trait for the Discord Bot API. In production
//! this would ride a `serenity` WebSocket gateway session; currently a
//! stub with in-process event injection for testing. Sent messages are
//! tracked by id so edits and deletes behave like the real API.

use std::collections::HashMap;

use async_trait::async_trait;
use ironwren_core::error::PlatformError;
use ironwren_core::platform::{InboundEvent, OutboundMessage, Platform};
use tokio::sync::{mpsc, Mutex};
use tracing::info;

/// Discord platform configuration.
#[derive(Clone)]
pub struct DiscordConfig {
    /// Bot token from the Discord Developer Portal.
    pub bot_token: String,
    /// Allowed author IDs. Empty = deny all, ["*"] = allow all.
    pub allowed_users: Vec<String>,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("bot_token", &"[REDACTED]")
            .field("allowed_users", &self.allowed_users)
            .finish()
    }
}

impl From<&ironwren_config::DiscordSettings> for DiscordConfig {
    fn from(settings: &ironwren_config::DiscordSettings) -> Self {
        Self {
            bot_token: settings.bot_token.clone().unwrap_or_default(),
            allowed_users: settings.allowed_users.clone(),
        }
    }
}

/// Discord platform adapter.
pub struct DiscordPlatform {
    config: DiscordConfig,
    inject_tx: Mutex<Option<mpsc::Sender<Result<InboundEvent, PlatformError>>>>,
    /// message id -> current text, for every message this adapter sent
    sent: Mutex<HashMap<String, String>>,
}

impl DiscordPlatform {
    pub fn new(config: DiscordConfig) -> Self {
        Self {
            config,
            inject_tx: Mutex::new(None),
            sent: Mutex::new(HashMap::new()),
        }
    }

    /// Inject an event as if it came from Discord (for testing).
    pub async fn inject_event(&self, event: InboundEvent) -> Result<(), PlatformError> {
        let guard = self.inject_tx.lock().await;
        if let Some(tx) = guard.as_ref() {
            tx.send(Ok(event))
                .await
                .map_err(|_| PlatformError::ConnectionLost("Event channel closed".into()))
        } else {
            Err(PlatformError::ConnectionLost("Platform not started".into()))
        }
    }

    /// The current text of a sent message, if it still exists.
    pub async fn sent_text(&self, message_id: &str) -> Option<String> {
        self.sent.lock().await.get(message_id).cloned()
    }

    /// Every live sent-message text, in no particular order.
    pub async fn sent_texts(&self) -> Vec<String> {
        self.sent.lock().await.values().cloned().collect()
    }
}

#[async_trait]
impl Platform for DiscordPlatform {
    fn name(&self) -> &str {
        "discord"
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<InboundEvent, PlatformError>>, PlatformError> {
        info!("Discord platform starting (stub mode)");
        let (tx, rx) = mpsc::channel(64);
        *self.inject_tx.lock().await = Some(tx);
        Ok(rx)
    }

    async fn reply(
        &self,
        channel_id: &str,
        message: OutboundMessage,
    ) -> Result<String, PlatformError> {
        let message_id = uuid::Uuid::new_v4().to_string();
        info!(
            channel_id = %channel_id,
            message_id = %message_id,
            content_len = message.text.len(),
            has_file = message.file.is_some(),
            "Discord send (stub)"
        );
        self.sent
            .lock()
            .await
            .insert(message_id.clone(), message.text);
        Ok(message_id)
    }

    async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        text: &str,
    ) -> Result<(), PlatformError> {
        let mut sent = self.sent.lock().await;
        match sent.get_mut(message_id) {
            Some(existing) => {
                info!(channel_id = %channel_id, message_id = %message_id, "Discord edit (stub)");
                *existing = text.to_string();
                Ok(())
            }
            None => Err(PlatformError::UnknownMessage {
                channel: channel_id.to_string(),
                message_id: message_id.to_string(),
            }),
        }
    }

    async fn delete_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<(), PlatformError> {
        let mut sent = self.sent.lock().await;
        if sent.remove(message_id).is_some() {
            info!(channel_id = %channel_id, message_id = %message_id, "Discord delete (stub)");
            Ok(())
        } else {
            Err(PlatformError::UnknownMessage {
                channel: channel_id.to_string(),
                message_id: message_id.to_string(),
            })
        }
    }

    fn is_allowed(&self, author_id: &str) -> bool {
        if self.config.allowed_users.is_empty() {
            return false;
        }
        if self.config.allowed_users.iter().any(|u| u == "*") {
            return true;
        }
        self.config.allowed_users.iter().any(|u| u == author_id)
    }

    async fn stop(&self) -> Result<(), PlatformError> {
        info!("Discord platform stopping");
        *self.inject_tx.lock().await = None;
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, PlatformError> {
        Ok(!self.config.bot_token.is_empty())
    }
}
