//! Platform trait: the abstraction over chat platforms.
//!
//! A Platform connects Ironwren to a messaging service. It yields inbound
//! events (plain messages or messages carrying attachments) and exposes the
//! reply, edit, and delete primitives the assistant needs. Connection
//! handling, rate limiting, and permission checks stay inside the
//! implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::attachment::Attachment;
use crate::error::PlatformError;

/// What kind of event arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A text message with no files attached
    Message,
    /// A message carrying one or more attachments
    AttachmentBatch,
}

/// One inbound event from the chat platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Sender identifier (platform-specific user ID)
    pub author_id: String,

    /// Human-readable sender name (if the platform supplies one)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// The channel the event arrived in
    pub channel_id: String,

    /// The guild/server the channel belongs to; absent in direct messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,

    /// The text content (may be empty on pure file uploads)
    pub content: String,

    /// Files attached to the message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl InboundEvent {
    pub fn kind(&self) -> EventKind {
        if self.attachments.is_empty() {
            EventKind::Message
        } else {
            EventKind::AttachmentBatch
        }
    }

    /// The name to show for this author, falling back to the raw id.
    pub fn author_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.author_id)
    }

    /// Whether the event arrived in a direct message rather than a guild
    /// channel.
    pub fn is_direct(&self) -> bool {
        self.guild_id.is_none()
    }
}

/// A file sent back alongside a reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundFile {
    /// Name shown to the recipient
    pub filename: String,

    /// Raw payload; transient, never serialized
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl OutboundFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// A reply going out through the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// The text content
    pub text: String,

    /// Optional file attached to the reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<OutboundFile>,
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            file: None,
        }
    }

    pub fn with_file(text: impl Into<String>, file: OutboundFile) -> Self {
        Self {
            text: text.into(),
            file: Some(file),
        }
    }
}

/// The core Platform trait.
///
/// Implementations handle platform-specific connection logic, payload
/// shapes, and authentication.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Human-readable platform name (e.g., "discord").
    fn name(&self) -> &str;

    /// Start listening for incoming events.
    ///
    /// Returns a receiver that yields inbound events. The platform
    /// implementation handles polling, webhooks, or websocket connections
    /// internally.
    async fn start(
        &self,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<InboundEvent, PlatformError>>,
        PlatformError,
    >;

    /// Send a message into a channel. Returns the platform's id for the
    /// sent message so it can later be edited or deleted.
    async fn reply(
        &self,
        channel_id: &str,
        message: OutboundMessage,
    ) -> std::result::Result<String, PlatformError>;

    /// Replace the text of a previously sent message.
    async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        text: &str,
    ) -> std::result::Result<(), PlatformError>;

    /// Delete a previously sent message.
    async fn delete_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> std::result::Result<(), PlatformError>;

    /// Check if a sender is allowed (allowlist check).
    fn is_allowed(&self, author_id: &str) -> bool;

    /// Stop the platform gracefully.
    async fn stop(&self) -> std::result::Result<(), PlatformError> {
        Ok(())
    }

    /// Health check: is the platform connected and operational?
    async fn health_check(&self) -> std::result::Result<bool, PlatformError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(content: &str, attachments: Vec<Attachment>) -> InboundEvent {
        InboundEvent {
            author_id: "u1".into(),
            display_name: Some("Asha".into()),
            channel_id: "c1".into(),
            guild_id: Some("g1".into()),
            content: content.into(),
            attachments,
        }
    }

    #[test]
    fn kind_follows_attachments() {
        assert_eq!(event("hello", vec![]).kind(), EventKind::Message);

        let upload = event("", vec![Attachment::new("a.txt", b"x".to_vec())]);
        assert_eq!(upload.kind(), EventKind::AttachmentBatch);
    }

    #[test]
    fn author_name_falls_back_to_id() {
        let mut ev = event("hi", vec![]);
        assert_eq!(ev.author_name(), "Asha");
        ev.display_name = None;
        assert_eq!(ev.author_name(), "u1");
    }

    #[test]
    fn direct_message_has_no_guild() {
        let mut ev = event("hi", vec![]);
        assert!(!ev.is_direct());
        ev.guild_id = None;
        assert!(ev.is_direct());
    }

    #[test]
    fn outbound_file_bytes_never_serialize() {
        let msg = OutboundMessage::with_file(
            "here you go",
            OutboundFile::new("fixed.py", b"print(1)".to_vec()),
        );
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("fixed.py"));
        assert!(!json.contains("print(1)"));
    }
}
