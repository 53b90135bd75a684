//! Chat platform adapters for Ironwren.
//!
//! Each adapter connects to a chat platform and relays events to and from
//! the assistant. Adapters are trait-based and platform-agnostic.
//!
//! Available adapters:
//! - **Discord** (stub, needs serenity in production)

pub mod discord;

pub use discord::{DiscordConfig, DiscordPlatform};
