//! # Ironwren Core
//!
//! Domain types, traits, and error definitions for the Ironwren chat
//! assistant. This crate has **zero framework dependencies**: it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod turn;
pub mod attachment;
pub mod provider;
pub mod platform;
pub mod store;
pub mod stats;

// Re-export key types at crate root for ergonomics
pub use error::{Error, FileError, MemoryError, PlatformError, ProviderError, Result};
pub use turn::{ConversationKey, Role, Scope, Turn, TurnHistory};
pub use attachment::{Attachment, FileVerdict, MAX_ATTACHMENT_BYTES, format_file_size};
pub use provider::{ChatMessage, CompletionRequest, CompletionResponse, Provider, Usage};
pub use platform::{EventKind, InboundEvent, OutboundFile, OutboundMessage, Platform};
pub use store::MemoryStore;
pub use stats::{AnalysisRecord, GlobalStats, UserStats};
