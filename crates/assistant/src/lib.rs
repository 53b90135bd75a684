//! # Ironwren Assistant
//!
//! The engine that turns inbound chat events into replies: conversational
//! memory, the prefix command surface, and the upload pipeline that gates,
//! summarizes, and rewrites files.
//!
//! The engine is transport-agnostic. It speaks to the model through
//! [`ironwren_core::Provider`], to persistence through
//! [`ironwren_core::MemoryStore`], and to the chat service through
//! [`ironwren_core::Platform`]; swap any of the three without touching the
//! routing logic here.

pub mod commands;
pub mod composer;
pub mod dispatch;
pub mod engine;
pub mod intake;
pub mod persona;
pub mod scaffold;
pub mod util;

pub use composer::PromptComposer;
pub use engine::Assistant;
pub use intake::FilePipeline;
pub use persona::{ASSISTANT_NAME, Task};
