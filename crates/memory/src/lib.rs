//! Memory store implementations for Ironwren.
//!
//! Both backends share the same document shape; `JsonFileStore` persists it
//! to one JSON file, `InMemoryStore` keeps it ephemeral for tests.

pub mod document;
pub mod in_memory;
pub mod json_store;

pub use document::StoreDocument;
pub use in_memory::InMemoryStore;
pub use json_store::JsonFileStore;
