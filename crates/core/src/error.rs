//! Error types for the Ironwren domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Ironwren operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Platform errors ---
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- File pipeline errors ---
    #[error("File error: {0}")]
    File(#[from] FileError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Platform not configured: {0}")]
    NotConfigured(String),

    #[error("Message delivery failed to {channel}: {reason}")]
    DeliveryFailed { channel: String, reason: String },

    #[error("Unknown message: {message_id} on {channel}")]
    UnknownMessage { channel: String, message_id: String },

    #[error("Platform connection lost: {0}")]
    ConnectionLost(String),
}

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupt document: {0}")]
    CorruptDocument(String),
}

/// Terminal rejections from the attachment pipeline. Each variant maps
/// onto one user-facing refusal message.
#[derive(Debug, Clone, Error)]
pub enum FileError {
    #[error("file is {size_bytes} bytes, limit is {limit_bytes}")]
    Oversize { size_bytes: u64, limit_bytes: u64 },

    #[error("archive uploads are not supported: {filename}")]
    UnsupportedArchive { filename: String },

    #[error("image uploads are not supported: {filename}")]
    UnsupportedImage { filename: String },

    #[error("filename refused by safety rules: {filename}")]
    DangerousFilename { filename: String },

    #[error("no usable rewrite produced for {filename}")]
    Unfixable { filename: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn file_error_displays_correctly() {
        let err = Error::File(FileError::Oversize {
            size_bytes: 104_857_601,
            limit_bytes: 104_857_600,
        });
        assert!(err.to_string().contains("104857601"));
        assert!(err.to_string().contains("limit"));
    }

    #[test]
    fn memory_error_wraps_into_top_level() {
        let err: Error = MemoryError::Storage("disk full".into()).into();
        assert!(err.to_string().contains("disk full"));
    }
}
