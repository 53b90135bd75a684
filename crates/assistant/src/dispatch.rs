//! Outbound shaping: transport bounds and user-facing error wording.

use ironwren_core::{FileError, ProviderError};

use crate::intake::SUPPORTED_TEXT_HINT;

/// Character bound for rich embed-style replies.
pub const RICH_LIMIT: usize = 4096;
/// Character bound for plain text replies.
pub const PLAIN_LIMIT: usize = 2000;

const ELLIPSIS: &str = "...";

/// Cut `text` down to `limit` characters, keeping the head and marking the
/// cut. Same input, same output, every time.
pub fn truncate_for_transport(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let keep = limit.saturating_sub(ELLIPSIS.len());
    let head: String = text.chars().take(keep).collect();
    format!("{head}{ELLIPSIS}")
}

pub fn truncate_rich(text: &str) -> String {
    truncate_for_transport(text, RICH_LIMIT)
}

pub fn truncate_plain(text: &str) -> String {
    truncate_for_transport(text, PLAIN_LIMIT)
}

/// What the user sees when a provider call fails. Auth and rate-limit
/// failures get their own wording; everything else carries the error text.
pub fn provider_error_reply(error: &ProviderError) -> String {
    match error {
        ProviderError::AuthenticationFailed(_) => {
            "\u{26a0}\u{fe0f} My connection to the language service is misconfigured. \
             Ask an admin to check the API key."
                .to_string()
        }
        ProviderError::RateLimited { .. } => {
            "\u{23f3} I'm being rate limited right now. Give me a moment and try again."
                .to_string()
        }
        other => format!("\u{26a0}\u{fe0f} Something went wrong while I was thinking: {other}"),
    }
}

/// What the user sees when a file is refused.
pub fn rejection_reply(error: &FileError) -> String {
    match error {
        FileError::Oversize { limit_bytes, .. } => format!(
            "\u{274c} That file is too large. The limit is {}.",
            ironwren_core::format_file_size(*limit_bytes)
        ),
        FileError::UnsupportedArchive { .. } => format!(
            "\u{274c} Archive files aren't supported. Send a plain text file \
             instead ({SUPPORTED_TEXT_HINT})."
        ),
        FileError::UnsupportedImage { .. } => format!(
            "\u{274c} I can't read images yet. Send a text file instead \
             ({SUPPORTED_TEXT_HINT})."
        ),
        FileError::DangerousFilename { filename } => {
            format!("\u{274c} I can't accept `{filename}`. That file type is blocked.")
        }
        FileError::Unfixable { filename } => {
            format!("\u{274c} I couldn't produce a usable fix for `{filename}`.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_passes_through_unchanged() {
        assert_eq!(truncate_plain("hello"), "hello");
        let exactly = "x".repeat(PLAIN_LIMIT);
        assert_eq!(truncate_plain(&exactly), exactly);
    }

    #[test]
    fn long_text_is_cut_at_the_bound_with_a_marker() {
        let long = "y".repeat(PLAIN_LIMIT + 500);
        let cut = truncate_plain(&long);
        assert_eq!(cut.chars().count(), PLAIN_LIMIT);
        assert!(cut.ends_with("..."));
        assert!(cut.starts_with("yyy"));
    }

    #[test]
    fn truncation_is_deterministic() {
        let long = "z".repeat(RICH_LIMIT * 2);
        assert_eq!(truncate_rich(&long), truncate_rich(&long));
    }

    #[test]
    fn auth_failures_never_leak_the_key_context() {
        let reply = provider_error_reply(&ProviderError::AuthenticationFailed(
            "Invalid API key sk-12345".to_string(),
        ));
        assert!(reply.contains("API key"));
        assert!(!reply.contains("sk-12345"));
    }

    #[test]
    fn rate_limits_ask_for_patience() {
        let reply = provider_error_reply(&ProviderError::RateLimited {
            retry_after_secs: 5,
        });
        assert!(reply.contains("rate limited"));
    }

    #[test]
    fn generic_errors_carry_the_cause() {
        let reply = provider_error_reply(&ProviderError::ApiError {
            status_code: 502,
            message: "bad gateway".to_string(),
        });
        assert!(reply.contains("bad gateway"));
    }

    #[test]
    fn archive_refusal_names_supported_extensions() {
        let reply = rejection_reply(&FileError::UnsupportedArchive {
            filename: "site.zip".to_string(),
        });
        assert!(reply.contains(".py"));
        assert!(reply.contains(".txt"));
    }

    #[test]
    fn oversize_refusal_names_the_limit() {
        let reply = rejection_reply(&FileError::Oversize {
            size_bytes: 200 * 1024 * 1024,
            limit_bytes: 100 * 1024 * 1024,
        });
        assert!(reply.contains("100.0 MB"));
    }
}
