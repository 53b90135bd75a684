//! LLM provider implementations for Ironwren.
//!
//! All providers implement the `ironwren_core::Provider` trait. The factory
//! builds the configured provider from `AppConfig`.

use std::sync::Arc;

use ironwren_config::AppConfig;
use ironwren_core::error::ProviderError;
use ironwren_core::provider::Provider;

pub mod groq;

pub use groq::GroqProvider;

/// Build the configured provider.
///
/// Fails when no API key is available; the assistant cannot run without
/// one.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| ProviderError::NotConfigured("no API key configured".into()))?;

    let mut provider = GroqProvider::new(api_key);
    if let Some(base_url) = &config.base_url {
        provider = provider.with_base_url(base_url);
    }

    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_requires_api_key() {
        let config = AppConfig::default();
        assert!(from_config(&config).is_err());
    }

    #[test]
    fn from_config_builds_groq() {
        let config = AppConfig {
            api_key: Some("gsk-test".into()),
            ..AppConfig::default()
        };
        let provider = from_config(&config).unwrap();
        assert_eq!(provider.name(), "groq");
    }
}
