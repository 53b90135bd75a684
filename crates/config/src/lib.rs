//! Configuration loading, validation, and management for Ironwren.
//!
//! Loads configuration from `~/.ironwren/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.ironwren/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Provider API key; usually supplied via environment instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model used for conversational replies
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used for file analysis and rewriting
    #[serde(default = "default_analyze_model")]
    pub analyze_model: String,

    /// Default sampling temperature for chat replies
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Override the provider's API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Memory configuration
    #[serde(default)]
    pub memory: MemorySettings,

    /// Discord configuration
    #[serde(default)]
    pub discord: DiscordSettings,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewaySettings,
}

fn default_chat_model() -> String {
    "llama-3.1-8b-instant".into()
}
fn default_analyze_model() -> String {
    "mixtral-8x7b-32768".into()
}
fn default_temperature() -> f32 {
    0.7
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("chat_model", &self.chat_model)
            .field("analyze_model", &self.analyze_model)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .field("memory", &self.memory)
            .field("discord", &self.discord)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySettings {
    /// Storage backend name
    #[serde(default = "default_memory_backend")]
    pub backend: String,

    /// Where the JSON document lives
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
}

fn default_memory_backend() -> String {
    "json-file".into()
}
fn default_data_file() -> PathBuf {
    AppConfig::data_dir().join("store.json")
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            backend: default_memory_backend(),
            data_file: default_data_file(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct DiscordSettings {
    /// Bot token; usually supplied via environment instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,

    /// Prefix that marks a message as a command
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    /// Allowlist of author IDs. Empty = deny all. ["*"] = allow all.
    #[serde(default = "default_allowed_users")]
    pub allowed_users: Vec<String>,
}

fn default_command_prefix() -> String {
    "!".into()
}
fn default_allowed_users() -> Vec<String> {
    vec!["*".into()]
}

impl Default for DiscordSettings {
    fn default() -> Self {
        Self {
            bot_token: None,
            command_prefix: default_command_prefix(),
            allowed_users: default_allowed_users(),
        }
    }
}

impl std::fmt::Debug for DiscordSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordSettings")
            .field("bot_token", &redact(&self.bot_token))
            .field("command_prefix", &self.command_prefix)
            .field("allowed_users", &self.allowed_users)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.ironwren/config.toml).
    ///
    /// Also checks environment variables:
    /// - `IRONWREN_API_KEY` (highest priority), then `GROQ_API_KEY`
    /// - `IRONWREN_MODEL` overrides the chat model
    /// - `IRONWREN_DISCORD_TOKEN`, then `DISCORD_TOKEN`
    /// - `IRONWREN_GATEWAY_PORT`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.api_key.is_none() {
            config.api_key = std::env::var("IRONWREN_API_KEY")
                .ok()
                .or_else(|| std::env::var("GROQ_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("IRONWREN_MODEL") {
            config.chat_model = model;
        }

        if config.discord.bot_token.is_none() {
            config.discord.bot_token = std::env::var("IRONWREN_DISCORD_TOKEN")
                .ok()
                .or_else(|| std::env::var("DISCORD_TOKEN").ok());
        }

        if let Ok(port) = std::env::var("IRONWREN_GATEWAY_PORT") {
            config.gateway.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "IRONWREN_GATEWAY_PORT is not a valid port: {port}"
                ))
            })?;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".ironwren")
    }

    /// Get the data directory path.
    pub fn data_dir() -> PathBuf {
        Self::config_dir().join("data")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.chat_model.trim().is_empty() || self.analyze_model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "model names must not be empty".into(),
            ));
        }

        if self.discord.command_prefix.is_empty() {
            return Err(ConfigError::ValidationError(
                "discord.command_prefix must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Check if a provider API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            chat_model: default_chat_model(),
            analyze_model: default_analyze_model(),
            temperature: default_temperature(),
            base_url: None,
            memory: MemorySettings::default(),
            discord: DiscordSettings::default(),
            gateway: GatewaySettings::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chat_model, "llama-3.1-8b-instant");
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.discord.command_prefix, "!");
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.chat_model, config.chat_model);
        assert_eq!(parsed.gateway.port, config.gateway.port);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_command_prefix_rejected() {
        let mut config = AppConfig::default();
        config.discord.command_prefix = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.analyze_model, "mixtral-8x7b-32768");
    }

    #[test]
    fn parses_discord_section() {
        let toml_str = r#"
chat_model = "llama-3.1-70b-versatile"

[discord]
bot_token = "abc123"
command_prefix = "?"
allowed_users = ["42", "77"]
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.chat_model, "llama-3.1-70b-versatile");
        assert_eq!(config.discord.command_prefix, "?");
        assert_eq!(config.discord.allowed_users, vec!["42", "77"]);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = AppConfig::default();
        config.api_key = Some("sk-very-secret".into());
        config.discord.bot_token = Some("token-very-secret".into());
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("very-secret"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("llama-3.1-8b-instant"));
        assert!(toml_str.contains("8080"));
    }
}
