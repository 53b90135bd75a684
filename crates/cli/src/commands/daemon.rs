//! `ironwren daemon`: the full runtime.
//!
//! Wires the provider, the JSON-file store, and the Discord adapter into
//! the assistant, then blocks on the keep-alive gateway.

use std::sync::Arc;

use ironwren_assistant::Assistant;
use ironwren_channels::{DiscordConfig, DiscordPlatform};
use ironwren_config::AppConfig;
use ironwren_memory::JsonFileStore;
use tracing::{error, info};

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("\u{1f426} Ironwren Daemon");
    println!(
        "   Gateway: {}:{}",
        config.gateway.host, config.gateway.port
    );
    println!("   Memory:  {}", config.memory.data_file.display());
    println!("   Models:  {} / {}", config.chat_model, config.analyze_model);

    let provider = ironwren_providers::from_config(&config)?;
    let store = Arc::new(JsonFileStore::new(config.memory.data_file.clone()));
    let platform = Arc::new(DiscordPlatform::new(DiscordConfig::from(&config.discord)));

    let assistant = Assistant::new(provider, store, platform)
        .with_models(&config.chat_model, &config.analyze_model)
        .with_prefix(&config.discord.command_prefix);

    tokio::spawn(async move {
        if let Err(err) = assistant.run().await {
            error!(error = %err, "Assistant stopped");
        }
    });
    info!("Assistant started");

    // The gateway blocks until the process exits
    ironwren_gateway::start(&config.gateway).await?;

    Ok(())
}
