//! `ironwren status`: show configuration and store health.

use ironwren_config::AppConfig;
use ironwren_core::MemoryStore;
use ironwren_memory::JsonFileStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("\u{1f426} Ironwren Status");
    println!("=================");
    println!("  Config dir:    {}", AppConfig::config_dir().display());
    println!("  Data file:     {}", config.memory.data_file.display());
    println!("  Chat model:    {}", config.chat_model);
    println!("  Code model:    {}", config.analyze_model);
    println!("  Temperature:   {}", config.temperature);
    println!("  Memory:        {}", config.memory.backend);
    println!(
        "  Gateway:       {}:{}",
        config.gateway.host, config.gateway.port
    );
    println!("  Prefix:        {}", config.discord.command_prefix);
    println!(
        "  API key:       {}",
        if config.has_api_key() {
            "configured"
        } else {
            "missing"
        }
    );
    println!(
        "  Discord token: {}",
        if config.discord.bot_token.is_some() {
            "configured"
        } else {
            "missing"
        }
    );

    let store = JsonFileStore::new(config.memory.data_file.clone());
    let stats = store.global_stats().await?;
    println!("\n  Requests served: {}", stats.total_requests);
    println!("  Users seen:      {}", stats.unique_users);
    println!("  Files analyzed:  {}", stats.files_analyzed);

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  \u{2705} Config file found");
    } else {
        println!("\n  \u{26a0}\u{fe0f}  No config file: run `ironwren onboard` first");
    }

    Ok(())
}
