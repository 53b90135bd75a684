//! `ironwren onboard`: first-time setup.

use ironwren_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");
    let data_dir = AppConfig::data_dir();

    println!("\u{1f426} Ironwren Setup");
    println!("================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("\u{2705} Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        println!("\u{2705} Created data directory: {}", data_dir.display());
    }

    if config_path.exists() {
        println!("\n\u{26a0}\u{fe0f}  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("\u{2705} Created config.toml at: {}", config_path.display());
        println!("\n\u{1f4dd} Next steps:");
        println!("   1. Edit {} and add your API key", config_path.display());
        println!("   2. Add your Discord bot token, or skip it and use `ironwren chat`");
        println!("   3. Run: ironwren daemon\n");
    }

    println!("\u{1f389} Setup complete.\n");

    Ok(())
}
