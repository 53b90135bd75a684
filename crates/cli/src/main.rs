//! Ironwren CLI: the main entry point.
//!
//! Commands:
//! - `onboard` creates the config and data directories
//! - `chat`    talks to the assistant from the terminal
//! - `daemon`  runs the full assistant plus the keep-alive gateway
//! - `status`  shows configuration and store health

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "ironwren",
    about = "Ironwren, a coding assistant that lives in your chat server",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and data directories
    Onboard,

    /// Chat with the assistant from the terminal
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Run the assistant and the keep-alive gateway
    Daemon {
        /// Override the gateway port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show configuration and store status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat { message } => commands::chat::run(message).await?,
        Commands::Daemon { port } => commands::daemon::run(port).await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
