//! `ironwren chat`: interactive or single-message chat from the terminal.
//!
//! Uses the same composer and persona as the chat platform path, backed by
//! an in-memory history that lives for the session.

use std::io::{BufRead, Write};
use std::sync::Arc;

use ironwren_assistant::{PromptComposer, Task};
use ironwren_config::AppConfig;
use ironwren_core::{CompletionRequest, ConversationKey, MemoryStore, Provider, Turn};
use ironwren_memory::InMemoryStore;

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    IRONWREN_API_KEY=gsk_...");
        eprintln!("    GROQ_API_KEY=gsk_...");
        eprintln!();
        eprintln!("  Or add api_key to your config file:");
        eprintln!(
            "    {}",
            AppConfig::config_dir().join("config.toml").display()
        );
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = ironwren_providers::from_config(&config)?;
    let store: Arc<dyn MemoryStore> = Arc::new(InMemoryStore::new());
    let composer = PromptComposer::new(store.clone());
    let key = ConversationKey::user("terminal");

    if let Some(text) = message {
        // Single message mode
        eprint!("  Thinking...");
        let reply = exchange(&provider, &store, &composer, &key, &config, &text).await?;
        eprint!("\r             \r");
        println!("{reply}");
        return Ok(());
    }

    // Interactive mode
    println!("\u{1f426} Ironwren (type 'exit' to quit)\n");
    let stdin = std::io::stdin();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == "exit" || text == "quit" {
            break;
        }

        match exchange(&provider, &store, &composer, &key, &config, text).await {
            Ok(reply) => println!("\n{reply}\n"),
            Err(error) => eprintln!("  Error: {error}"),
        }
    }

    println!("Bye!");
    Ok(())
}

async fn exchange(
    provider: &Arc<dyn Provider>,
    store: &Arc<dyn MemoryStore>,
    composer: &PromptComposer,
    key: &ConversationKey,
    config: &AppConfig,
    text: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let input = Turn::user(text);
    let messages = composer.compose(key, &input).await;
    let params = Task::Chat.params();
    let request = CompletionRequest::new(&config.chat_model, messages)
        .with_max_tokens(params.max_tokens)
        .with_temperature(params.temperature);

    let response = provider.complete(request).await?;
    store.append(key, input).await?;
    store.append(key, Turn::assistant(&response.content)).await?;
    Ok(response.content)
}
