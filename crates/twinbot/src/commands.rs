//! twinbot command implementations

use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use twinbot_agent::tools::build_registry;
use twinbot_agent::{Orchestrator, PromptBuilder, TurnOptions};
use twinbot_channels::{Channel, TelegramChannel};
use twinbot_config::{self, Config};
use twinbot_memory::{EmbeddingClient, Ingestor, MemoryStore, PineconeClient};
use twinbot_provider::GeminiProvider;

fn memory_store(config: &Config) -> Arc<MemoryStore> {
    let embeddings = Arc::new(EmbeddingClient::new(
        config.model.api_key.clone(),
        config.memory.embed_model.clone(),
    ));
    let index = Arc::new(PineconeClient::new(
        config.memory.pinecone_api_key.clone(),
        config.memory.index_host.clone(),
    ));
    Arc::new(MemoryStore::new(embeddings, index))
}

fn build_agent(config: &Config) -> Orchestrator {
    let provider = Arc::new(GeminiProvider::new(
        config.model.api_key.clone(),
        config.model.api_base.clone(),
    ));
    let registry = Arc::new(build_registry(config, memory_store(config)));
    Orchestrator::new(
        provider,
        registry,
        PromptBuilder::new(&config.persona),
        TurnOptions::from_config(config),
    )
}

/// Initialize config and data folder
pub async fn init_command() -> Result<()> {
    println!("Initializing twinbot...");

    let config = twinbot_config::init().await?;
    let data = config.data_folder();
    tokio::fs::create_dir_all(&data).await?;

    println!("Config:      {}", twinbot_config::config_path().display());
    println!("Data folder: {}", data.display());
    println!("\nNext steps:");
    println!("  1. Add your API keys to the config (or set GOOGLE_API_KEY,");
    println!("     PINECONE_API_KEY, TAVILY_API_KEY and TELEGRAM_TOKEN).");
    println!("  2. Drop .txt/.md notes into the data folder and run: twinbot ingest");
    println!("  3. Start the bot: twinbot serve");

    Ok(())
}

/// Chat with the agent from the terminal
pub async fn chat_command(message: Option<String>) -> Result<()> {
    let config = Config::load().await?;
    if config.model.api_key.is_empty() {
        anyhow::bail!("No model API key configured. Set GOOGLE_API_KEY or edit the config.");
    }

    let agent = build_agent(&config);

    if let Some(message) = message {
        let reply = agent.run_turn(&message).await;
        println!("\n{}", reply);
        return Ok(());
    }

    println!("Interactive mode (type 'exit' to quit)");
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        let reply = agent.run_turn(input).await;
        println!("\n{}\n", reply);
    }

    Ok(())
}

/// Run the Telegram bot with the keep-alive endpoint
pub async fn serve_command() -> Result<()> {
    let config = Config::load().await?;
    config.validate_for_serve()?;

    let agent = Arc::new(build_agent(&config));

    let host = config.deploy.host.clone();
    let port = config.deploy.port;
    tokio::spawn(async move {
        if let Err(e) = twinbot_health::serve(&host, port).await {
            error!("health endpoint failed: {}", e);
        }
    });

    info!("twinbot is online (port {})", config.deploy.port);

    let channel = TelegramChannel::new(&config, agent);
    channel
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("telegram channel failed: {}", e))?;

    Ok(())
}

/// Index documents into the memory store
pub async fn ingest_command(dir: Option<String>) -> Result<()> {
    let config = Config::load().await?;
    if config.model.api_key.is_empty() {
        anyhow::bail!("No model API key configured. Set GOOGLE_API_KEY or edit the config.");
    }
    if config.memory.pinecone_api_key.is_empty() || config.memory.index_host.is_empty() {
        anyhow::bail!("Pinecone is not configured. Set PINECONE_API_KEY and PINECONE_INDEX_HOST.");
    }

    let dir = dir
        .map(PathBuf::from)
        .unwrap_or_else(|| config.data_folder());

    let store = memory_store(&config);
    let ingestor = Ingestor::new(
        store.embeddings(),
        store.index(),
        config.ingest.chunk_size,
        config.ingest.chunk_overlap,
    );

    println!("Ingesting from {}...", dir.display());
    let report = ingestor
        .ingest_dir(&dir)
        .await
        .context("ingest run failed")?;

    println!(
        "Done: {} documents, {} chunks indexed.",
        report.documents, report.chunks
    );
    Ok(())
}

/// Show configuration status
pub async fn status_command() -> Result<()> {
    let config = Config::load().await?;

    let set_or_not = |value: &str| if value.is_empty() { "[Not set]" } else { "[Set]" };

    println!("twinbot status");
    println!("  Model:        {}", config.model.model);
    println!("  Model key:    {}", set_or_not(&config.model.api_key));
    println!("  Pinecone key: {}", set_or_not(&config.memory.pinecone_api_key));
    println!("  Index host:   {}", set_or_not(&config.memory.index_host));
    println!("  Tavily key:   {}", set_or_not(&config.tools.tavily_api_key));
    println!("  GitHub token: {}", set_or_not(&config.tools.github_token));
    println!("  Telegram:     {}", set_or_not(&config.telegram.token));

    let allowed = if config.telegram.allow_from.is_empty() {
        "Any".to_string()
    } else {
        config.telegram.allow_from.join(", ")
    };
    println!("  Allowed users: {}", allowed);
    println!("  Data folder:   {}", config.data_folder().display());

    Ok(())
}
