//! twinbot - a Telegram digital-twin assistant

use clap::{Parser, Subcommand};
use tracing::error;

mod commands;

use commands::{chat_command, ingest_command, init_command, serve_command, status_command};

/// twinbot - your digital twin on Telegram
#[derive(Parser)]
#[command(name = "twinbot")]
#[command(about = "Telegram digital-twin assistant")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config and data folder
    Init,
    /// Chat with the agent from the terminal
    Chat {
        /// Message to send
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Run the Telegram bot and health endpoint
    Serve {
        /// Verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
    /// Index documents into the memory store
    Ingest {
        /// Folder to ingest (defaults to the configured data folder)
        #[arg(short, long)]
        dir: Option<String>,
    },
    /// Show configuration status
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Serve { verbose: true }) {
        tracing_subscriber::fmt().with_env_filter("debug").init();
    } else {
        tracing_subscriber::fmt::init();
    }

    match cli.command {
        Commands::Init => {
            if let Err(e) = init_command().await {
                error!("Init failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Chat { message } => {
            if let Err(e) = chat_command(message).await {
                error!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Serve { verbose: _ } => {
            if let Err(e) = serve_command().await {
                error!("Serve failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Ingest { dir } => {
            if let Err(e) = ingest_command(dir).await {
                error!("Ingest failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Status => {
            if let Err(e) = status_command().await {
                error!("Status failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}
