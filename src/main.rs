//! Poolfade - mean-reversion fade signal engine for DEX pool event streams
//!
//! Watches a stream of pool events for sudden, isolated price shocks and
//! emits sized contrarian trade signals. Signals are intents, not orders:
//! execution belongs to a downstream consumer.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

// Use the library crate
use poolfade::cli::commands;
use poolfade::config::Config;

/// Mean-reversion fade signal engine
#[derive(Parser)]
#[command(name = "poolfade")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the fade engine over an event stream
    Start {
        /// Replay events from a JSONL file instead of the configured source
        #[arg(long)]
        replay: Option<String>,

        /// Stop after this many events
        #[arg(long)]
        max_events: Option<u64>,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("poolfade=info".parse().unwrap()),
        )
        .with_target(true)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Start { replay, max_events } => {
            commands::start(&config, replay, max_events).await
        }
        Commands::Config => commands::show_config(&config),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
