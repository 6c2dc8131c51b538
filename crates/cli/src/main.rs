//! Reagent CLI — the main entry point.
//!
//! Commands:
//! - `serve`  — Start the HTTP chat server
//! - `chat`   — Run a single message through the agent from the terminal
//! - `config` — Print the default configuration TOML

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "reagent",
    about = "Reagent — conversational ReAct agent service",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "reagent.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP chat server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run a single message through the agent
    Chat {
        /// The message to send
        message: String,

        /// Continue an existing thread
        #[arg(short, long)]
        thread_id: Option<String>,

        /// Override the reasoning iteration cap
        #[arg(long)]
        max_iterations: Option<u32>,
    },

    /// Print the default configuration TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(&cli.config, port).await?,
        Commands::Chat {
            message,
            thread_id,
            max_iterations,
        } => commands::chat::run(&cli.config, &message, thread_id, max_iterations).await?,
        Commands::Config => {
            print!("{}", reagent_config::AppConfig::default_toml());
        }
    }

    Ok(())
}
