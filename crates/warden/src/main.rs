//! Warden CLI binary.
//!
//! - `warden run` connects to Discord and starts moderating
//! - `warden validate` prints the effective configuration without connecting

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use warden::WardenConfig;

/// Warden - anti-nuke moderation bot for Discord
#[derive(Parser, Debug)]
#[command(name = "warden")]
#[command(about = "Anti-nuke moderation bot for Discord", long_about = None)]
#[command(version)]
struct Cli {
    /// Command to execute
    #[command(subcommand)]
    command: Commands,

    /// Configuration file replacing ~/.config/warden/warden.toml and ./warden.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,

    /// Owner account id (overrides the configuration file)
    #[arg(long, env = "OWNER_ID", global = true)]
    owner_id: Option<u64>,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect to Discord and moderate
    Run {
        /// Bot token from the Discord Developer Portal
        #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Load and print the effective configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    warden::init_telemetry(cli.verbose, cli.json)?;

    let mut config = WardenConfig::load_from(cli.config.as_deref())?;
    if cli.owner_id.is_some() {
        config = config.with_owner_id(cli.owner_id);
    }

    match cli.command {
        Commands::Run { token } => {
            info!("Starting Warden");
            warden::run(&config, &token).await?;
        }
        Commands::Validate => {
            if let Err(e) = config.owner() {
                warn!(error = %e, "Configuration has no owner");
            }
            println!("Warden configuration");
            for (name, value) in config.summary() {
                println!("  {}: {}", name, value);
            }
        }
    }

    Ok(())
}
