//! Hackathon Sync CLI
//!
//! Command-line driver for the hackathon dashboard's sync layer.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use hackathon_sync::api::ApiClient;
use hackathon_sync::commands::{execute, Commands};
use hackathon_sync::{load_config, Config};
use tokio_util::sync::CancellationToken;
use tracing::Level;

#[derive(Parser)]
#[command(name = "hackathon-sync")]
#[command(about = "Client-side sync and actions for the hackathon dashboard")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API base URL (overrides config file and HACKATHON_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, api_url={:?}, log_level={:?}",
        args.config,
        args.api_url,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    config.apply_env_overrides();
    if let Some(api_url) = args.api_url {
        config.api.base_url = api_url;
    }
    config.validate()?;

    let api = Arc::new(ApiClient::from_config(&config.api)?);
    tracing::debug!("Using API at {}", api.base_url());

    let shutdown = CancellationToken::new();
    let shutdown_for_signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                shutdown_for_signal.cancel();
            }
            Err(e) => tracing::warn!("Failed to listen for ctrl-c: {}", e),
        }
    });

    let output = execute(&args.command, &config, api, shutdown).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
