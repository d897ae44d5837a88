//! Verwatch CLI
//!
//! Command-line interface for the deployed-version watch and refresh service.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use verwatch::{build_watcher, load_config, Config};

#[derive(Parser)]
#[command(name = "verwatch")]
#[command(about = "Deployed-version watch and refresh service")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Version descriptor URL (overrides config file)
    #[arg(long)]
    url: Option<String>,

    /// Check interval in seconds (overrides config file)
    #[arg(long)]
    interval: Option<u64>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the polling watcher (default)
    Run,

    /// Perform a single check and print the outcome
    CheckOnce,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, url={:?}, interval={:?}, log_level={:?}",
        args.config,
        args.url,
        args.interval,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(url) = args.url {
        config.watch.version_url = url;
    }
    if let Some(interval) = args.interval {
        config.watch.check_interval_seconds = interval;
    }

    match args.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            tracing::info!("Starting verwatch service");
            verwatch::run(config).await?;
        }
        Commands::CheckOnce => {
            let watcher = build_watcher(&config);
            let outcome = watcher.check().await;
            println!("{}", outcome);
        }
    }

    Ok(())
}
