//! RoboSats maker bot - entry point.
//!
//! Creates a maker order every day at the configured open hour, pays its
//! bond from the configured wallet, and cancels it at the close hour.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// RoboSats maker bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via ROBO_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    robo_bot::logging::init_logging()?;

    info!("Starting robo-bot v{}", env!("CARGO_PKG_VERSION"));

    // Determine config path: CLI arg > ROBO_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("ROBO_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = robo_bot::AppConfig::from_file(&config_path)?;

    let secrets = robo_bot::Secrets::from_env()?;

    let mut app = robo_bot::Application::new(config, secrets)?;

    info!("Running preflight checks...");
    app.run_preflight().await?;

    app.run().await?;

    Ok(())
}
