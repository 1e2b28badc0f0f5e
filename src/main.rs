//! Attune - headless client for an attention-adaptive music server.
//!
//! Mirrors server playback state into a local audio engine, optionally
//! streams camera/microphone captures to the server's analyzers, and
//! adapts volume and presentation to the inferred attention level.

use std::{error::Error, path::PathBuf, sync::Arc};

use clap::Parser;
use tracing::{info, warn};

use attune::{
    config::AttuneConfig,
    service_manager::Services,
    services::{attention::NullSurface, inference::NullOverlay},
    tracing_config,
};

#[derive(Parser)]
#[command(name = "attune", version, about = "Attention-adaptive music client")]
struct Cli {
    /// Base URL of the music server, overriding the config file
    #[arg(long)]
    server: Option<String>,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start camera/microphone capture immediately
    #[arg(long)]
    capture: bool,

    /// Disable attention-driven adaptation
    #[arg(long)]
    no_adapt: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    tracing_config::init()?;

    let mut config = match &cli.config {
        Some(path) => AttuneConfig::load(path)?,
        None => AttuneConfig::default(),
    };
    if let Some(server) = cli.server {
        config.server.base_url = server;
    }
    if cli.no_adapt {
        config.adaptation.enabled = false;
    }

    info!(server = %config.server.base_url, "starting attune");

    let services = Services::new(&config, Arc::new(NullSurface), Arc::new(NullOverlay))?;
    services.start().await;

    if cli.capture {
        if let Err(e) = services.capture.start().await {
            warn!(error = %e, "capture could not start");
        }
    }

    tokio::signal::ctrl_c().await?;
    services.shutdown().await;
    Ok(())
}
