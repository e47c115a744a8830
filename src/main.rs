//! overlay-render
//!
//! Command-line front end of the overlay rendering pipeline.
//!
//! # Usage
//!
//! ```bash
//! overlay-render render --input workout.mp4 --overlays overlays.json --session abc123
//! overlay-render detect
//! overlay-render badge --output badge.png --size 120
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use overlay_render::adapters::tracing_log::init_tracing;
use overlay_render::adapters::RenderConfig;
use overlay_render::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RenderConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    init_tracing(&config.logging);
    debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Render(args) => {
            info!("Executing render command");
            commands::render(args, &config).await?;
        }
        Commands::Detect => {
            commands::detect(&config).await?;
        }
        Commands::Badge(args) => {
            commands::badge(args)?;
        }
    }

    Ok(())
}
