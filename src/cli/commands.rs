//! Command implementations

use std::path::Path;

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::adapters::toml_config::RenderConfig;
use crate::app::{AppContainer, DefaultAppContainer};
use crate::cli::args::{BadgeArgs, RenderArgs};
use crate::domain::model::{OverlayRequest, RenderRequest};
use crate::engine::badge::create_badge;

/// Execute the render command
pub async fn render(args: RenderArgs, config: &RenderConfig) -> Result<()> {
    let overlays = load_overlays(&args.overlays)?;
    let metadata = args
        .metadata
        .as_deref()
        .map(|raw| serde_json::from_str::<serde_json::Value>(raw))
        .transpose()
        .context("--metadata is not valid JSON")?;

    let container = DefaultAppContainer::new(config).context("Failed to initialise renderer")?;

    let mut progress = container.session_bus().subscribe(&args.session);
    let reporter = tokio::spawn(async move {
        loop {
            match progress.recv().await {
                Ok(event) => {
                    info!(percent = event.percent, stage = %event.stage, fps = ?event.fps, speed = ?event.speed, "Progress");
                    if event.percent >= 100 {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Progress reporter lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let request = RenderRequest {
        input: args.input,
        input_is_temporary: args.temporary,
        overlays,
        session_id: args.session,
        metadata,
    };
    let result = container.render_interactor().run(request).await;
    if result.is_err() {
        reporter.abort();
    } else if let Err(e) = reporter.await {
        warn!("Progress reporter stopped abnormally: {}", e);
    }

    let response = result.context("Render failed")?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Execute the detect command
pub async fn detect(config: &RenderConfig) -> Result<()> {
    let container = DefaultAppContainer::new(config).context("Failed to initialise renderer")?;
    let capability = container.hardware_detector().detect().await;
    println!("{}", serde_json::to_string(&capability)?);
    Ok(())
}

/// Execute the badge command
pub fn badge(args: BadgeArgs) -> Result<()> {
    create_badge(&args.output, args.size)
        .with_context(|| format!("Failed to write badge to {}", args.output.display()))?;
    info!(path = %args.output.display(), size = args.size, "Badge written");
    Ok(())
}

/// Inline JSON when the value looks like an array, otherwise a file path
fn load_overlays(value: &str) -> Result<Vec<OverlayRequest>> {
    let json = if value.trim_start().starts_with('[') {
        value.to_string()
    } else {
        std::fs::read_to_string(Path::new(value))
            .with_context(|| format!("Failed to read overlay file {}", value))?
    };
    serde_json::from_str(&json).context("Overlay list is not valid JSON")
}
