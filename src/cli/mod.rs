//! CLI module for overlay-render
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::adapters::toml_config::RenderConfig;

pub mod args;
pub mod commands;

pub use args::{BadgeArgs, RenderArgs};

/// Overlay renderer
///
/// Burns time-coded captions and timer badges into a video with ffmpeg,
/// using a hardware encoder when one is available.
#[derive(Parser, Debug)]
#[command(name = "overlay-render")]
#[command(about = "Render caption and timer overlays onto video")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "OVERLAY_RENDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level or filter directive (overrides the configuration)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// ffmpeg binary to drive (overrides the configuration)
    #[arg(long, global = true)]
    pub ffmpeg: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render overlays onto a video
    Render(RenderArgs),
    /// Print the detected hardware encoder as JSON
    Detect,
    /// Write a timer badge image
    Badge(BadgeArgs),
}

impl Cli {
    /// Command-line flags take precedence over every other source
    pub fn apply_overrides(&self, config: &mut RenderConfig) {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json_logs {
            config.logging.json = true;
        }
        if let Some(ffmpeg) = &self.ffmpeg {
            config.engine.ffmpeg_path = ffmpeg.clone();
        }
        if let Commands::Render(args) = &self.command {
            if let Some(batch_size) = args.batch_size {
                config.render.batch_size = batch_size;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::parse_from([
            "overlay-render",
            "--ffmpeg",
            "/opt/ffmpeg/bin/ffmpeg",
            "--json-logs",
            "render",
            "--input",
            "in.mp4",
            "--overlays",
            "[]",
            "--batch-size",
            "4",
        ]);
        let mut config = RenderConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.engine.ffmpeg_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert!(config.logging.json);
        assert_eq!(config.render.batch_size, 4);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_batch_size_must_be_positive() {
        let parsed = Cli::try_parse_from([
            "overlay-render",
            "render",
            "--input",
            "in.mp4",
            "--overlays",
            "[]",
            "--batch-size",
            "0",
        ]);
        assert!(parsed.is_err());
    }
}
