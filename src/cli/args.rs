//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;
use clap_num::number_range;

use crate::engine::badge::DEFAULT_BADGE_SIZE;

/// Arguments for the render command
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Overlay list: inline JSON array, or a path to a JSON file
    #[arg(short, long)]
    pub overlays: String,

    /// Session receiving progress events
    #[arg(short, long, default_value = "cli")]
    pub session: String,

    /// Delete the input once the job finishes
    #[arg(long)]
    pub temporary: bool,

    /// Overlays per batched pass (1-1000)
    #[arg(long, value_parser = batch_size_range)]
    pub batch_size: Option<usize>,

    /// Opaque JSON returned unchanged in the result
    #[arg(long)]
    pub metadata: Option<String>,
}

/// Arguments for the badge command
#[derive(Args, Debug)]
pub struct BadgeArgs {
    /// Output PNG path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Edge length in pixels (16-1024)
    #[arg(long, default_value_t = DEFAULT_BADGE_SIZE, value_parser = badge_size_range)]
    pub size: u32,
}

fn batch_size_range(s: &str) -> Result<usize, String> {
    number_range(s, 1, 1000)
}

fn badge_size_range(s: &str) -> Result<u32, String> {
    number_range(s, 16, 1024)
}
