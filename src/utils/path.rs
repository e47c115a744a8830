//! Artifact naming and removal helpers

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tracing::{debug, warn};

/// Containers accepted as job input
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "webm", "avi", "m4v"];

static ARTIFACT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Unique suffix for one job's artifacts: millisecond timestamp plus a
/// process-wide sequence, so jobs started in the same millisecond differ.
pub fn artifact_tag() -> String {
    let sequence = ARTIFACT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}_{:04}", Utc::now().format("%Y%m%d%H%M%S%3f"), sequence)
}

/// Check the extension against [`VIDEO_EXTENSIONS`]
pub fn is_video_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// Naming scheme for everything a job writes
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    scratch_dir: PathBuf,
    output_dir: PathBuf,
    tag: String,
}

impl ArtifactPaths {
    pub fn new(scratch_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, tag: impl Into<String>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            output_dir: output_dir.into(),
            tag: tag.into(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn badge(&self) -> PathBuf {
        self.scratch_dir.join(format!("badge_{}.png", self.tag))
    }

    pub fn output(&self) -> PathBuf {
        self.output_dir.join(format!("rendered_{}.mp4", self.tag))
    }
}

/// Scratch filter script for one invocation of a job
pub fn filter_script_path(scratch_dir: &Path, tag: &str, pass: usize) -> PathBuf {
    scratch_dir.join(format!("filter_{}_{}.txt", tag, pass))
}

/// Intermediate output of batch `batch` (1-based) of a job
pub fn intermediate_path(scratch_dir: &Path, tag: &str, batch: usize) -> PathBuf {
    scratch_dir.join(format!("batch_{}_{}.mp4", tag, batch))
}

/// Remove a job artifact. Missing files count as removed; other failures are
/// logged and reported as `false`, never raised.
pub async fn remove_artifact(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "Removed artifact");
            true
        }
        Err(e) if e.kind() == ErrorKind::NotFound => true,
        Err(e) => {
            warn!(path = %path.display(), "Failed to remove artifact: {}", e);
            false
        }
    }
}
