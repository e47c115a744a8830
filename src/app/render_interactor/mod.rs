// Render interactor - Orchestrates one overlay rendering job

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::domain::model::*;
use crate::engine::badge::create_badge;
use crate::engine::executor::RenderExecutor;
use crate::engine::hardware::HardwareDetector;
use crate::engine::progress::ProgressTracker;
use crate::error::{RenderError, RenderResult};
use crate::ports::ProgressSink;
use crate::utils::path::{artifact_tag, is_video_path, remove_artifact, ArtifactPaths, VIDEO_EXTENSIONS};

/// Filesystem and progress settings of the orchestrator
#[derive(Debug, Clone)]
pub struct JobSettings {
    pub output_dir: PathBuf,
    pub scratch_dir: PathBuf,
    pub public_base_url: String,
    pub badge_size: u32,
    pub progress_throttle: Duration,
}

/// Interactor for the render use case
pub struct RenderInteractor {
    detector: Arc<HardwareDetector>,
    executor: Arc<RenderExecutor>,
    sink: Arc<dyn ProgressSink>,
    permits: Arc<Semaphore>,
    settings: JobSettings,
}

impl RenderInteractor {
    /// Create new render interactor; at most `max_concurrent_jobs` run at once
    pub fn new(
        detector: Arc<HardwareDetector>,
        executor: Arc<RenderExecutor>,
        sink: Arc<dyn ProgressSink>,
        max_concurrent_jobs: usize,
        settings: JobSettings,
    ) -> Self {
        Self {
            detector,
            executor,
            sink,
            permits: Arc::new(Semaphore::new(max_concurrent_jobs.max(1))),
            settings,
        }
    }

    /// Jobs that could start right now without waiting
    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run one job to completion.
    ///
    /// Whatever the outcome, the badge and a temporary input are removed;
    /// on failure the partial output is removed too.
    pub async fn run(&self, request: RenderRequest) -> RenderResult<RenderResponse> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| RenderError::EngineFailed {
                message: "render worker pool is closed".to_string(),
            })?;

        let paths = ArtifactPaths::new(
            &self.settings.scratch_dir,
            &self.settings.output_dir,
            artifact_tag(),
        );
        let tracker = ProgressTracker::new(
            Arc::clone(&self.sink),
            request.session_id.clone(),
            self.settings.progress_throttle,
        );
        info!(
            job = %paths.tag(),
            session = %request.session_id,
            input = %request.input.display(),
            overlays = request.overlays.len(),
            "Render job accepted"
        );

        let input = request.input.clone();
        let input_is_temporary = request.input_is_temporary;
        let result = self.render(request, &paths, &tracker).await;

        remove_artifact(&paths.badge()).await;
        if input_is_temporary {
            remove_artifact(&input).await;
        }

        match result {
            Ok(response) => {
                info!(
                    job = %paths.tag(),
                    output = %response.output_path.display(),
                    mode = ?response.mode,
                    "Render job completed"
                );
                Ok(response)
            }
            Err(e) => {
                remove_artifact(&paths.output()).await;
                error!(job = %paths.tag(), session = %tracker.session_id(), "Render job failed: {}", e);
                Err(e)
            }
        }
    }

    async fn render(
        &self,
        request: RenderRequest,
        paths: &ArtifactPaths,
        tracker: &ProgressTracker,
    ) -> RenderResult<RenderResponse> {
        validate_input(&request.input).await?;
        let overlays = parse_overlays(request.overlays)?;

        tokio::fs::create_dir_all(&self.settings.scratch_dir).await?;
        tokio::fs::create_dir_all(&self.settings.output_dir).await?;

        let capability = self.detector.detect().await;
        tracker.start();

        let badge_path = if overlays.iter().any(OverlaySpec::is_timer) {
            let path = paths.badge();
            create_badge(&path, self.settings.badge_size)?;
            Some(path)
        } else {
            None
        };

        let job = RenderJob {
            tag: paths.tag().to_string(),
            input_path: request.input,
            output_path: paths.output(),
            overlays,
            session_id: request.session_id,
            capability,
            badge_path,
            scratch_dir: paths.scratch_dir().to_path_buf(),
        };

        let mode = self.executor.execute(&job, tracker).await?;
        tracker.finish();

        Ok(RenderResponse {
            output_url: output_url(&self.settings.public_base_url, &job.output_path),
            output_path: job.output_path,
            mode,
            hardware: capability,
            metadata: request.metadata,
        })
    }
}

/// The input must be an existing regular file with a video extension
async fn validate_input(input: &Path) -> RenderResult<()> {
    let metadata = tokio::fs::metadata(input)
        .await
        .map_err(|e| RenderError::InvalidInput {
            message: format!("cannot read input {}: {}", input.display(), e),
        })?;
    if !metadata.is_file() {
        return Err(RenderError::InvalidInput {
            message: format!("input {} is not a file", input.display()),
        });
    }
    if !is_video_path(input) {
        return Err(RenderError::InvalidInput {
            message: format!(
                "input {} is not a video (expected one of: {})",
                input.display(),
                VIDEO_EXTENSIONS.join(", ")
            ),
        });
    }
    Ok(())
}

fn output_url(base: &str, output: &Path) -> String {
    let file_name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}/{}", base.trim_end_matches('/'), file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_url_joins_once() {
        let output = Path::new("/srv/rendered/rendered_1.mp4");
        assert_eq!(output_url("/rendered", output), "/rendered/rendered_1.mp4");
        assert_eq!(
            output_url("https://cdn.example.com/v/", output),
            "https://cdn.example.com/v/rendered_1.mp4"
        );
    }

    #[tokio::test]
    async fn test_validate_input() {
        let dir = tempfile::TempDir::new().unwrap();
        let video = dir.path().join("clip.mp4");
        let text = dir.path().join("notes.txt");
        std::fs::write(&video, b"video").unwrap();
        std::fs::write(&text, b"text").unwrap();

        assert!(validate_input(&video).await.is_ok());
        assert!(matches!(
            validate_input(&text).await,
            Err(RenderError::InvalidInput { .. })
        ));
        assert!(validate_input(&dir.path().join("missing.mp4")).await.is_err());
        assert!(validate_input(dir.path()).await.is_err());
    }
}
