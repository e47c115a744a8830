//! Single-pass and batched rendering strategies

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::model::{ExecutionMode, HardwareKind, RenderJob};
use crate::domain::rules::{
    estimate_total_frames, frame_percent, weighted_batch_percent, ExecutionPolicy, PlannedMode,
};
use crate::engine::command::{FfmpegCommand, FilterSource};
use crate::engine::encoder::EncoderProfile;
use crate::engine::filter_graph::FilterGraphCompiler;
use crate::engine::progress::{batch_stage, ProgressTracker, STAGE_RENDERING};
use crate::error::{RenderError, RenderResult};
use crate::ports::{EngineEvent, EnginePort, ProgressEvent};
use crate::utils::path::{filter_script_path, intermediate_path, remove_artifact};
use crate::utils::time::format_seconds;

/// Invocation number used for the single-pass filter script
const SINGLE_PASS: usize = 0;

/// One engine invocation within a job
struct Pass<'a> {
    number: usize,
    overlays: Range<usize>,
    input: &'a Path,
    output: &'a Path,
    /// `(index, total)` when part of a batched run
    batch: Option<(usize, usize)>,
}

/// Runs a job through the engine, choosing the strategy from the overlay count
pub struct RenderExecutor {
    engine: Arc<dyn EnginePort>,
    compiler: FilterGraphCompiler,
    policy: ExecutionPolicy,
}

impl RenderExecutor {
    pub fn new(engine: Arc<dyn EnginePort>, compiler: FilterGraphCompiler, policy: ExecutionPolicy) -> Self {
        Self {
            engine,
            compiler,
            policy,
        }
    }

    /// Render `job.overlays` onto `job.input_path`, writing `job.output_path`.
    ///
    /// Single-pass failures fall back to batches; batch failures are final.
    pub async fn execute(&self, job: &RenderJob, tracker: &ProgressTracker) -> RenderResult<ExecutionMode> {
        let kind = if job.capability.available {
            job.capability.kind
        } else {
            HardwareKind::None
        };
        let profile = EncoderProfile::for_kind(kind);

        match self.policy.plan(job.overlays.len()) {
            PlannedMode::SinglePassFirst => {
                let pass = Pass {
                    number: SINGLE_PASS,
                    overlays: 0..job.overlays.len(),
                    input: &job.input_path,
                    output: &job.output_path,
                    batch: None,
                };
                match self.run_pass(job, pass, &profile, tracker).await {
                    Ok(()) => {
                        info!(job = %job.tag, overlays = job.overlays.len(), "Single-pass render finished");
                        Ok(ExecutionMode::SinglePass)
                    }
                    Err(RenderError::EngineFailed { message }) => {
                        warn!(job = %job.tag, "Single-pass render failed, retrying in batches: {}", message);
                        remove_artifact(&job.output_path).await;
                        self.run_batched(job, &profile, tracker).await
                    }
                    Err(e) => Err(e),
                }
            }
            PlannedMode::BatchedOnly => {
                info!(
                    job = %job.tag,
                    overlays = job.overlays.len(),
                    limit = self.policy.single_pass_max_overlays,
                    "Too many overlays for one pass, rendering in batches"
                );
                self.run_batched(job, &profile, tracker).await
            }
        }
    }

    async fn run_batched(
        &self,
        job: &RenderJob,
        profile: &EncoderProfile,
        tracker: &ProgressTracker,
    ) -> RenderResult<ExecutionMode> {
        let ranges = self.policy.batch_ranges(job.overlays.len());
        let total = ranges.len();
        let mut input = job.input_path.clone();
        let mut previous: Option<PathBuf> = None;

        for (i, range) in ranges.into_iter().enumerate() {
            let index = i + 1;
            let last = index == total;
            let output = if last {
                job.output_path.clone()
            } else {
                intermediate_path(&job.scratch_dir, &job.tag, index)
            };

            debug!(job = %job.tag, batch = index, total, overlays = ?range, "Starting batch");
            let pass = Pass {
                number: index,
                overlays: range,
                input: &input,
                output: &output,
                batch: Some((index, total)),
            };
            let result = self.run_pass(job, pass, profile, tracker).await;

            // the intermediate this batch read from is no longer needed
            if let Some(consumed) = previous.take() {
                remove_artifact(&consumed).await;
            }
            if let Err(e) = result {
                if !last {
                    remove_artifact(&output).await;
                }
                warn!(job = %job.tag, batch = index, total, "Batch failed: {}", e);
                return Err(e);
            }

            if !last {
                previous = Some(output.clone());
                input = output;
            }
        }

        info!(job = %job.tag, batches = total, "Batched render finished");
        Ok(ExecutionMode::Batched { batches: total })
    }

    async fn run_pass(
        &self,
        job: &RenderJob,
        pass: Pass<'_>,
        profile: &EncoderProfile,
        tracker: &ProgressTracker,
    ) -> RenderResult<()> {
        let plan = self.compiler.compile(
            &job.overlays[pass.overlays.clone()],
            job.badge_path.as_deref(),
            profile.kind,
        )?;

        let script = if plan.needs_script_file {
            let path = filter_script_path(&job.scratch_dir, &job.tag, pass.number);
            tokio::fs::write(&path, plan.expression()).await?;
            debug!(job = %job.tag, path = %path.display(), "Filter graph written to script file");
            Some(path)
        } else {
            None
        };
        let filter = match &script {
            Some(path) => FilterSource::Script(path.clone()),
            None => FilterSource::Inline(plan.expression()),
        };

        let command = FfmpegCommand::new(pass.input, filter, profile.clone(), pass.output)
            .with_auxiliary_inputs(plan.aux_paths());
        let result = self.invoke(command.build(), pass.batch, tracker).await;

        if let Some(path) = script {
            remove_artifact(&path).await;
        }
        result
    }

    /// Spawn the engine and forward its progress until it exits
    async fn invoke(
        &self,
        args: Vec<String>,
        batch: Option<(usize, usize)>,
        tracker: &ProgressTracker,
    ) -> RenderResult<()> {
        let mut run = self
            .engine
            .spawn(args)
            .await
            .map_err(|e| RenderError::EngineFailed {
                message: e.to_string(),
            })?;

        let stage = match batch {
            Some((index, total)) => batch_stage(index, total),
            None => STAGE_RENDERING.to_string(),
        };
        let mut total_frames = 0;

        while let Some(event) = run.next_event().await {
            match event {
                // later inputs (the badge) announce their own durations
                EngineEvent::Duration(seconds) if total_frames == 0 => {
                    total_frames = estimate_total_frames(seconds);
                    debug!(duration = %format_seconds(seconds), total_frames, "Source duration");
                }
                EngineEvent::Duration(_) => {}
                EngineEvent::Progress(telemetry) => {
                    let pass_percent = frame_percent(telemetry.frame, total_frames);
                    let percent = match batch {
                        Some((index, total)) => weighted_batch_percent(index, total, pass_percent),
                        None => pass_percent,
                    };
                    tracker.report(ProgressEvent {
                        percent,
                        stage: stage.clone(),
                        frame: Some(telemetry.frame),
                        total_frames: (total_frames > 0).then_some(total_frames),
                        fps: telemetry.fps,
                        speed: telemetry.speed,
                    });
                }
                EngineEvent::Exited(Ok(())) => return Ok(()),
                EngineEvent::Exited(Err(message)) => {
                    return Err(RenderError::EngineFailed { message });
                }
            }
        }

        Err(RenderError::EngineFailed {
            message: "engine stopped without an exit status".to_string(),
        })
    }
}
