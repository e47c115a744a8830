// Domain rules - Execution policy and progress arithmetic

use std::ops::Range;

use crate::domain::errors::DomainError;

/// Overlay count above which single-pass is not attempted
pub const DEFAULT_SINGLE_PASS_MAX_OVERLAYS: usize = 100;
/// Overlays per batched invocation
pub const DEFAULT_BATCH_SIZE: usize = 32;
/// Frame rate assumed when converting duration to a frame estimate
pub const NOMINAL_FPS: f64 = 30.0;
/// Highest percent reported before the explicit completion event
pub const MAX_RUNNING_PERCENT: u8 = 99;

/// First strategy to try for a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedMode {
    /// Single-pass, falling back to batches on engine failure
    SinglePassFirst,
    /// Too many overlays for one graph; batch straight away
    BatchedOnly,
}

/// Chooses between single-pass and batched rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionPolicy {
    pub single_pass_max_overlays: usize,
    pub batch_size: usize,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self {
            single_pass_max_overlays: DEFAULT_SINGLE_PASS_MAX_OVERLAYS,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ExecutionPolicy {
    pub fn new(single_pass_max_overlays: usize, batch_size: usize) -> Result<Self, DomainError> {
        if batch_size == 0 {
            return Err(DomainError::BadArgs("batch size must be at least 1".to_string()));
        }
        Ok(Self {
            single_pass_max_overlays,
            batch_size,
        })
    }

    pub fn plan(&self, overlay_count: usize) -> PlannedMode {
        if overlay_count <= self.single_pass_max_overlays {
            PlannedMode::SinglePassFirst
        } else {
            PlannedMode::BatchedOnly
        }
    }

    /// Contiguous index ranges of each batch, in order
    pub fn batch_ranges(&self, overlay_count: usize) -> Vec<Range<usize>> {
        (0..overlay_count)
            .step_by(self.batch_size)
            .map(|start| start..(start + self.batch_size).min(overlay_count))
            .collect()
    }
}

/// Frame estimate for a source of `duration_secs` at [`NOMINAL_FPS`]
pub fn estimate_total_frames(duration_secs: f64) -> u64 {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return 0;
    }
    (duration_secs * NOMINAL_FPS).round() as u64
}

/// Percent of one invocation, capped below 100
pub fn frame_percent(frame: u64, total_frames: u64) -> u8 {
    if total_frames == 0 {
        return 0;
    }
    let percent = (frame as f64 / total_frames as f64 * 100.0).round();
    percent.min(MAX_RUNNING_PERCENT as f64) as u8
}

/// Job percent while running batch `batch_index` (1-based) of `total_batches`
pub fn weighted_batch_percent(batch_index: usize, total_batches: usize, batch_percent: u8) -> u8 {
    if total_batches == 0 {
        return 0;
    }
    let done = (batch_index.saturating_sub(1)) as f64 / total_batches as f64 * 100.0;
    let current = batch_percent as f64 / total_batches as f64;
    (done + current).round().min(MAX_RUNNING_PERCENT as f64) as u8
}

#[cfg(test)]
mod tests;
