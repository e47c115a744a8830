//! Per-job progress throttling

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use crate::ports::{ProgressEvent, ProgressSink};

/// Minimum spacing between running updates
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(500);

pub const STAGE_STARTING: &str = "starting";
pub const STAGE_RENDERING: &str = "rendering";
pub const STAGE_COMPLETED: &str = "completed";

/// Stage name while batch `index` of `total` runs
pub fn batch_stage(index: usize, total: usize) -> String {
    format!("batch {}/{}", index, total)
}

/// Forwards one job's progress to its session.
///
/// Running updates are rate limited and never go backwards. The start (0%)
/// and completion (100%) events bypass the throttle.
pub struct ProgressTracker {
    sink: Arc<dyn ProgressSink>,
    session_id: String,
    throttle: Duration,
    state: Mutex<TrackerState>,
}

#[derive(Default)]
struct TrackerState {
    last_percent: u8,
    last_emit: Option<Instant>,
}

impl ProgressTracker {
    pub fn new(sink: Arc<dyn ProgressSink>, session_id: impl Into<String>, throttle: Duration) -> Self {
        Self {
            sink,
            session_id: session_id.into(),
            throttle,
            state: Mutex::new(TrackerState::default()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Mandatory 0% event
    pub fn start(&self) {
        self.force(ProgressEvent::stage(0, STAGE_STARTING));
    }

    /// Mandatory 100% event
    pub fn finish(&self) {
        self.force(ProgressEvent::stage(100, STAGE_COMPLETED));
    }

    /// Offer a running update; returns whether it was published
    pub fn report(&self, event: ProgressEvent) -> bool {
        let now = Instant::now();
        {
            let mut state = match self.state.lock() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            if event.percent < state.last_percent {
                return false;
            }
            if let Some(last) = state.last_emit {
                if now.duration_since(last) < self.throttle {
                    return false;
                }
            }
            state.last_percent = event.percent;
            state.last_emit = Some(now);
        }
        self.sink.publish(&self.session_id, event);
        true
    }

    /// Highest percent published so far
    pub fn last_percent(&self) -> u8 {
        match self.state.lock() {
            Ok(state) => state.last_percent,
            Err(poisoned) => poisoned.into_inner().last_percent,
        }
    }

    fn force(&self, event: ProgressEvent) {
        {
            let mut state = match self.state.lock() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            state.last_percent = state.last_percent.max(event.percent);
            state.last_emit = Some(Instant::now());
        }
        self.sink.publish(&self.session_id, event);
    }
}
