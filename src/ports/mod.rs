// Ports - Interface definitions (contracts)

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::domain::errors::DomainError;

/// Telemetry from one engine statistics line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineTelemetry {
    pub frame: u64,
    pub fps: Option<f64>,
    pub speed: Option<String>,
}

/// Event observed while an engine invocation runs.
///
/// A run yields zero or more `Duration`/`Progress` events and ends with
/// exactly one `Exited`.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Source duration announced in the input metadata, in seconds
    Duration(f64),
    /// Periodic statistics line
    Progress(EngineTelemetry),
    /// Process finished; `Err` carries the engine's diagnostic text
    Exited(Result<(), String>),
}

/// A running engine invocation, consumed once
pub struct EngineRun {
    events: mpsc::Receiver<EngineEvent>,
    finished: bool,
}

impl EngineRun {
    pub fn new(events: mpsc::Receiver<EngineEvent>) -> Self {
        Self {
            events,
            finished: false,
        }
    }

    /// Next event, or `None` once `Exited` has been yielded.
    ///
    /// A stream that closes without `Exited` yields a synthetic failure so
    /// callers always observe a terminal event.
    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        if self.finished {
            return None;
        }
        let event = match self.events.recv().await {
            Some(event) => event,
            None => EngineEvent::Exited(Err(
                "engine event stream closed before the process exited".to_string(),
            )),
        };
        if matches!(event, EngineEvent::Exited(_)) {
            self.finished = true;
        }
        Some(event)
    }
}

/// Port for the external transcoding engine
#[async_trait]
pub trait EnginePort: Send + Sync {
    /// Raw encoder listing, bounded by `timeout`
    async fn list_encoders(&self, timeout: Duration) -> Result<String, DomainError>;

    /// Start one invocation with the given argument vector
    async fn spawn(&self, args: Vec<String>) -> Result<EngineRun, DomainError>;
}

/// Progress event delivered to a client session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub percent: u8,
    pub stage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_frames: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
}

impl ProgressEvent {
    pub fn stage(percent: u8, stage: impl Into<String>) -> Self {
        Self {
            percent,
            stage: stage.into(),
            frame: None,
            total_frames: None,
            fps: None,
            speed: None,
        }
    }
}

/// Port for the real-time progress channel.
///
/// Fire-and-forget: implementations drop events nobody listens to.
pub trait ProgressSink: Send + Sync {
    fn publish(&self, session_id: &str, event: ProgressEvent);
}
