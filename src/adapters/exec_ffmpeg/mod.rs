//! FFmpeg execution adapter
//!
//! Runs the ffmpeg binary as a child process and turns its stderr into
//! [`EngineEvent`]s. ffmpeg rewrites its statistics line with carriage
//! returns, so stderr is split on both `\r` and `\n`.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::errors::DomainError;
use crate::ports::{EngineEvent, EnginePort, EngineRun, EngineTelemetry};
use crate::utils::time::parse_clock_duration;

/// Diagnostic lines kept for error reports
const DIAGNOSTIC_TAIL: usize = 20;
const EVENT_BUFFER: usize = 64;

/// FFmpeg-based execution adapter
pub struct FfmpegAdapter {
    binary: PathBuf,
}

impl FfmpegAdapter {
    /// Create new FFmpeg adapter for the given binary (name on PATH or full path)
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfmpegAdapter {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl EnginePort for FfmpegAdapter {
    async fn list_encoders(&self, timeout: Duration) -> Result<String, DomainError> {
        let query = Command::new(&self.binary)
            .args(["-hide_banner", "-encoders"])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(timeout, query)
            .await
            .map_err(|_| {
                DomainError::EngineUnavailable(format!(
                    "encoder query timed out after {:?}",
                    timeout
                ))
            })?
            .map_err(|e| {
                DomainError::EngineUnavailable(format!(
                    "failed to run {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(DomainError::EngineUnavailable(format!(
                "encoder query exited with {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn spawn(&self, args: Vec<String>) -> Result<EngineRun, DomainError> {
        debug!(binary = %self.binary.display(), ?args, "Spawning engine");

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                DomainError::EngineUnavailable(format!(
                    "failed to start {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        let stderr = child.stderr.take().ok_or_else(|| {
            DomainError::EngineUnavailable("engine stderr was not captured".to_string())
        })?;

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        tokio::spawn(async move {
            let diagnostics = pump_stderr(stderr, &tx).await;
            let exit = match child.wait().await {
                Ok(status) if status.success() => Ok(()),
                Ok(status) => Err(format!(
                    "ffmpeg exited with {}: {}",
                    status,
                    diagnostics.into_iter().collect::<Vec<_>>().join("\n")
                )),
                Err(e) => Err(format!("failed to wait for ffmpeg: {}", e)),
            };
            // The receiver may already be gone; nothing else to notify.
            let _ = tx.send(EngineEvent::Exited(exit)).await;
        });

        Ok(EngineRun::new(rx))
    }
}

/// Forward parsed stderr events and return the trailing diagnostic lines
async fn pump_stderr<R>(mut stderr: R, tx: &mpsc::Sender<EngineEvent>) -> VecDeque<String>
where
    R: AsyncRead + Unpin,
{
    let mut diagnostics = VecDeque::with_capacity(DIAGNOSTIC_TAIL);
    let mut pending = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let read = match stderr.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                warn!("Failed to read engine stderr: {}", e);
                break;
            }
        };

        for &byte in &chunk[..read] {
            if byte == b'\n' || byte == b'\r' {
                let line = String::from_utf8_lossy(&pending).trim().to_string();
                pending.clear();
                handle_line(line, tx, &mut diagnostics).await;
            } else {
                pending.push(byte);
            }
        }
    }

    if !pending.is_empty() {
        let line = String::from_utf8_lossy(&pending).trim().to_string();
        handle_line(line, tx, &mut diagnostics).await;
    }

    diagnostics
}

async fn handle_line(
    line: String,
    tx: &mpsc::Sender<EngineEvent>,
    diagnostics: &mut VecDeque<String>,
) {
    if line.is_empty() {
        return;
    }
    match parse_line(&line) {
        Some(event) => {
            let _ = tx.send(event).await;
        }
        None => {
            debug!("ffmpeg: {}", line);
            if diagnostics.len() == DIAGNOSTIC_TAIL {
                diagnostics.pop_front();
            }
            diagnostics.push_back(line);
        }
    }
}

/// Recognise the metadata duration line and statistics lines
pub fn parse_line(line: &str) -> Option<EngineEvent> {
    let trimmed = line.trim();

    if let Some(rest) = trimmed.strip_prefix("Duration:") {
        let value = rest.split(',').next()?.trim();
        return parse_clock_duration(value).map(EngineEvent::Duration);
    }

    if trimmed.starts_with("frame=") {
        let frame = extract_value(trimmed, "frame=")?.parse::<u64>().ok()?;
        let fps = extract_value(trimmed, "fps=").and_then(|v| v.parse::<f64>().ok());
        let speed = extract_value(trimmed, "speed=").filter(|v| v != "N/A");
        return Some(EngineEvent::Progress(EngineTelemetry { frame, fps, speed }));
    }

    None
}

/// Value following `key`, tolerating the padding ffmpeg puts after `=`
fn extract_value(line: &str, key: &str) -> Option<String> {
    let start = line.find(key)?;
    let after_key = &line[start + key.len()..];
    let value_part = after_key.trim_start();
    let end = value_part
        .find(char::is_whitespace)
        .unwrap_or(value_part.len());
    let value = &value_part[..end];
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
