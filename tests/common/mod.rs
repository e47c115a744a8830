//! Scripted engine and fixtures shared by the integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use walkdir::WalkDir;

use overlay_render::adapters::RenderConfig;
use overlay_render::ports::{EngineEvent, EnginePort, EngineRun, EngineTelemetry};
use overlay_render::{DomainError, OverlayRequest};

/// How the fake answers the encoder query
pub enum Encoders {
    Listing(String),
    /// Never answers; the caller's timeout expires
    Hang,
}

/// One recorded engine invocation
#[derive(Debug, Clone)]
pub struct Invocation {
    pub args: Vec<String>,
    /// Intermediate batch files present in the scratch dir at spawn time
    pub intermediates: Vec<PathBuf>,
    /// Filter script content, when the graph was passed as a file
    pub script: Option<String>,
}

impl Invocation {
    pub fn inputs(&self) -> Vec<String> {
        self.args
            .windows(2)
            .filter(|w| w[0] == "-i")
            .map(|w| w[1].clone())
            .collect()
    }

    pub fn output(&self) -> String {
        self.args.last().cloned().unwrap_or_default()
    }

    pub fn value_of(&self, flag: &str) -> Option<String> {
        self.args
            .windows(2)
            .find(|w| w[0] == flag)
            .map(|w| w[1].clone())
    }

    /// Graph text, inline or from the script file
    pub fn graph(&self) -> String {
        self.value_of("-filter_complex")
            .or_else(|| self.script.clone())
            .unwrap_or_default()
    }
}

/// Engine double: records arguments, writes the output file and replays a
/// short stats sequence. Invocations listed in `failing` exit with an error.
pub struct FakeEngine {
    encoders: Encoders,
    failing: HashSet<usize>,
    scratch_dir: PathBuf,
    invocations: Mutex<Vec<Invocation>>,
}

impl FakeEngine {
    pub fn new(encoders: Encoders, scratch_dir: &Path) -> Self {
        Self {
            encoders,
            failing: HashSet::new(),
            scratch_dir: scratch_dir.to_path_buf(),
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn software(scratch_dir: &Path) -> Self {
        Self::new(Encoders::Listing(" V....D libx264  H.264".to_string()), scratch_dir)
    }

    pub fn failing_on(mut self, invocations: &[usize]) -> Self {
        self.failing.extend(invocations.iter().copied());
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl EnginePort for FakeEngine {
    async fn list_encoders(&self, timeout: Duration) -> Result<String, DomainError> {
        match &self.encoders {
            Encoders::Listing(listing) => Ok(listing.clone()),
            Encoders::Hang => {
                tokio::time::sleep(timeout).await;
                Err(DomainError::EngineUnavailable("encoder query timed out".to_string()))
            }
        }
    }

    async fn spawn(&self, args: Vec<String>) -> Result<EngineRun, DomainError> {
        let intermediates = intermediate_files(&self.scratch_dir);
        let script = args
            .windows(2)
            .find(|w| w[0] == "-filter_complex_script")
            .map(|w| std::fs::read_to_string(&w[1]).unwrap());

        let index = {
            let mut invocations = self.invocations.lock().unwrap();
            invocations.push(Invocation {
                args: args.clone(),
                intermediates,
                script,
            });
            invocations.len() - 1
        };

        let (tx, rx) = mpsc::channel(16);
        tx.try_send(EngineEvent::Duration(10.0)).unwrap();
        tx.try_send(EngineEvent::Progress(EngineTelemetry {
            frame: 150,
            fps: Some(120.0),
            speed: Some("4.0x".to_string()),
        }))
        .unwrap();

        if self.failing.contains(&index) {
            tx.try_send(EngineEvent::Exited(Err(
                "Error reinitializing filters!\nConversion failed!".to_string(),
            )))
            .unwrap();
        } else {
            let output = args.last().unwrap();
            std::fs::write(output, b"rendered").unwrap();
            tx.try_send(EngineEvent::Progress(EngineTelemetry {
                frame: 300,
                fps: Some(120.0),
                speed: Some("4.0x".to_string()),
            }))
            .unwrap();
            tx.try_send(EngineEvent::Exited(Ok(()))).unwrap();
        }

        Ok(EngineRun::new(rx))
    }
}

/// Intermediate batch outputs currently in `dir`
pub fn intermediate_files(dir: &Path) -> Vec<PathBuf> {
    files_in(dir)
        .into_iter()
        .filter(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().starts_with("batch_"))
                .unwrap_or(false)
        })
        .collect()
}

/// Every regular file under `dir`
pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        return Vec::new();
    }
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

/// Configuration rooted in a temporary directory
pub fn test_config(root: &Path) -> RenderConfig {
    let mut config = RenderConfig::default();
    config.output.output_dir = root.join("out");
    config.output.scratch_dir = root.join("scratch");
    config.output.public_base_url = "https://cdn.example.com/rendered".to_string();
    config.engine.detection_timeout_secs = 1;
    config.render.progress_throttle_ms = 0;
    config.render.max_concurrent_jobs = 2;
    config
}

pub fn write_input(root: &Path, name: &str) -> PathBuf {
    let path = root.join(name);
    std::fs::write(&path, b"source video").unwrap();
    path
}

pub fn text_overlay(index: usize) -> OverlayRequest {
    OverlayRequest {
        kind: "text".to_string(),
        start_time: index as f64,
        end_time: index as f64 + 2.0,
        x: 50.0,
        y: 80.0,
        font_size: None,
        font_color: None,
        background_color: None,
        timer_type: None,
        timer_format: None,
        text: Some(format!("Rep {}", index)),
    }
}

pub fn timer_overlay(timer_type: &str, timer_format: &str) -> OverlayRequest {
    OverlayRequest {
        kind: "timer".to_string(),
        start_time: 10.0,
        end_time: 70.0,
        x: 85.0,
        y: 5.0,
        font_size: Some(32),
        font_color: None,
        background_color: None,
        timer_type: Some(timer_type.to_string()),
        timer_format: Some(timer_format.to_string()),
        text: Some("Plank".to_string()),
    }
}
