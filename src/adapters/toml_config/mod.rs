// TOML config adapter - Layered configuration (file, environment, defaults)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::rules::{ExecutionPolicy, DEFAULT_BATCH_SIZE, DEFAULT_SINGLE_PASS_MAX_OVERLAYS};
use crate::engine::badge::DEFAULT_BADGE_SIZE;
use crate::engine::filter_graph::{DEFAULT_FONT_FILE, DEFAULT_INLINE_LIMIT};
use crate::error::{RenderError, RenderResult};

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "OVERLAY_RENDER_";

/// Complete runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub engine: EngineSettings,
    pub render: RenderSettings,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
}

/// `[engine]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// ffmpeg binary, name on PATH or full path
    pub ffmpeg_path: PathBuf,
    pub detection_timeout_secs: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            detection_timeout_secs: 5,
        }
    }
}

/// `[render]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub single_pass_max_overlays: usize,
    pub batch_size: usize,
    pub inline_filter_limit: usize,
    pub badge_size: u32,
    pub font_file: PathBuf,
    pub max_concurrent_jobs: usize,
    pub progress_throttle_ms: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            single_pass_max_overlays: DEFAULT_SINGLE_PASS_MAX_OVERLAYS,
            batch_size: DEFAULT_BATCH_SIZE,
            inline_filter_limit: DEFAULT_INLINE_LIMIT,
            badge_size: DEFAULT_BADGE_SIZE,
            font_file: PathBuf::from(DEFAULT_FONT_FILE),
            max_concurrent_jobs: (num_cpus::get() / 2).max(1),
            progress_throttle_ms: 500,
        }
    }
}

/// `[output]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Where rendered files are written
    pub output_dir: PathBuf,
    /// Badges, filter scripts and intermediate batch outputs
    pub scratch_dir: PathBuf,
    /// Prefix of the returned output URL
    pub public_base_url: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("rendered"),
            scratch_dir: std::env::temp_dir().join("overlay-render"),
            public_base_url: "/rendered".to_string(),
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. `info` or `overlay_render=debug`
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl RenderConfig {
    /// Defaults, overlaid by `path` when given, then by the process environment
    pub fn load(path: Option<&Path>) -> RenderResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(std::env::vars())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> RenderResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RenderError::Config {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_toml(&content).map_err(|e| RenderError::Config {
            message: format!("{}: {}", path.display(), e),
        })
    }

    pub fn from_toml(content: &str) -> RenderResult<Self> {
        toml::from_str(content).map_err(|e| RenderError::Config {
            message: format!("invalid TOML: {}", e),
        })
    }

    /// Apply `OVERLAY_RENDER_*` overrides; unrelated variables are ignored
    pub fn apply_env<I>(&mut self, vars: I) -> RenderResult<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "FFMPEG" => self.engine.ffmpeg_path = PathBuf::from(value),
                "DETECTION_TIMEOUT_SECS" => {
                    self.engine.detection_timeout_secs = parse_env(&key, &value)?
                }
                "SINGLE_PASS_MAX_OVERLAYS" => {
                    self.render.single_pass_max_overlays = parse_env(&key, &value)?
                }
                "BATCH_SIZE" => self.render.batch_size = parse_env(&key, &value)?,
                "INLINE_FILTER_LIMIT" => self.render.inline_filter_limit = parse_env(&key, &value)?,
                "FONT_FILE" => self.render.font_file = PathBuf::from(value),
                "MAX_JOBS" => self.render.max_concurrent_jobs = parse_env(&key, &value)?,
                "OUTPUT_DIR" => self.output.output_dir = PathBuf::from(value),
                "SCRATCH_DIR" => self.output.scratch_dir = PathBuf::from(value),
                "PUBLIC_URL" => self.output.public_base_url = value,
                "LOG_LEVEL" => self.logging.level = value,
                "JSON_LOGS" => self.logging.json = parse_env(&key, &value)?,
                _ => tracing::debug!(variable = %key, "Ignoring unknown configuration variable"),
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> RenderResult<()> {
        if self.render.batch_size == 0 {
            return Err(config_error("render.batch_size must be at least 1"));
        }
        if self.render.max_concurrent_jobs == 0 {
            return Err(config_error("render.max_concurrent_jobs must be at least 1"));
        }
        if self.render.badge_size == 0 {
            return Err(config_error("render.badge_size must be at least 1"));
        }
        Ok(())
    }

    pub fn execution_policy(&self) -> RenderResult<ExecutionPolicy> {
        Ok(ExecutionPolicy::new(
            self.render.single_pass_max_overlays,
            self.render.batch_size,
        )?)
    }

    pub fn detection_timeout(&self) -> Duration {
        Duration::from_secs(self.engine.detection_timeout_secs)
    }

    pub fn progress_throttle(&self) -> Duration {
        Duration::from_millis(self.render.progress_throttle_ms)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> RenderResult<T> {
    value.trim().parse().map_err(|_| RenderError::Config {
        message: format!("{} has an invalid value '{}'", key, value),
    })
}

fn config_error(message: &str) -> RenderError {
    RenderError::Config {
        message: message.to_string(),
    }
}
