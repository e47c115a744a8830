// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Default caption font size in pixels
pub const DEFAULT_FONT_SIZE: u32 = 24;
/// Default caption colour
pub const DEFAULT_FONT_COLOR: &str = "white";
/// Default caption box colour
pub const DEFAULT_BACKGROUND_COLOR: &str = "black@0.5";

/// Overlay as received from the job submission layer (JSON-shaped).
///
/// Every field except the discriminator and window is optional; missing style
/// values fall back to the defaults above during conversion to [`OverlaySpec`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverlayRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub start_time: f64,
    pub end_time: f64,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Direction a timer counts in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerType {
    /// Counts up from the overlay start
    Elapsed,
    /// Counts down to the overlay end
    Countdown,
}

impl TimerType {
    /// Parse the wire name
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_lowercase().as_str() {
            "elapsed" => Ok(TimerType::Elapsed),
            "countdown" => Ok(TimerType::Countdown),
            other => Err(DomainError::UnknownOverlayKind(format!(
                "timer type '{}'",
                other
            ))),
        }
    }
}

/// How the live timer value is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerFormat {
    /// Zero-padded `MM:SS`
    #[serde(rename = "MM:SS")]
    MinutesSeconds,
    /// Whole seconds
    #[serde(rename = "seconds")]
    Seconds,
}

impl TimerFormat {
    /// Parse the wire name
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim() {
            "MM:SS" | "mm:ss" => Ok(TimerFormat::MinutesSeconds),
            "seconds" | "SECONDS" | "ss" => Ok(TimerFormat::Seconds),
            other => Err(DomainError::UnknownOverlayKind(format!(
                "timer format '{}'",
                other
            ))),
        }
    }
}

/// Visibility window of an overlay, in seconds of source time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    /// Create a window, rejecting empty, negative or non-finite ranges
    pub fn new(start: f64, end: f64) -> Result<Self, DomainError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(DomainError::InvalidTimeRange(
                "overlay times must be finite".to_string(),
            ));
        }
        if start < 0.0 {
            return Err(DomainError::InvalidTimeRange(format!(
                "start time {} cannot be negative",
                start
            )));
        }
        if start >= end {
            return Err(DomainError::InvalidTimeRange(format!(
                "start ({}) must be less than end ({})",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Window length in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Position as percentages of frame width and height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Result<Self, DomainError> {
        for (axis, value) in [("x", x), ("y", y)] {
            if !(0.0..=100.0).contains(&value) {
                return Err(DomainError::ValidationFailed(format!(
                    "position {} = {} is outside 0-100",
                    axis, value
                )));
            }
        }
        Ok(Self { x, y })
    }
}

/// Font and box styling shared by both overlay kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_size: u32,
    pub font_color: String,
    pub background_color: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            font_color: DEFAULT_FONT_COLOR.to_string(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
        }
    }
}

/// Caption overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOverlay {
    pub text: String,
    pub window: TimeWindow,
    pub position: Position,
    pub style: TextStyle,
}

/// Timer badge overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerOverlay {
    pub label: String,
    pub timer_type: TimerType,
    pub timer_format: TimerFormat,
    pub window: TimeWindow,
    pub position: Position,
    pub style: TextStyle,
}

impl TimerOverlay {
    /// Whole seconds the timer shows at source time `t`.
    ///
    /// Matches the expression the engine evaluates per frame inside the
    /// window. Outside it the overlay is hidden and the value clamps at zero.
    pub fn seconds_at(&self, t: f64) -> u64 {
        let raw = match self.timer_type {
            TimerType::Elapsed => t - self.window.start,
            TimerType::Countdown => self.window.end - t,
        };
        raw.max(0.0).floor() as u64
    }

    /// Text the timer shows at source time `t`
    pub fn display_at(&self, t: f64) -> String {
        let seconds = self.seconds_at(t);
        match self.timer_format {
            TimerFormat::MinutesSeconds => format!("{:02}:{:02}", seconds / 60, seconds % 60),
            TimerFormat::Seconds => seconds.to_string(),
        }
    }
}

/// One visual annotation; list order is compositing order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverlaySpec {
    Text(TextOverlay),
    Timer(TimerOverlay),
}

impl OverlaySpec {
    pub fn window(&self) -> &TimeWindow {
        match self {
            OverlaySpec::Text(text) => &text.window,
            OverlaySpec::Timer(timer) => &timer.window,
        }
    }

    pub fn position(&self) -> &Position {
        match self {
            OverlaySpec::Text(text) => &text.position,
            OverlaySpec::Timer(timer) => &timer.position,
        }
    }

    pub fn style(&self) -> &TextStyle {
        match self {
            OverlaySpec::Text(text) => &text.style,
            OverlaySpec::Timer(timer) => &timer.style,
        }
    }

    pub fn is_timer(&self) -> bool {
        matches!(self, OverlaySpec::Timer(_))
    }
}

impl TryFrom<OverlayRequest> for OverlaySpec {
    type Error = DomainError;

    fn try_from(request: OverlayRequest) -> Result<Self, Self::Error> {
        let window = TimeWindow::new(request.start_time, request.end_time)?;
        let position = Position::new(request.x, request.y)?;

        let font_size = request.font_size.unwrap_or(DEFAULT_FONT_SIZE);
        if font_size == 0 {
            return Err(DomainError::ValidationFailed(
                "font size must be greater than zero".to_string(),
            ));
        }
        let style = TextStyle {
            font_size,
            font_color: validate_color(request.font_color.as_deref(), DEFAULT_FONT_COLOR)?,
            background_color: validate_color(
                request.background_color.as_deref(),
                DEFAULT_BACKGROUND_COLOR,
            )?,
        };

        match request.kind.trim().to_lowercase().as_str() {
            "text" => {
                let text = request.text.unwrap_or_default();
                if text.trim().is_empty() {
                    return Err(DomainError::ValidationFailed(
                        "text overlay requires non-empty text".to_string(),
                    ));
                }
                Ok(OverlaySpec::Text(TextOverlay {
                    text,
                    window,
                    position,
                    style,
                }))
            }
            "timer" => {
                let timer_type = TimerType::parse(request.timer_type.as_deref().unwrap_or("elapsed"))?;
                let timer_format =
                    TimerFormat::parse(request.timer_format.as_deref().unwrap_or("MM:SS"))?;
                Ok(OverlaySpec::Timer(TimerOverlay {
                    label: request.text.unwrap_or_default(),
                    timer_type,
                    timer_format,
                    window,
                    position,
                    style,
                }))
            }
            other => Err(DomainError::UnknownOverlayKind(format!(
                "overlay type '{}'",
                other
            ))),
        }
    }
}

/// Convert a submitted overlay list, keeping order. Rejects empty lists.
pub fn parse_overlays(requests: Vec<OverlayRequest>) -> Result<Vec<OverlaySpec>, DomainError> {
    if requests.is_empty() {
        return Err(DomainError::ValidationFailed(
            "overlay list is empty".to_string(),
        ));
    }
    requests
        .into_iter()
        .enumerate()
        .map(|(index, request)| {
            OverlaySpec::try_from(request).map_err(|e| {
                DomainError::ValidationFailed(format!("overlay #{}: {}", index, e))
            })
        })
        .collect()
}

/// Colours end up unquoted in the filter graph, so only the characters of
/// ffmpeg colour syntax are accepted (`red`, `#ff0000`, `0xff0000@0.5`).
fn validate_color(value: Option<&str>, default: &str) -> Result<String, DomainError> {
    let color = match value.map(str::trim) {
        None | Some("") => return Ok(default.to_string()),
        Some(color) => color,
    };
    if color
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '#' | '@' | '.'))
    {
        Ok(color.to_string())
    } else {
        Err(DomainError::ValidationFailed(format!(
            "colour '{}' contains unsupported characters",
            color
        )))
    }
}

/// Class of hardware H.264 encoder available on the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HardwareKind {
    /// Discrete NVIDIA GPU (NVENC)
    DedicatedGpu,
    /// Intel Quick Sync
    IntegratedGpu,
    /// Linux VA-API
    PlatformGpu,
    /// Software encoding
    None,
}

impl HardwareKind {
    /// Encoders on this path take nv12 frames that the graph must produce
    pub fn requires_nv12(&self) -> bool {
        matches!(self, HardwareKind::IntegratedGpu | HardwareKind::PlatformGpu)
    }
}

impl fmt::Display for HardwareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HardwareKind::DedicatedGpu => "dedicated-gpu",
            HardwareKind::IntegratedGpu => "integrated-gpu",
            HardwareKind::PlatformGpu => "platform-gpu",
            HardwareKind::None => "none",
        };
        write!(f, "{}", name)
    }
}

/// Detected encoder class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareCapability {
    #[serde(rename = "type")]
    pub kind: HardwareKind,
    pub available: bool,
}

impl HardwareCapability {
    /// Software-only capability
    pub fn software() -> Self {
        Self {
            kind: HardwareKind::None,
            available: false,
        }
    }

    pub fn hardware(kind: HardwareKind) -> Self {
        Self {
            kind,
            available: kind != HardwareKind::None,
        }
    }
}

/// How a job was executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ExecutionMode {
    /// All overlays in one engine invocation
    SinglePass,
    /// Overlays split across sequential invocations
    Batched { batches: usize },
}

/// One rendering request after validation
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// Unique suffix shared by every artifact of this job
    pub tag: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub overlays: Vec<OverlaySpec>,
    pub session_id: String,
    pub capability: HardwareCapability,
    /// Badge image, present when at least one timer overlay exists
    pub badge_path: Option<PathBuf>,
    /// Directory for filter scripts and intermediate batch outputs
    pub scratch_dir: PathBuf,
}

/// Job submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Source video on local storage
    pub input: PathBuf,
    /// The input is an upload owned by this job and is deleted afterwards
    #[serde(default)]
    pub input_is_temporary: bool,
    pub overlays: Vec<OverlayRequest>,
    pub session_id: String,
    /// Opaque exercise metadata, returned unchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Result of a completed job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResponse {
    pub output_url: String,
    pub output_path: PathBuf,
    pub mode: ExecutionMode,
    pub hardware: HardwareCapability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests;
