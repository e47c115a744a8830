//! Filter graph compilation
//!
//! Each overlay becomes a chain of stages reading the previous stage's label.
//! The main video enters as `0:v`, intermediate labels are `v1`, `v2`, ... and
//! the last stage always writes `vout`, which the command maps to the output.
//!
//! Timer badges are a single image input in slot 1, shared by every timer.

use std::path::{Path, PathBuf};

use crate::domain::model::{
    HardwareKind, OverlaySpec, TextOverlay, TimerFormat, TimerOverlay, TimerType,
};
use crate::engine::badge::DEFAULT_BADGE_SIZE;
use crate::error::{RenderError, RenderResult};

/// Bold monospace font shipped by most Linux distributions
pub const DEFAULT_FONT_FILE: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSansMono-Bold.ttf";
/// Longest graph passed inline on the command line
pub const DEFAULT_INLINE_LIMIT: usize = 7000;
/// Input slot of the badge image
pub const BADGE_INPUT_SLOT: usize = 1;
/// Label of the graph's only output
pub const OUTPUT_LABEL: &str = "vout";

const MAIN_INPUT_LABEL: &str = "0:v";
const TEXT_BOX_BORDER: u32 = 8;

/// One `[in]filter[out]` statement of the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterStage {
    /// Overlay this stage renders; `None` for pixel-format conversion
    pub overlay_index: Option<usize>,
    pub expression: String,
}

/// Extra engine input referenced by the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxiliaryInput {
    pub slot: usize,
    pub path: PathBuf,
}

/// Compiled graph for one engine invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterGraphPlan {
    pub stages: Vec<FilterStage>,
    pub aux_inputs: Vec<AuxiliaryInput>,
    /// Joined expression is too long to pass inline
    pub needs_script_file: bool,
}

impl FilterGraphPlan {
    /// Full graph text, stages joined with `;`
    pub fn expression(&self) -> String {
        join_stages(&self.stages)
    }

    /// Number of stages rendering the overlay at `overlay_index`
    pub fn stages_for(&self, overlay_index: usize) -> usize {
        self.stages
            .iter()
            .filter(|stage| stage.overlay_index == Some(overlay_index))
            .count()
    }

    /// Auxiliary input paths in slot order
    pub fn aux_paths(&self) -> impl Iterator<Item = &Path> {
        self.aux_inputs.iter().map(|input| input.path.as_path())
    }
}

/// Stage body waiting for its labels
struct PendingStage {
    overlay_index: Option<usize>,
    extra_input: Option<String>,
    body: String,
}

/// Turns an ordered overlay list into a [`FilterGraphPlan`]
#[derive(Debug, Clone)]
pub struct FilterGraphCompiler {
    font_file: PathBuf,
    badge_size: u32,
    inline_limit: usize,
}

impl Default for FilterGraphCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_FILE)
    }
}

impl FilterGraphCompiler {
    pub fn new(font_file: impl Into<PathBuf>) -> Self {
        Self {
            font_file: font_file.into(),
            badge_size: DEFAULT_BADGE_SIZE,
            inline_limit: DEFAULT_INLINE_LIMIT,
        }
    }

    pub fn with_badge_size(mut self, badge_size: u32) -> Self {
        self.badge_size = badge_size;
        self
    }

    pub fn with_inline_limit(mut self, inline_limit: usize) -> Self {
        self.inline_limit = inline_limit;
        self
    }

    pub fn compile(
        &self,
        overlays: &[OverlaySpec],
        badge: Option<&Path>,
        hardware: HardwareKind,
    ) -> RenderResult<FilterGraphPlan> {
        if overlays.is_empty() {
            return Err(RenderError::InvalidInput {
                message: "cannot compile a filter graph without overlays".to_string(),
            });
        }

        let mut aux_inputs = Vec::new();
        let mut pending = Vec::new();

        for (index, overlay) in overlays.iter().enumerate() {
            match overlay {
                OverlaySpec::Text(text) => pending.push(PendingStage {
                    overlay_index: Some(index),
                    extra_input: None,
                    body: self.text_stage(text),
                }),
                OverlaySpec::Timer(timer) => {
                    let badge_path = badge.ok_or_else(|| RenderError::InvalidInput {
                        message: format!("timer overlay #{} requires a badge image", index),
                    })?;
                    if aux_inputs.is_empty() {
                        aux_inputs.push(AuxiliaryInput {
                            slot: BADGE_INPUT_SLOT,
                            path: badge_path.to_path_buf(),
                        });
                    }
                    pending.extend(self.timer_stages(index, timer));
                }
            }
        }

        if hardware.requires_nv12() {
            let body = match hardware {
                HardwareKind::PlatformGpu => "format=nv12,hwupload",
                _ => "format=nv12",
            };
            pending.push(PendingStage {
                overlay_index: None,
                extra_input: None,
                body: body.to_string(),
            });
        }

        let stages = link_stages(pending);
        let needs_script_file = join_stages(&stages).len() > self.inline_limit;

        Ok(FilterGraphPlan {
            stages,
            aux_inputs,
            needs_script_file,
        })
    }

    fn text_stage(&self, text: &TextOverlay) -> String {
        format!(
            "drawtext=fontfile={}:text={}:fontsize={}:fontcolor={}:box=1:boxcolor={}:boxborderw={}:x=w*{}/100-text_w/2:y=h*{}/100-text_h/2:enable={}",
            self.font_arg(),
            escape_text(&text.text),
            text.style.font_size,
            text.style.font_color,
            text.style.background_color,
            TEXT_BOX_BORDER,
            text.position.x,
            text.position.y,
            enable_between(text.window.start, text.window.end),
        )
    }

    /// Badge composite, label in the upper part, live clock in the lower part
    fn timer_stages(&self, index: usize, timer: &TimerOverlay) -> Vec<PendingStage> {
        let enable = enable_between(timer.window.start, timer.window.end);
        let (x, y) = (timer.position.x, timer.position.y);
        let label_offset = self.badge_size * 3 / 10;
        let clock_offset = self.badge_size * 13 / 20;
        let label_size = (timer.style.font_size / 2).max(1);

        let badge = format!(
            "overlay=x=W*{}/100-w/2:y=H*{}/100:enable={}",
            x, y, enable
        );
        let label = format!(
            "drawtext=fontfile={}:text={}:fontsize={}:fontcolor={}:x=w*{}/100-text_w/2:y=h*{}/100+{}-text_h/2:enable={}",
            self.font_arg(),
            escape_text(&timer.label),
            label_size,
            timer.style.font_color,
            x,
            y,
            label_offset,
            enable,
        );
        let clock = format!(
            "drawtext=fontfile={}:text='{}':fontsize={}:fontcolor={}:x=w*{}/100-text_w/2:y=h*{}/100+{}-text_h/2:enable={}",
            self.font_arg(),
            TimerClock::new(timer).expression(),
            timer.style.font_size,
            timer.style.font_color,
            x,
            y,
            clock_offset,
            enable,
        );

        vec![
            PendingStage {
                overlay_index: Some(index),
                extra_input: Some(format!("{}:v", BADGE_INPUT_SLOT)),
                body: badge,
            },
            PendingStage {
                overlay_index: Some(index),
                extra_input: None,
                body: label,
            },
            PendingStage {
                overlay_index: Some(index),
                extra_input: None,
                body: clock,
            },
        ]
    }

    fn font_arg(&self) -> String {
        escape_option(&self.font_file.to_string_lossy())
    }
}

/// Chain stages `0:v -> v1 -> ... -> vout`
fn link_stages(pending: Vec<PendingStage>) -> Vec<FilterStage> {
    let total = pending.len();
    let mut previous = MAIN_INPUT_LABEL.to_string();

    pending
        .into_iter()
        .enumerate()
        .map(|(i, stage)| {
            let output = if i + 1 == total {
                OUTPUT_LABEL.to_string()
            } else {
                format!("v{}", i + 1)
            };
            let inputs = match &stage.extra_input {
                Some(extra) => format!("[{}][{}]", previous, extra),
                None => format!("[{}]", previous),
            };
            let expression = format!("{}{}[{}]", inputs, stage.body, output);
            previous = output;
            FilterStage {
                overlay_index: stage.overlay_index,
                expression,
            }
        })
        .collect()
}

fn join_stages(stages: &[FilterStage]) -> String {
    stages
        .iter()
        .map(|stage| stage.expression.as_str())
        .collect::<Vec<_>>()
        .join(";")
}

fn enable_between(start: f64, end: f64) -> String {
    format!("'between(t,{},{})'", start, end)
}

/// Quote `value` as a filter option and escape the result for the graph parser.
///
/// The engine unescapes twice: once when splitting the graph on `[],;`
/// and again when splitting a filter's options on `:`.
pub fn escape_option(value: &str) -> String {
    let quoted = format!("'{}'", value.replace('\'', "'\\''"));
    let mut escaped = String::with_capacity(quoted.len() + 8);
    for c in quoted.chars() {
        if matches!(c, '\\' | '\'' | '[' | ']' | ',' | ';') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escape user text for a `drawtext` `text=` option.
///
/// `drawtext` expands `%{...}` and backslash sequences itself, so `\` and `%`
/// get their own escape before the option and graph levels.
pub fn escape_text(value: &str) -> String {
    let mut literal = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%') {
            literal.push('\\');
        }
        literal.push(c);
    }
    escape_option(&literal)
}

/// Live timer text, as an engine expression and as evaluated locally
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerClock {
    timer_type: TimerType,
    timer_format: TimerFormat,
    start: f64,
    end: f64,
}

impl TimerClock {
    pub fn new(timer: &TimerOverlay) -> Self {
        Self {
            timer_type: timer.timer_type,
            timer_format: timer.timer_format,
            start: timer.window.start,
            end: timer.window.end,
        }
    }

    /// Seconds shown, written in the engine's expression language
    fn base_expression(&self) -> String {
        match self.timer_type {
            TimerType::Elapsed => format!("(t-{})", self.start),
            TimerType::Countdown => format!("({}-t)", self.end),
        }
    }

    /// `drawtext` text value, without the surrounding quotes
    pub fn expression(&self) -> String {
        let base = self.base_expression();
        match self.timer_format {
            TimerFormat::MinutesSeconds => format!(
                "%{{eif\\:floor({}/60)\\:d\\:2}}\\:%{{eif\\:floor(mod({}\\,60))\\:d\\:2}}",
                base, base
            ),
            TimerFormat::Seconds => format!("%{{eif\\:floor({})\\:d}}", base),
        }
    }

    /// What the engine prints at source time `t` inside the window
    pub fn render_at(&self, t: f64) -> String {
        let base = match self.timer_type {
            TimerType::Elapsed => t - self.start,
            TimerType::Countdown => self.end - t,
        };
        match self.timer_format {
            TimerFormat::MinutesSeconds => {
                let minutes = (base / 60.0).floor() as i64;
                let seconds = (base - 60.0 * (base / 60.0).floor()).floor() as i64;
                format!("{:02}:{:02}", minutes, seconds)
            }
            TimerFormat::Seconds => format!("{}", base.floor() as i64),
        }
    }
}
