//! Rendering engine: detection, assets, graph compilation and execution

pub mod badge;
pub mod command;
pub mod encoder;
pub mod executor;
pub mod filter_graph;
pub mod hardware;
pub mod progress;

pub use badge::{create_badge, DEFAULT_BADGE_SIZE};
pub use executor::RenderExecutor;
pub use filter_graph::{FilterGraphCompiler, FilterGraphPlan, TimerClock};
pub use hardware::HardwareDetector;
pub use progress::ProgressTracker;
