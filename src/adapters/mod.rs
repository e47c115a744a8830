// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod session_bus;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use exec_ffmpeg::FfmpegAdapter;
pub use session_bus::SessionBus;
pub use toml_config::RenderConfig;
pub use tracing_log::init_tracing;
