//! Overlay Render Library
//!
//! Burns time-coded captions and timer badges into video by driving an
//! external ffmpeg process.
//!
//! # Features
//!
//! - Hardware encoder detection (NVENC, Quick Sync, VA-API) with software fallback
//! - Filter graph compilation with automatic script-file spill for long graphs
//! - Single-pass rendering with batched multi-pass fallback
//! - Throttled per-session progress over broadcast channels
//! - Guaranteed removal of every scratch artifact a job creates

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{
    ExecutionMode, HardwareCapability, HardwareKind, OverlayRequest, OverlaySpec, RenderRequest,
    RenderResponse,
};
pub use error::{RenderError, RenderResult};
