//! Error handling module for the render pipeline

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for render operations
#[derive(Error, Debug)]
pub enum RenderError {
    /// Input file missing, unreadable or not a video
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Overlay list or request rejected during ingestion
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Badge or other auxiliary asset could not be produced
    #[error("Failed to create auxiliary asset {path}: {message}")]
    Asset { path: String, message: String },

    /// The transcoding engine exited with an error
    #[error("Engine invocation failed: {message}")]
    EngineFailed { message: String },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for render operations
pub type RenderResult<T> = std::result::Result<T, RenderError>;
