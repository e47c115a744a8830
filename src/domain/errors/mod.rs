// Domain errors - Error types for the domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    BadArgs(String),
    /// Overlay kind, timer type or timer format not recognised
    UnknownOverlayKind(String),
    /// Invalid time window on an overlay
    InvalidTimeRange(String),
    /// Overlay list failed validation
    ValidationFailed(String),
    /// Transcoding engine could not be started or queried
    EngineUnavailable(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
            DomainError::UnknownOverlayKind(msg) => write!(f, "Unknown overlay kind: {}", msg),
            DomainError::InvalidTimeRange(msg) => write!(f, "Invalid time range: {}", msg),
            DomainError::ValidationFailed(msg) => write!(f, "Validation failed: {}", msg),
            DomainError::EngineUnavailable(msg) => write!(f, "Engine unavailable: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
