//! Error types for the task orchestrator
//!
//! These are internal: every fault inside a capability is converted to a
//! `success=false` output at the capability boundary, so nothing here
//! escapes the orchestrator.

use thiserror::Error;

/// Result type alias for orchestrator operations
pub type Result<T> = std::result::Result<T, OrchestrationError>;

#[derive(Error, Debug)]
pub enum OrchestrationError {
    #[error("Invalid capability input: {0}")]
    InvalidCapabilityInput(String),

    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
