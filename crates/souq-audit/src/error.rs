//! Error types for souq-audit.

use thiserror::Error;

/// Errors that can occur while handling audit events.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Event serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
