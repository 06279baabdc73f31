//! Error types for souq-core.

use thiserror::Error;

/// Errors that can occur in core primitive operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid money amount (overflow or unparseable input).
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Invalid identifier format.
    #[error("invalid id: {0}")]
    InvalidId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_amount_display() {
        let err = CoreError::InvalidAmount("negative".to_string());
        assert!(err.to_string().contains("negative"));
    }
}
