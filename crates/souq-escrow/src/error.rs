//! Error types for escrow ledger operations.

use souq_core::Amount;
use thiserror::Error;

/// Result type alias for escrow operations.
pub type Result<T> = std::result::Result<T, EscrowError>;

/// Errors that can occur when mutating an escrow account.
///
/// Every variant is a rejected amount: the ledger has no other failure
/// mode. No variant leaves the account changed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EscrowError {
    /// The requested amount was zero (or the account would hold nothing).
    #[error("amount must be positive")]
    NonPositiveAmount,

    /// The requested movement exceeds the remaining balance.
    #[error("amount {requested} exceeds remaining balance {remaining}")]
    ExceedsRemaining {
        /// Amount the caller asked to move.
        requested: Amount,
        /// Balance still held by the account.
        remaining: Amount,
    },
}
