//! Error types for order operations.

use souq_core::Amount;
use thiserror::Error;

use crate::state::OrderState;

/// Result type alias for order operations.
pub type Result<T> = std::result::Result<T, OrderError>;

/// Errors that can occur when creating or transitioning an order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// The requested state change is not an edge of the transition graph.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// The order's current state.
        from: OrderState,
        /// The attempted target state.
        to: OrderState,
    },

    /// The actor lacks authority for the requested transition.
    #[error("forbidden: {reason}")]
    Forbidden {
        /// Why the actor was rejected.
        reason: String,
    },

    /// A buyer attempted to purchase their own listing.
    #[error("buyer and seller must be different users")]
    SelfPurchase,

    /// Quantity outside the allowed purchase bounds.
    #[error("invalid quantity {quantity}: must be between {min} and {max}")]
    InvalidQuantity {
        /// Requested quantity.
        quantity: u32,
        /// Minimum allowed for the listing.
        min: u32,
        /// Maximum allowed (listing stock or global cap).
        max: u32,
    },

    /// Order economics overflowed during computation.
    #[error("order amount overflows")]
    AmountOverflow,

    /// The platform fee cannot exceed the order total.
    #[error("platform fee {fee} exceeds order total {total}")]
    FeeExceedsTotal {
        /// Computed platform fee.
        fee: Amount,
        /// Order total amount.
        total: Amount,
    },
}

impl OrderError {
    /// Creates a `Forbidden` error with the given reason.
    #[must_use]
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_display() {
        let err = OrderError::InvalidTransition {
            from: OrderState::Confirmed,
            to: OrderState::Cancelled,
        };
        assert_eq!(err.to_string(), "invalid transition: CONFIRMED -> CANCELLED");
    }

    #[test]
    fn forbidden_display() {
        let err = OrderError::forbidden("only the buyer may confirm delivery");
        assert!(err.to_string().contains("only the buyer"));
    }
}
