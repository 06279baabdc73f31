//! The unified error taxonomy for trade operations.
//!
//! Leaf crates report their own errors; this module wraps them and
//! classifies every failure into one of six [`FailureKind`]s so callers
//! (and transport adapters) can react uniformly. Only `Conflict` — a
//! bounded lock-wait timeout or a stock race — is safe to retry.

use souq_core::{DisputeId, ListingId, OrderId};
use souq_disputes::DisputeError;
use souq_escrow::EscrowError;
use souq_orders::OrderError;
use thiserror::Error;

/// Result type alias for market operations.
pub type Result<T> = std::result::Result<T, MarketError>;

/// Classification of a rejected operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Illegal state edge. A client/logic error, never retried.
    InvalidTransition,
    /// The actor lacks authority for the request.
    Forbidden,
    /// A ledger amount was non-positive or exceeded the remaining balance.
    InvalidAmount,
    /// Concurrent mutation detected; safe to retry once.
    Conflict,
    /// A referenced order, listing, escrow, or dispute is absent.
    NotFound,
    /// Duplicate escrow creation or duplicate active dispute.
    AlreadyExists,
}

impl FailureKind {
    /// Whether a failure of this kind may be retried automatically.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict)
    }
}

/// Errors surfaced by trade lifecycle and dispute operations.
#[derive(Debug, Error)]
pub enum MarketError {
    /// Order state machine rejection.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Escrow ledger rejection.
    #[error(transparent)]
    Escrow(#[from] EscrowError),

    /// Dispute workflow rejection.
    #[error(transparent)]
    Dispute(#[from] DisputeError),

    /// No order with the given id.
    #[error("order not found: {id}")]
    OrderNotFound {
        /// The missing order.
        id: OrderId,
    },

    /// No listing with the given id.
    #[error("listing not found: {id}")]
    ListingNotFound {
        /// The missing listing.
        id: ListingId,
    },

    /// No dispute with the given id.
    #[error("dispute not found: {id}")]
    DisputeNotFound {
        /// The missing dispute.
        id: DisputeId,
    },

    /// The order has no escrow account (payment was never confirmed).
    #[error("order {order} has no escrow account")]
    EscrowNotFound {
        /// The order missing its escrow.
        order: OrderId,
    },

    /// An escrow account already exists for the order.
    #[error("escrow already exists for order {order}")]
    EscrowExists {
        /// The already-funded order.
        order: OrderId,
    },

    /// An active dispute already exists for the order.
    #[error("an active dispute already exists for order {order}")]
    ActiveDisputeExists {
        /// The already-disputed order.
        order: OrderId,
    },

    /// The listing is not available for purchase.
    #[error("listing {id} is not available")]
    ListingUnavailable {
        /// The unavailable listing.
        id: ListingId,
    },

    /// Concurrent buyers exhausted the listing's stock.
    #[error("insufficient stock on listing {id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// The listing.
        id: ListingId,
        /// Units requested.
        requested: u32,
        /// Units still available.
        available: u32,
    },

    /// The requested quantity is below the listing's minimum purchase.
    #[error("quantity {requested} is below the listing minimum of {min}")]
    BelowMinimumPurchase {
        /// Units requested.
        requested: u32,
        /// Listing's minimum purchase.
        min: u32,
    },

    /// The per-order lock could not be acquired within the bounded wait.
    #[error("order {order} is locked by a concurrent operation")]
    LockContended {
        /// The contended order.
        order: OrderId,
    },
}

impl MarketError {
    /// Classifies this error into the taxonomy.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Order(err) => match err {
                OrderError::InvalidTransition { .. } => FailureKind::InvalidTransition,
                OrderError::Forbidden { .. } | OrderError::SelfPurchase => FailureKind::Forbidden,
                OrderError::InvalidQuantity { .. }
                | OrderError::AmountOverflow
                | OrderError::FeeExceedsTotal { .. } => FailureKind::InvalidAmount,
            },
            Self::Escrow(_) | Self::BelowMinimumPurchase { .. } => FailureKind::InvalidAmount,
            Self::Dispute(_) => FailureKind::InvalidTransition,
            Self::OrderNotFound { .. }
            | Self::ListingNotFound { .. }
            | Self::DisputeNotFound { .. }
            | Self::EscrowNotFound { .. }
            | Self::ListingUnavailable { .. } => FailureKind::NotFound,
            Self::EscrowExists { .. } | Self::ActiveDisputeExists { .. } => {
                FailureKind::AlreadyExists
            }
            Self::InsufficientStock { .. } | Self::LockContended { .. } => FailureKind::Conflict,
        }
    }

    /// Whether this error may be retried automatically.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use souq_orders::OrderState;

    #[test]
    fn only_conflict_is_retryable() {
        assert!(FailureKind::Conflict.is_retryable());
        for kind in [
            FailureKind::InvalidTransition,
            FailureKind::Forbidden,
            FailureKind::InvalidAmount,
            FailureKind::NotFound,
            FailureKind::AlreadyExists,
        ] {
            assert!(!kind.is_retryable());
        }
    }

    #[test]
    fn order_errors_classify() {
        let err = MarketError::from(OrderError::InvalidTransition {
            from: OrderState::Confirmed,
            to: OrderState::Cancelled,
        });
        assert_eq!(err.kind(), FailureKind::InvalidTransition);

        let err = MarketError::from(OrderError::forbidden("nope"));
        assert_eq!(err.kind(), FailureKind::Forbidden);
    }

    #[test]
    fn escrow_errors_are_invalid_amount() {
        let err = MarketError::from(EscrowError::NonPositiveAmount);
        assert_eq!(err.kind(), FailureKind::InvalidAmount);
    }

    #[test]
    fn duplicates_are_already_exists() {
        let err = MarketError::ActiveDisputeExists {
            order: OrderId::new(),
        };
        assert_eq!(err.kind(), FailureKind::AlreadyExists);
        let err = MarketError::EscrowExists {
            order: OrderId::new(),
        };
        assert_eq!(err.kind(), FailureKind::AlreadyExists);
    }

    #[test]
    fn contention_is_retryable() {
        let err = MarketError::LockContended {
            order: OrderId::new(),
        };
        assert!(err.is_retryable());
        let err = MarketError::InsufficientStock {
            id: ListingId::new(),
            requested: 5,
            available: 2,
        };
        assert_eq!(err.kind(), FailureKind::Conflict);
    }

    #[test]
    fn messages_carry_context() {
        let id = OrderId::new();
        let err = MarketError::OrderNotFound { id };
        assert!(err.to_string().contains(&id.to_string()));
    }
}
