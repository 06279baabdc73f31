//! The order transition graph.
//!
//! ```text
//! CREATED     -> PAID, CANCELLED
//! PAID        -> IN_PROGRESS, DISPUTED, CANCELLED
//! IN_PROGRESS -> DELIVERED, DISPUTED, CANCELLED
//! DELIVERED   -> CONFIRMED, DISPUTED
//! DISPUTED    -> REFUNDED, CONFIRMED, CANCELLED
//! CONFIRMED, REFUNDED, CANCELLED -> (terminal)
//! ```

use serde::{Deserialize, Serialize};

/// The lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    /// Order exists, payment not yet confirmed.
    Created,
    /// Payment confirmed; funds held in escrow.
    Paid,
    /// Seller is working on the order.
    InProgress,
    /// Seller has delivered; awaiting buyer confirmation.
    Delivered,
    /// Buyer confirmed (or adjudicator ruled for the seller). Terminal.
    Confirmed,
    /// A participant escalated the order to dispute resolution.
    Disputed,
    /// Funds went back to the buyer (fully or in part). Terminal.
    Refunded,
    /// Order was cancelled before completion. Terminal.
    Cancelled,
}

impl OrderState {
    /// Checks if a transition to the target state is a legal edge.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        use OrderState::{
            Cancelled, Confirmed, Created, Delivered, Disputed, InProgress, Paid, Refunded,
        };

        matches!(
            (self, target),
            (Created, Paid | Cancelled)
                | (Paid, InProgress | Disputed | Cancelled)
                | (InProgress, Delivered | Disputed | Cancelled)
                | (Delivered, Confirmed | Disputed)
                | (Disputed, Refunded | Confirmed | Cancelled)
        )
    }

    /// The legal successor states, in graph order.
    #[must_use]
    pub const fn successors(&self) -> &'static [Self] {
        use OrderState::{
            Cancelled, Confirmed, Created, Delivered, Disputed, InProgress, Paid, Refunded,
        };

        match self {
            Created => &[Paid, Cancelled],
            Paid => &[InProgress, Disputed, Cancelled],
            InProgress => &[Delivered, Disputed, Cancelled],
            Delivered => &[Confirmed, Disputed],
            Disputed => &[Refunded, Confirmed, Cancelled],
            Confirmed | Refunded | Cancelled => &[],
        }
    }

    /// Whether this state has no outgoing edges.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Refunded | Self::Cancelled)
    }

    /// Whether a dispute may be opened while the order is in this state.
    #[must_use]
    pub const fn is_disputable(&self) -> bool {
        self.can_transition_to(Self::Disputed)
    }

    /// Returns the canonical string representation of this state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Paid => "PAID",
            Self::InProgress => "IN_PROGRESS",
            Self::Delivered => "DELIVERED",
            Self::Confirmed => "CONFIRMED",
            Self::Disputed => "DISPUTED",
            Self::Refunded => "REFUNDED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
