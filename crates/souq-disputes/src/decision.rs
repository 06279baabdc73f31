//! Adjudicator decision records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use souq_core::{Amount, DecisionId, UserId};

/// The fixed set of rulings an adjudicator can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionKind {
    /// Full refund of the remaining balance to the buyer.
    RefundBuyer,
    /// Full release of the remaining balance to the seller.
    ReleaseSeller,
    /// Split the remaining balance between buyer and seller.
    PartialRefund,
    /// Deactivate the seller's account and refund the buyer in full.
    BanSeller,
    /// Close the dispute without touching funds or order state.
    CloseNoAction,
}

impl DecisionKind {
    /// Whether this ruling moves money through the escrow ledger.
    #[must_use]
    pub const fn moves_funds(&self) -> bool {
        !matches!(self, Self::CloseNoAction)
    }

    /// Returns the canonical string representation of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RefundBuyer => "REFUND_BUYER",
            Self::ReleaseSeller => "RELEASE_SELLER",
            Self::PartialRefund => "PARTIAL_REFUND",
            Self::BanSeller => "BAN_SELLER",
            Self::CloseNoAction => "CLOSE_NO_ACTION",
        }
    }
}

impl std::fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Append-only record of one adjudicator ruling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisputeDecision {
    /// Unique decision id.
    pub id: DecisionId,
    /// The ruling issued.
    pub kind: DecisionKind,
    /// Buyer share of a split ruling, if any.
    pub buyer_amount: Option<Amount>,
    /// Seller share of a split ruling, if any.
    pub seller_amount: Option<Amount>,
    /// The adjudicator's reasoning.
    pub reason: String,
    /// The adjudicator who ruled.
    pub decided_by: UserId,
    /// Origin of the request (IP address), when known.
    pub origin: Option<String>,
    /// When the ruling was recorded.
    pub decided_at: DateTime<Utc>,
}

impl DisputeDecision {
    /// Creates a decision record without split amounts.
    #[must_use]
    pub fn new(
        kind: DecisionKind,
        decided_by: UserId,
        reason: impl Into<String>,
        origin: Option<String>,
    ) -> Self {
        Self {
            id: DecisionId::new(),
            kind,
            buyer_amount: None,
            seller_amount: None,
            reason: reason.into(),
            decided_by,
            origin,
            decided_at: Utc::now(),
        }
    }

    /// Creates a partial-refund decision record carrying the split.
    #[must_use]
    pub fn partial(
        buyer_amount: Amount,
        seller_amount: Amount,
        decided_by: UserId,
        reason: impl Into<String>,
        origin: Option<String>,
    ) -> Self {
        Self {
            id: DecisionId::new(),
            kind: DecisionKind::PartialRefund,
            buyer_amount: Some(buyer_amount),
            seller_amount: Some(seller_amount),
            reason: reason.into(),
            decided_by,
            origin,
            decided_at: Utc::now(),
        }
    }
}
