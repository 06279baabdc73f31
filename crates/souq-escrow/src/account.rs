//! The escrow account ledger.
//!
//! Accounts are created when an order is paid and live forever afterwards
//! as the financial record of the trade. Amounts only ever increase; the
//! derived status is recomputed inside the same mutation that changes the
//! amounts and has no public setter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use souq_core::{Amount, OrderId};

use crate::error::{EscrowError, Result};

/// Derived settlement status of an escrow account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    /// Funds held, nothing moved yet.
    Holding,
    /// Funds have moved but the settlement is mixed or incomplete.
    Partial,
    /// Fully released to the seller.
    Released,
    /// Fully refunded to the buyer.
    Refunded,
}

impl EscrowStatus {
    /// Returns the string representation of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Holding => "holding",
            Self::Partial => "partial",
            Self::Released => "released",
            Self::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ledger of funds held against one order.
///
/// Invariant, checked on every mutation:
/// `amount_released + amount_refunded <= amount_held`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowAccount {
    order_id: OrderId,
    amount_held: Amount,
    amount_released: Amount,
    amount_refunded: Amount,
    status: EscrowStatus,
    held_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
}

impl EscrowAccount {
    /// Opens an escrow account holding `amount_held` for an order.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::NonPositiveAmount`] if the hold is zero.
    pub fn open(order_id: OrderId, amount_held: Amount) -> Result<Self> {
        if amount_held.is_zero() {
            return Err(EscrowError::NonPositiveAmount);
        }
        Ok(Self {
            order_id,
            amount_held,
            amount_released: Amount::ZERO,
            amount_refunded: Amount::ZERO,
            status: EscrowStatus::Holding,
            held_at: Utc::now(),
            resolved_at: None,
        })
    }

    /// The order this account belongs to.
    #[must_use]
    pub const fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// Total amount held at creation. Fixed for the account's lifetime.
    #[must_use]
    pub const fn amount_held(&self) -> Amount {
        self.amount_held
    }

    /// Cumulative amount released to the seller.
    #[must_use]
    pub const fn amount_released(&self) -> Amount {
        self.amount_released
    }

    /// Cumulative amount refunded to the buyer.
    #[must_use]
    pub const fn amount_refunded(&self) -> Amount {
        self.amount_refunded
    }

    /// Current derived status.
    #[must_use]
    pub const fn status(&self) -> EscrowStatus {
        self.status
    }

    /// When the hold was created.
    #[must_use]
    pub const fn held_at(&self) -> DateTime<Utc> {
        self.held_at
    }

    /// When the account reached zero remaining balance, if it has.
    #[must_use]
    pub const fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    /// Balance still held: `held - released - refunded`.
    #[must_use]
    pub fn remaining(&self) -> Amount {
        self.amount_held
            .saturating_sub(self.amount_released)
            .saturating_sub(self.amount_refunded)
    }

    /// Whether the account is fully settled (nothing left to move).
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Releases funds to the seller.
    ///
    /// `amount` defaults to the full remaining balance. Returns the amount
    /// actually moved.
    ///
    /// # Errors
    ///
    /// Rejects zero amounts and amounts exceeding the remaining balance;
    /// the account is unchanged on error.
    pub fn release(&mut self, amount: Option<Amount>) -> Result<Amount> {
        let amount = self.validated(amount)?;
        self.amount_released = self.amount_released.saturating_add(amount);
        self.settle();
        Ok(amount)
    }

    /// Refunds funds to the buyer.
    ///
    /// `amount` defaults to the full remaining balance. Returns the amount
    /// actually moved.
    ///
    /// # Errors
    ///
    /// Rejects zero amounts and amounts exceeding the remaining balance;
    /// the account is unchanged on error.
    pub fn refund(&mut self, amount: Option<Amount>) -> Result<Amount> {
        let amount = self.validated(amount)?;
        self.amount_refunded = self.amount_refunded.saturating_add(amount);
        self.settle();
        Ok(amount)
    }

    /// Moves funds in both directions atomically: `buyer_amount` back to
    /// the buyer and `seller_amount` out to the seller.
    ///
    /// The only operation that can settle a trade both ways. Used by
    /// adjudicated partial refunds.
    ///
    /// # Errors
    ///
    /// Rejects an all-zero split and any split whose sum exceeds the
    /// remaining balance; the account is unchanged on error.
    pub fn split(&mut self, buyer_amount: Amount, seller_amount: Amount) -> Result<()> {
        let total = buyer_amount
            .checked_add(seller_amount)
            .ok_or(EscrowError::ExceedsRemaining {
                requested: Amount::MAX,
                remaining: self.remaining(),
            })?;
        if total.is_zero() {
            return Err(EscrowError::NonPositiveAmount);
        }
        let remaining = self.remaining();
        if total > remaining {
            return Err(EscrowError::ExceedsRemaining {
                requested: total,
                remaining,
            });
        }
        self.amount_refunded = self.amount_refunded.saturating_add(buyer_amount);
        self.amount_released = self.amount_released.saturating_add(seller_amount);
        self.settle();
        Ok(())
    }

    /// Validates a requested movement against the remaining balance,
    /// defaulting to the full balance.
    fn validated(&self, amount: Option<Amount>) -> Result<Amount> {
        let remaining = self.remaining();
        let amount = amount.unwrap_or(remaining);
        if amount.is_zero() {
            return Err(EscrowError::NonPositiveAmount);
        }
        if amount > remaining {
            return Err(EscrowError::ExceedsRemaining {
                requested: amount,
                remaining,
            });
        }
        Ok(amount)
    }

    /// Recomputes the derived status from the amounts. Called by every
    /// mutation, never from outside.
    fn settle(&mut self) {
        let resolved = self.remaining().is_zero();
        self.status = match (resolved, self.amount_released.is_zero(), self.amount_refunded.is_zero())
        {
            (true, false, true) => EscrowStatus::Released,
            (true, true, false) => EscrowStatus::Refunded,
            _ => EscrowStatus::Partial,
        };
        if resolved && self.resolved_at.is_none() {
            self.resolved_at = Some(Utc::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(major: u64) -> EscrowAccount {
        EscrowAccount::open(OrderId::new(), Amount::from_major(major)).expect("open")
    }

    #[test]
    fn open_holds_full_amount() {
        let escrow = held(200);
        assert_eq!(escrow.amount_held(), Amount::from_major(200));
        assert_eq!(escrow.remaining(), Amount::from_major(200));
        assert_eq!(escrow.status(), EscrowStatus::Holding);
        assert!(!escrow.is_resolved());
        assert!(escrow.resolved_at().is_none());
    }

    #[test]
    fn open_rejects_zero_hold() {
        let result = EscrowAccount::open(OrderId::new(), Amount::ZERO);
        assert_eq!(result.unwrap_err(), EscrowError::NonPositiveAmount);
    }

    #[test]
    fn full_release_resolves() {
        let mut escrow = held(200);
        let moved = escrow.release(None).expect("release");
        assert_eq!(moved, Amount::from_major(200));
        assert_eq!(escrow.status(), EscrowStatus::Released);
        assert!(escrow.is_resolved());
        assert!(escrow.resolved_at().is_some());
    }

    #[test]
    fn full_refund_resolves() {
        let mut escrow = held(200);
        escrow.refund(None).expect("refund");
        assert_eq!(escrow.status(), EscrowStatus::Refunded);
        assert!(escrow.remaining().is_zero());
    }

    #[test]
    fn partial_release_keeps_partial_status() {
        let mut escrow = held(200);
        escrow.release(Some(Amount::from_major(50))).expect("release");
        assert_eq!(escrow.status(), EscrowStatus::Partial);
        assert_eq!(escrow.remaining(), Amount::from_major(150));
        assert!(!escrow.is_resolved());
    }

    #[test]
    fn release_more_than_held_fails_unchanged() {
        let mut escrow = held(200);
        let result = escrow.release(Some(Amount::from_major(300)));
        assert_eq!(
            result.unwrap_err(),
            EscrowError::ExceedsRemaining {
                requested: Amount::from_major(300),
                remaining: Amount::from_major(200),
            }
        );
        assert_eq!(escrow.remaining(), Amount::from_major(200));
        assert_eq!(escrow.status(), EscrowStatus::Holding);
    }

    #[test]
    fn release_zero_fails() {
        let mut escrow = held(200);
        assert_eq!(
            escrow.release(Some(Amount::ZERO)).unwrap_err(),
            EscrowError::NonPositiveAmount
        );
    }

    #[test]
    fn resolved_account_rejects_further_movement() {
        let mut escrow = held(200);
        escrow.release(None).expect("release");

        // Defaulted amount is the zero remaining balance.
        assert_eq!(escrow.release(None).unwrap_err(), EscrowError::NonPositiveAmount);
        assert_eq!(escrow.refund(None).unwrap_err(), EscrowError::NonPositiveAmount);
        assert!(escrow.release(Some(Amount::from_minor(1))).is_err());

        // Amounts did not double-apply.
        assert_eq!(escrow.amount_released(), Amount::from_major(200));
        assert!(escrow.amount_refunded().is_zero());
    }

    #[test]
    fn split_settles_both_ways() {
        // 200.00 held, 80.00 back to buyer, 120.00 to seller.
        let mut escrow = held(200);
        escrow
            .split(Amount::from_major(80), Amount::from_major(120))
            .expect("split");

        assert_eq!(escrow.amount_refunded(), Amount::from_major(80));
        assert_eq!(escrow.amount_released(), Amount::from_major(120));
        assert!(escrow.remaining().is_zero());
        assert!(escrow.is_resolved());
        // Mixed settlement keeps the Partial status even at zero remaining.
        assert_eq!(escrow.status(), EscrowStatus::Partial);
    }

    #[test]
    fn split_exceeding_remaining_fails_unchanged() {
        let mut escrow = held(200);
        let result = escrow.split(Amount::from_major(150), Amount::from_major(100));
        assert!(matches!(result, Err(EscrowError::ExceedsRemaining { .. })));
        assert_eq!(escrow.remaining(), Amount::from_major(200));
        assert!(escrow.amount_released().is_zero());
        assert!(escrow.amount_refunded().is_zero());
    }

    #[test]
    fn split_all_zero_fails() {
        let mut escrow = held(200);
        assert_eq!(
            escrow.split(Amount::ZERO, Amount::ZERO).unwrap_err(),
            EscrowError::NonPositiveAmount
        );
    }

    #[test]
    fn one_sided_split_allowed() {
        let mut escrow = held(100);
        escrow.split(Amount::from_major(100), Amount::ZERO).expect("split");
        assert_eq!(escrow.status(), EscrowStatus::Refunded);
    }

    #[test]
    fn partial_then_refund_rest() {
        let mut escrow = held(100);
        escrow.release(Some(Amount::from_major(30))).expect("release");
        escrow.refund(None).expect("refund rest");
        assert_eq!(escrow.amount_released(), Amount::from_major(30));
        assert_eq!(escrow.amount_refunded(), Amount::from_major(70));
        assert!(escrow.is_resolved());
        assert_eq!(escrow.status(), EscrowStatus::Partial);
    }

    #[test]
    fn serde_roundtrip() {
        let mut escrow = held(50);
        escrow.release(Some(Amount::from_major(10))).expect("release");
        let json = serde_json::to_string(&escrow).expect("serialize");
        let parsed: EscrowAccount = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.amount_released(), Amount::from_major(10));
        assert_eq!(parsed.status(), EscrowStatus::Partial);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Release(u64),
            Refund(u64),
            Split(u64, u64),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u64..30_000).prop_map(Op::Release),
                (0u64..30_000).prop_map(Op::Refund),
                ((0u64..15_000), (0u64..15_000)).prop_map(|(b, s)| Op::Split(b, s)),
            ]
        }

        proptest! {
            /// The conservation invariant holds at every step of any
            /// operation sequence, successful or not.
            #[test]
            fn conservation_invariant(
                held_minor in 1u64..20_000,
                ops in proptest::collection::vec(op_strategy(), 1..40)
            ) {
                let mut escrow =
                    EscrowAccount::open(OrderId::new(), Amount::from_minor(held_minor)).unwrap();

                for op in ops {
                    let _ = match op {
                        Op::Release(m) => escrow.release(Some(Amount::from_minor(m))).map(|_| ()),
                        Op::Refund(m) => escrow.refund(Some(Amount::from_minor(m))).map(|_| ()),
                        Op::Split(b, s) => {
                            escrow.split(Amount::from_minor(b), Amount::from_minor(s))
                        }
                    };

                    let moved = escrow
                        .amount_released()
                        .checked_add(escrow.amount_refunded())
                        .unwrap();
                    prop_assert!(moved <= escrow.amount_held());
                    prop_assert_eq!(
                        escrow.remaining(),
                        escrow.amount_held().checked_sub(moved).unwrap()
                    );
                }
            }
        }
    }
}
