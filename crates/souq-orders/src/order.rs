//! The order record.
//!
//! An order's parties and economics are frozen at creation from the
//! listing; only `state`, the timestamps that track it, and delivery
//! proofs change afterwards, and state changes only through
//! [`Order::transition`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use souq_core::{Actor, Amount, ListingId, OrderId, UserId};

use crate::error::{OrderError, Result};
use crate::record::TransitionRecord;
use crate::state::OrderState;

/// Global ceiling on per-order quantity.
pub const MAX_ORDER_QUANTITY: u32 = 1_000;

/// Maximum stored length of buyer notes.
const MAX_NOTES_LEN: usize = 1_000;

/// Kind of a delivery proof reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofKind {
    /// Still image.
    Image,
    /// Video clip.
    Video,
    /// Screen capture.
    Screenshot,
}

/// An opaque reference to delivery proof uploaded by the seller.
///
/// Media storage lives outside the trade core; only the reference is
/// recorded here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryProof {
    /// Opaque reference into the media store.
    pub reference: String,
    /// What the reference points at.
    pub kind: ProofKind,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Who uploaded the proof.
    pub uploaded_by: UserId,
    /// When the proof was attached.
    pub uploaded_at: DateTime<Utc>,
}

/// Inputs for creating an order. Economics are computed and frozen by
/// [`Order::create`].
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// The purchasing user.
    pub buyer: UserId,
    /// The listing's seller.
    pub seller: UserId,
    /// The listing being purchased.
    pub listing: ListingId,
    /// Units purchased.
    pub quantity: u32,
    /// Price per unit at order time.
    pub unit_price: Amount,
    /// Platform commission, already computed from the total.
    pub platform_fee: Amount,
    /// Delivery method label from the listing.
    pub delivery_method: String,
    /// Optional buyer instructions (truncated to a bounded length).
    pub buyer_notes: Option<String>,
}

/// One trade instance between a buyer and a seller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    buyer: UserId,
    seller: UserId,
    listing: ListingId,
    quantity: u32,
    unit_price: Amount,
    total_amount: Amount,
    platform_fee: Amount,
    seller_amount: Amount,
    delivery_method: String,
    buyer_notes: Option<String>,
    proofs: Vec<DeliveryProof>,
    state: OrderState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Creates an order in the `CREATED` state with frozen economics.
    ///
    /// # Errors
    ///
    /// Rejects self-purchase, out-of-bounds quantities, overflowing
    /// totals, and a fee exceeding the total.
    pub fn create(new: NewOrder) -> Result<Self> {
        if new.buyer == new.seller {
            return Err(OrderError::SelfPurchase);
        }
        if new.quantity == 0 || new.quantity > MAX_ORDER_QUANTITY {
            return Err(OrderError::InvalidQuantity {
                quantity: new.quantity,
                min: 1,
                max: MAX_ORDER_QUANTITY,
            });
        }

        let total_amount = new
            .unit_price
            .checked_mul(u64::from(new.quantity))
            .ok_or(OrderError::AmountOverflow)?;
        let seller_amount =
            total_amount
                .checked_sub(new.platform_fee)
                .ok_or(OrderError::FeeExceedsTotal {
                    fee: new.platform_fee,
                    total: total_amount,
                })?;

        let now = Utc::now();
        Ok(Self {
            id: OrderId::new(),
            buyer: new.buyer,
            seller: new.seller,
            listing: new.listing,
            quantity: new.quantity,
            unit_price: new.unit_price,
            total_amount,
            platform_fee: new.platform_fee,
            seller_amount,
            delivery_method: new.delivery_method,
            buyer_notes: new.buyer_notes.map(|notes| truncated(notes, MAX_NOTES_LEN)),
            proofs: Vec::new(),
            state: OrderState::Created,
            created_at: now,
            updated_at: now,
            paid_at: None,
            completed_at: None,
        })
    }

    /// Unique order id.
    #[must_use]
    pub const fn id(&self) -> OrderId {
        self.id
    }

    /// The purchasing user.
    #[must_use]
    pub const fn buyer(&self) -> UserId {
        self.buyer
    }

    /// The selling user.
    #[must_use]
    pub const fn seller(&self) -> UserId {
        self.seller
    }

    /// The listing this order was placed against.
    #[must_use]
    pub const fn listing(&self) -> ListingId {
        self.listing
    }

    /// Units purchased.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Price per unit, frozen at creation.
    #[must_use]
    pub const fn unit_price(&self) -> Amount {
        self.unit_price
    }

    /// Total paid by the buyer.
    #[must_use]
    pub const fn total_amount(&self) -> Amount {
        self.total_amount
    }

    /// Platform commission.
    #[must_use]
    pub const fn platform_fee(&self) -> Amount {
        self.platform_fee
    }

    /// What the seller nets after the platform fee.
    #[must_use]
    pub const fn seller_amount(&self) -> Amount {
        self.seller_amount
    }

    /// Delivery method label.
    #[must_use]
    pub fn delivery_method(&self) -> &str {
        &self.delivery_method
    }

    /// Buyer instructions, if any.
    #[must_use]
    pub fn buyer_notes(&self) -> Option<&str> {
        self.buyer_notes.as_deref()
    }

    /// Delivery proofs attached so far.
    #[must_use]
    pub fn proofs(&self) -> &[DeliveryProof] {
        &self.proofs
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> OrderState {
        self.state
    }

    /// When the order was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the order last changed.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// When payment was confirmed, if it was.
    #[must_use]
    pub const fn paid_at(&self) -> Option<DateTime<Utc>> {
        self.paid_at
    }

    /// When the order reached a terminal state, if it has.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Whether the given user is the buyer.
    #[must_use]
    pub fn is_buyer(&self, user: UserId) -> bool {
        self.buyer == user
    }

    /// Whether the given user is the seller.
    #[must_use]
    pub fn is_seller(&self, user: UserId) -> bool {
        self.seller == user
    }

    /// Whether the given user is buyer or seller.
    #[must_use]
    pub fn is_participant(&self, user: UserId) -> bool {
        self.is_buyer(user) || self.is_seller(user)
    }

    /// Attaches a delivery proof reference.
    pub fn attach_proof(&mut self, proof: DeliveryProof) {
        self.proofs.push(proof);
        self.updated_at = Utc::now();
    }

    /// Moves the order along a legal edge and returns the audit record
    /// to append to the transition log.
    ///
    /// This validates the *edge* only; authorization is checked by the
    /// caller via [`crate::policy::authorize`] beforehand. Callers hold
    /// the order's exclusive lock around the whole sequence, so the
    /// current-state check here runs against the authoritative state.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] for a non-edge; the
    /// order is unchanged on error.
    pub fn transition(
        &mut self,
        to: OrderState,
        actor: &Actor,
        reason: impl Into<String>,
        origin: Option<String>,
    ) -> Result<TransitionRecord> {
        if !self.state.can_transition_to(to) {
            return Err(OrderError::InvalidTransition {
                from: self.state,
                to,
            });
        }

        let from = self.state;
        let now = Utc::now();
        self.state = to;
        self.updated_at = now;
        if to == OrderState::Paid {
            self.paid_at = Some(now);
        }
        if to.is_terminal() {
            self.completed_at = Some(now);
        }

        Ok(TransitionRecord::new(
            self.id,
            from,
            to,
            actor.user_id(),
            reason,
            origin,
        ))
    }
}

fn truncated(mut text: String, max: usize) -> String {
    if text.len() > max {
        let mut cut = max;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
    text
}
