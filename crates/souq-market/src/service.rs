//! The order lifecycle service.
//!
//! Every mutation follows the same discipline: acquire the order's
//! exclusive lock, re-validate against the authoritative state, apply the
//! state transition and any ledger movement to a working copy, and commit
//! all-or-nothing. Audit events are emitted only after the commit and
//! never affect the outcome.

use std::sync::Arc;

use chrono::Utc;
use souq_audit::{AuditCategory, AuditEvent, AuditSink};
use souq_core::{Actor, ListingId, OrderId, UserId};
use souq_escrow::EscrowAccount;
use souq_orders::{
    policy, DeliveryProof, NewOrder, Order, OrderError, OrderState, ProofKind, TransitionRecord,
};
use tracing::{info, warn};

use crate::accounts::AccountDirectory;
use crate::config::MarketConfig;
use crate::error::{MarketError, Result};
use crate::listing::ListingDirectory;
use crate::store::{Trade, TradeStore};

/// A delivery proof reference submitted by the seller.
#[derive(Debug, Clone)]
pub struct ProofSubmission {
    /// Opaque reference into the media store.
    pub reference: String,
    /// What the reference points at.
    pub kind: ProofKind,
    /// Optional free-form description.
    pub description: Option<String>,
}

/// Orchestrates the order state machine, the escrow ledger, and the
/// dispute workflow over the shared trade store.
pub struct MarketService {
    config: MarketConfig,
    store: TradeStore,
    listings: Arc<dyn ListingDirectory>,
    accounts: Arc<dyn AccountDirectory>,
    audit: Arc<dyn AuditSink>,
}

impl MarketService {
    /// Creates a service over the given collaborators.
    #[must_use]
    pub fn new(
        config: MarketConfig,
        listings: Arc<dyn ListingDirectory>,
        accounts: Arc<dyn AccountDirectory>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let store = TradeStore::new(config.lock_timeout);
        Self {
            config,
            store,
            listings,
            accounts,
            audit,
        }
    }

    /// The service configuration.
    #[must_use]
    pub const fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub(crate) const fn store(&self) -> &TradeStore {
        &self.store
    }

    pub(crate) fn accounts(&self) -> &dyn AccountDirectory {
        self.accounts.as_ref()
    }

    /// Creates an order against a listing, freezing its economics and
    /// reserving stock.
    ///
    /// The stock reservation is a conditional decrement: if concurrent
    /// buyers exhausted the listing first, the whole creation fails and
    /// no order exists.
    ///
    /// # Errors
    ///
    /// Rejects system callers, self-purchase, unavailable listings,
    /// quantities outside the listing's bounds, and exhausted stock.
    pub async fn create_order(
        &self,
        buyer: &Actor,
        listing_id: ListingId,
        quantity: u32,
        buyer_notes: Option<String>,
    ) -> Result<Order> {
        let buyer_id = require_user(buyer, "only a user may place an order")?;

        let listing = self.listings.get(listing_id)?;
        let total = listing
            .unit_price
            .checked_mul(u64::from(quantity))
            .ok_or(OrderError::AmountOverflow)?;
        let platform_fee = total.basis_points(self.config.platform_fee_bps);

        let order = Order::create(NewOrder {
            buyer: buyer_id,
            seller: listing.seller,
            listing: listing_id,
            quantity,
            unit_price: listing.unit_price,
            platform_fee,
            delivery_method: listing.delivery_method.clone(),
            buyer_notes,
        })?;

        self.listings.reserve_stock(listing_id, quantity)?;
        let order_id = self.store.insert(Trade::new(order.clone()));

        info!(
            order = %order_id,
            listing = %listing_id,
            buyer = %buyer_id,
            total = %order.total_amount(),
            "order created"
        );
        self.emit(vec![
            AuditEvent::new(AuditCategory::Order, "order.create", order_id)
                .with_actor(Some(buyer_id))
                .with_metadata("listing", serde_json::json!(listing_id.to_string()))
                .with_metadata("quantity", serde_json::json!(quantity))
                .with_metadata("total", serde_json::json!(order.total_amount().to_string())),
        ]);
        Ok(order)
    }

    /// Marks an order paid and opens its escrow account. System-only:
    /// this is the payment-confirmation path.
    ///
    /// # Errors
    ///
    /// Rejects non-system actors, orders not in `CREATED`, and duplicate
    /// escrow creation.
    pub async fn mark_paid(
        &self,
        actor: &Actor,
        order_id: OrderId,
        origin: Option<String>,
    ) -> Result<Order> {
        let (order, events) = self
            .mutate(order_id, |trade| {
                if trade.escrow.is_some() {
                    return Err(MarketError::EscrowExists { order: order_id });
                }
                let record = apply_transition(
                    trade,
                    actor,
                    OrderState::Paid,
                    "payment confirmed by gateway",
                    origin.clone(),
                )?;
                let escrow = EscrowAccount::open(order_id, trade.order.total_amount())?;

                let events = vec![
                    transition_event(&record),
                    AuditEvent::new(AuditCategory::Payment, "escrow.hold", order_id)
                        .with_metadata(
                            "amount_held",
                            serde_json::json!(escrow.amount_held().to_string()),
                        ),
                ];
                trade.escrow = Some(escrow);
                Ok((trade.order.clone(), events))
            })
            .await?;

        info!(order = %order_id, "order paid, escrow opened");
        self.emit(events);
        Ok(order)
    }

    /// Seller starts working on a paid order.
    pub async fn start_order(
        &self,
        seller: &Actor,
        order_id: OrderId,
        origin: Option<String>,
    ) -> Result<Order> {
        let (order, events) = self
            .mutate(order_id, |trade| {
                let record = apply_transition(
                    trade,
                    seller,
                    OrderState::InProgress,
                    "seller started working on order",
                    origin.clone(),
                )?;
                Ok((trade.order.clone(), vec![transition_event(&record)]))
            })
            .await?;

        self.emit(events);
        Ok(order)
    }

    /// Seller delivers the order, attaching proof references.
    pub async fn deliver_order(
        &self,
        seller: &Actor,
        order_id: OrderId,
        proofs: Vec<ProofSubmission>,
        origin: Option<String>,
    ) -> Result<Order> {
        let seller_id = require_user(seller, "only the seller may deliver")?;

        let (order, events) = self
            .mutate(order_id, |trade| {
                let record = apply_transition(
                    trade,
                    seller,
                    OrderState::Delivered,
                    "seller uploaded delivery proof",
                    origin.clone(),
                )?;
                for proof in proofs.clone() {
                    trade.order.attach_proof(DeliveryProof {
                        reference: proof.reference,
                        kind: proof.kind,
                        description: proof.description,
                        uploaded_by: seller_id,
                        uploaded_at: Utc::now(),
                    });
                }
                let events = vec![transition_event(&record)
                    .with_metadata("proof_count", serde_json::json!(proofs.len()))];
                Ok((trade.order.clone(), events))
            })
            .await?;

        self.emit(events);
        Ok(order)
    }

    /// Buyer confirms delivery; the full remaining escrow balance is
    /// released to the seller in the same unit of work.
    ///
    /// # Errors
    ///
    /// A ledger failure rolls the state transition back: no state change
    /// wins while money movement fails.
    pub async fn confirm_delivery(
        &self,
        buyer: &Actor,
        order_id: OrderId,
        origin: Option<String>,
    ) -> Result<Order> {
        let (order, events) = self
            .mutate(order_id, |trade| {
                let record = apply_transition(
                    trade,
                    buyer,
                    OrderState::Confirmed,
                    "buyer confirmed delivery",
                    origin.clone(),
                )?;
                let escrow = trade.escrow_mut()?;
                let released = escrow.release(None)?;

                let events = vec![
                    transition_event(&record),
                    AuditEvent::new(AuditCategory::Payment, "escrow.release", order_id)
                        .with_actor(record.actor)
                        .with_metadata("amount", serde_json::json!(released.to_string())),
                ];
                Ok((trade.order.clone(), events))
            })
            .await?;

        info!(order = %order_id, "delivery confirmed, escrow released");
        self.emit(events);
        Ok(order)
    }

    /// Cancels an order. A funded order refunds the buyer in full; an
    /// order cancelled before work started returns its reserved stock.
    pub async fn cancel_order(
        &self,
        actor: &Actor,
        order_id: OrderId,
        reason: &str,
        origin: Option<String>,
    ) -> Result<Order> {
        let (order, events, restock) = self
            .mutate(order_id, |trade| {
                let before = trade.order.state();
                let record =
                    apply_transition(trade, actor, OrderState::Cancelled, reason, origin.clone())?;
                let mut events = vec![transition_event(&record)];

                if let Some(escrow) = trade.escrow.as_mut() {
                    if !escrow.remaining().is_zero() {
                        let refunded = escrow.refund(None)?;
                        events.push(
                            AuditEvent::new(AuditCategory::Payment, "escrow.refund", order_id)
                                .with_actor(record.actor)
                                .with_metadata("amount", serde_json::json!(refunded.to_string())),
                        );
                    }
                }

                // Work never started, so the stock goes back on sale.
                let restock = matches!(before, OrderState::Created | OrderState::Paid);
                Ok((trade.order.clone(), events, restock))
            })
            .await?;

        if restock {
            if let Err(err) = self.listings.release_stock(order.listing(), order.quantity()) {
                warn!(order = %order_id, "failed to restock listing after cancellation: {err}");
            }
        }
        self.emit(events);
        Ok(order)
    }

    /// Fetches the order record.
    pub async fn order(&self, order_id: OrderId) -> Result<Order> {
        self.store.read(order_id, |trade| trade.order.clone()).await
    }

    /// Fetches the order's escrow account.
    pub async fn escrow(&self, order_id: OrderId) -> Result<EscrowAccount> {
        self.store
            .read(order_id, |trade| trade.escrow.clone())
            .await?
            .ok_or(MarketError::EscrowNotFound { order: order_id })
    }

    /// Fetches the order's transition log, oldest first.
    pub async fn transition_log(&self, order_id: OrderId) -> Result<Vec<TransitionRecord>> {
        self.store
            .read(order_id, |trade| trade.transitions.clone())
            .await
    }

    /// Runs a mutation with a bounded retry on retryable failures
    /// (lock contention).
    pub(crate) async fn mutate<T, F>(&self, order_id: OrderId, f: F) -> Result<T>
    where
        F: Fn(&mut Trade) -> Result<T>,
    {
        let mut attempts = 0;
        loop {
            match self.store.with_trade(order_id, &f).await {
                Err(err) if err.is_retryable() && attempts < self.config.conflict_retries => {
                    attempts += 1;
                    warn!(order = %order_id, attempt = attempts, "retrying after conflict: {err}");
                }
                outcome => return outcome,
            }
        }
    }

    /// Emits audit events after a committed mutation. Fire-and-forget:
    /// sinks cannot fail the business transaction.
    pub(crate) fn emit(&self, events: Vec<AuditEvent>) {
        for event in &events {
            self.audit.record(event);
        }
    }
}

impl std::fmt::Debug for MarketService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Authorizes and applies one transition under the trade lock, appending
/// the audit record to the transition log.
pub(crate) fn apply_transition(
    trade: &mut Trade,
    actor: &Actor,
    to: OrderState,
    reason: &str,
    origin: Option<String>,
) -> Result<TransitionRecord> {
    policy::authorize(&trade.order, actor, to)?;
    let record = trade.order.transition(to, actor, reason, origin)?;
    trade.transitions.push(record.clone());
    Ok(record)
}

/// Builds the audit event for a committed transition.
pub(crate) fn transition_event(record: &TransitionRecord) -> AuditEvent {
    AuditEvent::new(AuditCategory::Order, "order.transition", record.order_id)
        .with_actor(record.actor)
        .with_states(record.from_state, record.to_state)
        .with_metadata("reason", serde_json::json!(record.reason.clone()))
}

/// Requires a user actor (any active user), rejecting the system path.
pub(crate) fn require_user(actor: &Actor, context: &str) -> Result<UserId> {
    match actor {
        Actor::User(user) if user.is_active => Ok(user.id),
        Actor::User(_) => Err(OrderError::forbidden("account is deactivated").into()),
        Actor::System => Err(OrderError::forbidden(context).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use souq_core::UserRef;

    #[test]
    fn require_user_rejects_system_and_inactive() {
        assert!(require_user(&Actor::user(UserId::new()), "ctx").is_ok());

        let err = require_user(&Actor::system(), "only users here").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Forbidden);
        assert!(err.to_string().contains("only users here"));

        let banned = Actor::User(UserRef {
            id: UserId::new(),
            is_staff: false,
            is_active: false,
        });
        assert_eq!(require_user(&banned, "ctx").unwrap_err().kind(), FailureKind::Forbidden);
    }

    #[test]
    fn transition_event_mirrors_record() {
        let record = TransitionRecord::new(
            OrderId::new(),
            OrderState::Paid,
            OrderState::InProgress,
            Some(UserId::new()),
            "seller started working on order",
            None,
        );
        let event = transition_event(&record);
        assert_eq!(event.action, "order.transition");
        assert_eq!(event.actor, record.actor);
        assert_eq!(event.before_state.as_deref(), Some("PAID"));
        assert_eq!(event.after_state.as_deref(), Some("IN_PROGRESS"));
    }
}
