//! The dispute resolution workflow.
//!
//! Participants escalate an order into dispute resolution, attach
//! evidence and messages, and an adjudicator settles the case with one
//! of a fixed set of rulings. Money-moving rulings drive the escrow
//! ledger and force the order transition in the same unit of work as the
//! decision record — a ruling that fails part-way (an over-sized split,
//! a ledger rejection) leaves the dispute open and nothing recorded.

use souq_audit::{AuditCategory, AuditEvent};
use souq_core::{Actor, Amount, DisputeId, OrderId, UserId};
use souq_disputes::{
    DecisionKind, Dispute, DisputeDecision, DisputeError, DisputeMessage, DisputeStatus,
    EvidenceItem, OpenerRole,
};
use souq_orders::{OrderError, OrderState};
use tracing::info;

use crate::error::{MarketError, Result};
use crate::service::{apply_transition, require_user, transition_event, MarketService};

/// An adjudicator ruling with its parameters.
#[derive(Debug, Clone)]
pub enum Ruling {
    /// Refund the full remaining balance to the buyer.
    RefundBuyer,
    /// Release the full remaining balance to the seller.
    ReleaseSeller,
    /// Split the remaining balance between the parties.
    PartialRefund {
        /// Share refunded to the buyer.
        buyer_amount: Amount,
        /// Share released to the seller.
        seller_amount: Amount,
    },
    /// Deactivate the seller's account and refund the buyer in full.
    BanSeller,
    /// Close the dispute without touching funds or order state.
    CloseNoAction,
}

impl Ruling {
    /// The decision kind this ruling records.
    #[must_use]
    pub const fn kind(&self) -> DecisionKind {
        match self {
            Self::RefundBuyer => DecisionKind::RefundBuyer,
            Self::ReleaseSeller => DecisionKind::ReleaseSeller,
            Self::PartialRefund { .. } => DecisionKind::PartialRefund,
            Self::BanSeller => DecisionKind::BanSeller,
            Self::CloseNoAction => DecisionKind::CloseNoAction,
        }
    }
}

/// An evidence reference submitted to a dispute.
#[derive(Debug, Clone)]
pub struct EvidenceSubmission {
    /// Opaque reference into the media store.
    pub reference: String,
    /// Declared content type of the upload.
    pub content_type: String,
    /// Upload size in bytes.
    pub size_bytes: u64,
    /// Optional free-form description.
    pub description: Option<String>,
}

impl MarketService {
    /// Opens a dispute against an order, forcing it into `DISPUTED`.
    ///
    /// # Errors
    ///
    /// Only a current participant may open a dispute; an order with an
    /// active dispute rejects a second one with `AlreadyExists`, and an
    /// order outside the dispute-eligible states rejects with
    /// `InvalidTransition`.
    pub async fn open_dispute(
        &self,
        actor: &Actor,
        order_id: OrderId,
        reason: &str,
        description: &str,
        origin: Option<String>,
    ) -> Result<Dispute> {
        let user_id = require_user(actor, "only a trade participant may open a dispute")?;

        let (dispute, events) = self
            .mutate(order_id, |trade| {
                if !trade.order.is_participant(user_id) {
                    return Err(OrderError::forbidden(
                        "only a trade participant may open a dispute",
                    )
                    .into());
                }
                if trade.active_dispute().is_some() {
                    return Err(MarketError::ActiveDisputeExists { order: order_id });
                }

                let record = apply_transition(
                    trade,
                    actor,
                    OrderState::Disputed,
                    &format!("dispute opened: {reason}"),
                    origin.clone(),
                )?;

                let role = if trade.order.is_buyer(user_id) {
                    OpenerRole::Buyer
                } else {
                    OpenerRole::Seller
                };
                let dispute = Dispute::open(order_id, user_id, role, reason, description);

                let events = vec![
                    transition_event(&record),
                    AuditEvent::new(AuditCategory::Dispute, "dispute.open", dispute.id())
                        .with_actor(Some(user_id))
                        .with_metadata("order", serde_json::json!(order_id.to_string()))
                        .with_metadata("reason", serde_json::json!(reason)),
                ];
                trade.disputes.push(dispute.clone());
                Ok((dispute, events))
            })
            .await?;

        self.store().register_dispute(dispute.id(), order_id);
        info!(dispute = %dispute.id(), order = %order_id, "dispute opened");
        self.emit(events);
        Ok(dispute)
    }

    /// Assigns a dispute to an adjudicator, moving it to `IN_REVIEW`.
    pub async fn assign_dispute(&self, admin: &Actor, dispute_id: DisputeId) -> Result<Dispute> {
        let admin_id = require_staff(admin)?;
        let order_id = self.store().order_for_dispute(dispute_id)?;

        let (dispute, events) = self
            .mutate(order_id, |trade| {
                let dispute = trade
                    .dispute_mut(dispute_id)
                    .ok_or(MarketError::DisputeNotFound { id: dispute_id })?;
                dispute.assign(admin_id)?;
                let events = vec![
                    AuditEvent::new(AuditCategory::Dispute, "dispute.assign", dispute_id)
                        .with_actor(Some(admin_id)),
                ];
                Ok((dispute.clone(), events))
            })
            .await?;

        self.emit(events);
        Ok(dispute)
    }

    /// Attaches evidence to an open or in-review dispute.
    ///
    /// Participants and staff may submit; anyone else is rejected.
    pub async fn submit_evidence(
        &self,
        actor: &Actor,
        dispute_id: DisputeId,
        submission: EvidenceSubmission,
    ) -> Result<EvidenceItem> {
        let user_id = require_user(actor, "only a user may submit evidence")?;
        let order_id = self.store().order_for_dispute(dispute_id)?;

        self.mutate(order_id, |trade| {
            if !(trade.order.is_participant(user_id) || actor.is_staff()) {
                return Err(
                    OrderError::forbidden("you cannot submit evidence to this dispute").into(),
                );
            }
            let item = EvidenceItem::new(
                user_id,
                submission.reference.clone(),
                submission.content_type.clone(),
                submission.size_bytes,
                submission.description.clone(),
            );
            trade
                .dispute_mut(dispute_id)
                .ok_or(MarketError::DisputeNotFound { id: dispute_id })?
                .add_evidence(item.clone())?;
            Ok(item)
        })
        .await
    }

    /// Posts a message to a dispute thread.
    ///
    /// Participants and staff may post; `internal` notes are staff-only
    /// and invisible to participants.
    pub async fn post_message(
        &self,
        actor: &Actor,
        dispute_id: DisputeId,
        body: &str,
        internal: bool,
    ) -> Result<DisputeMessage> {
        let user_id = require_user(actor, "only a user may post dispute messages")?;
        if internal && !actor.is_staff() {
            return Err(OrderError::forbidden("only staff may post internal notes").into());
        }
        let order_id = self.store().order_for_dispute(dispute_id)?;

        self.mutate(order_id, |trade| {
            if !(trade.order.is_participant(user_id) || actor.is_staff()) {
                return Err(
                    OrderError::forbidden("you cannot post messages in this dispute").into(),
                );
            }
            let message = DisputeMessage::new(user_id, body, internal);
            trade
                .dispute_mut(dispute_id)
                .ok_or(MarketError::DisputeNotFound { id: dispute_id })?
                .add_message(message.clone())?;
            Ok(message)
        })
        .await
    }

    /// The dispute thread as the actor is allowed to see it: staff get
    /// the full thread, participants get internal notes filtered out.
    pub async fn dispute_messages(
        &self,
        actor: &Actor,
        dispute_id: DisputeId,
    ) -> Result<Vec<DisputeMessage>> {
        let user_id = require_user(actor, "only a user may read dispute messages")?;
        let order_id = self.store().order_for_dispute(dispute_id)?;
        let staff = actor.is_staff();

        self.store()
            .read(order_id, |trade| {
                if !(trade.order.is_participant(user_id) || staff) {
                    return Err(
                        OrderError::forbidden("you cannot view this dispute").into(),
                    );
                }
                let dispute = trade
                    .dispute(dispute_id)
                    .ok_or(MarketError::DisputeNotFound { id: dispute_id })?;
                let messages = if staff {
                    dispute.all_messages().to_vec()
                } else {
                    dispute.participant_messages().into_iter().cloned().collect()
                };
                Ok(messages)
            })
            .await?
    }

    /// Fetches a dispute snapshot by id.
    pub async fn dispute(&self, dispute_id: DisputeId) -> Result<Dispute> {
        let order_id = self.store().order_for_dispute(dispute_id)?;
        self.store()
            .read(order_id, |trade| trade.dispute(dispute_id).cloned())
            .await?
            .ok_or(MarketError::DisputeNotFound { id: dispute_id })
    }

    /// Applies an adjudicator ruling.
    ///
    /// The decision record, the dispute settlement, any ledger movement,
    /// and the forced order transition commit together or not at all.
    /// Once a dispute is `RESOLVED` or `CLOSED` no further ruling can be
    /// recorded.
    pub async fn decide(
        &self,
        admin: &Actor,
        dispute_id: DisputeId,
        ruling: Ruling,
        reason: &str,
        origin: Option<String>,
    ) -> Result<DisputeDecision> {
        let admin_id = require_staff(admin)?;
        let order_id = self.store().order_for_dispute(dispute_id)?;

        let (decision, events) = self
            .mutate(order_id, |trade| {
                // Exclusivity check under the lock, before any side effect.
                {
                    let dispute = trade
                        .dispute(dispute_id)
                        .ok_or(MarketError::DisputeNotFound { id: dispute_id })?;
                    if !dispute.is_active() {
                        return Err(DisputeError::AlreadyDecided {
                            status: dispute.status(),
                        }
                        .into());
                    }
                }

                let mut events = Vec::new();
                let transition_reason = format!("adjudicator decision: {reason}");

                let decision = match &ruling {
                    Ruling::RefundBuyer => {
                        let refunded = trade.escrow_mut()?.refund(None)?;
                        let record = apply_transition(
                            trade,
                            admin,
                            OrderState::Refunded,
                            &transition_reason,
                            origin.clone(),
                        )?;
                        events.push(transition_event(&record));
                        events.push(payment_event("escrow.refund", order_id, refunded, admin_id));
                        DisputeDecision::new(
                            DecisionKind::RefundBuyer,
                            admin_id,
                            reason,
                            origin.clone(),
                        )
                    }
                    Ruling::ReleaseSeller => {
                        let released = trade.escrow_mut()?.release(None)?;
                        let record = apply_transition(
                            trade,
                            admin,
                            OrderState::Confirmed,
                            &transition_reason,
                            origin.clone(),
                        )?;
                        events.push(transition_event(&record));
                        events.push(payment_event("escrow.release", order_id, released, admin_id));
                        DisputeDecision::new(
                            DecisionKind::ReleaseSeller,
                            admin_id,
                            reason,
                            origin.clone(),
                        )
                    }
                    Ruling::PartialRefund {
                        buyer_amount,
                        seller_amount,
                    } => {
                        trade.escrow_mut()?.split(*buyer_amount, *seller_amount)?;
                        let record = apply_transition(
                            trade,
                            admin,
                            OrderState::Refunded,
                            &transition_reason,
                            origin.clone(),
                        )?;
                        events.push(transition_event(&record));
                        events.push(payment_event(
                            "escrow.split",
                            order_id,
                            buyer_amount.saturating_add(*seller_amount),
                            admin_id,
                        ));
                        DisputeDecision::partial(
                            *buyer_amount,
                            *seller_amount,
                            admin_id,
                            reason,
                            origin.clone(),
                        )
                    }
                    Ruling::BanSeller => {
                        let seller = trade.order.seller();
                        let refunded = trade.escrow_mut()?.refund(None)?;
                        let record = apply_transition(
                            trade,
                            admin,
                            OrderState::Refunded,
                            &transition_reason,
                            origin.clone(),
                        )?;
                        // Collaborator call runs inside the unit of work:
                        // a failure aborts the whole ruling.
                        self.accounts().deactivate(seller)?;
                        events.push(transition_event(&record));
                        events.push(payment_event("escrow.refund", order_id, refunded, admin_id));
                        events.push(
                            AuditEvent::new(
                                AuditCategory::AdminAction,
                                "account.deactivate",
                                seller,
                            )
                            .with_actor(Some(admin_id)),
                        );
                        DisputeDecision::new(
                            DecisionKind::BanSeller,
                            admin_id,
                            reason,
                            origin.clone(),
                        )
                    }
                    Ruling::CloseNoAction => DisputeDecision::new(
                        DecisionKind::CloseNoAction,
                        admin_id,
                        reason,
                        origin.clone(),
                    ),
                };

                let final_status = match ruling.kind() {
                    DecisionKind::CloseNoAction => DisputeStatus::Closed,
                    _ => DisputeStatus::Resolved,
                };
                trade
                    .dispute_mut(dispute_id)
                    .ok_or(MarketError::DisputeNotFound { id: dispute_id })?
                    .settle(decision.clone(), final_status)?;

                events.push(
                    AuditEvent::new(AuditCategory::AdminAction, "dispute.decision", dispute_id)
                        .with_actor(Some(admin_id))
                        .with_metadata("kind", serde_json::json!(decision.kind.as_str()))
                        .with_metadata("reason", serde_json::json!(reason)),
                );
                Ok((decision, events))
            })
            .await?;

        info!(
            dispute = %dispute_id,
            order = %order_id,
            kind = %decision.kind,
            "dispute decided"
        );
        self.emit(events);
        Ok(decision)
    }
}

fn payment_event(action: &str, order_id: OrderId, amount: Amount, admin: UserId) -> AuditEvent {
    AuditEvent::new(AuditCategory::Payment, action, order_id)
        .with_actor(Some(admin))
        .with_metadata("amount", serde_json::json!(amount.to_string()))
}

/// Requires an active staff actor.
fn require_staff(actor: &Actor) -> Result<UserId> {
    let user_id = require_user(actor, "only staff may act on disputes")?;
    if actor.is_staff() {
        Ok(user_id)
    } else {
        Err(OrderError::forbidden("only staff may act on disputes").into())
    }
}
