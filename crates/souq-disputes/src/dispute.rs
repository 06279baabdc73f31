//! The dispute ticket and its status graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use souq_core::{DisputeId, OrderId, UserId};

use crate::decision::DisputeDecision;
use crate::error::{DisputeError, Result};
use crate::evidence::{DisputeMessage, EvidenceItem};

/// Maximum stored length of the short reason.
const MAX_REASON_LEN: usize = 100;

/// Maximum stored length of the detailed description.
const MAX_DESCRIPTION_LEN: usize = 2_000;

/// Workflow status of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeStatus {
    /// Filed, waiting for an adjudicator.
    Open,
    /// An adjudicator has taken the case.
    InReview,
    /// Settled by a ruling (terminal).
    Resolved,
    /// Closed without action (terminal).
    Closed,
}

impl DisputeStatus {
    /// Whether this status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }

    /// Returns the canonical string representation of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InReview => "IN_REVIEW",
            Self::Resolved => "RESOLVED",
            Self::Closed => "CLOSED",
        }
    }
}

impl std::fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which side of the trade opened the dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenerRole {
    /// Opened by the buyer.
    Buyer,
    /// Opened by the seller.
    Seller,
}

/// A dispute ticket against one order.
///
/// Decisions are exclusive: any number may be *drafted* upstream, but
/// only one is ever recorded, and recording it settles the ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispute {
    id: DisputeId,
    order_id: OrderId,
    opened_by: UserId,
    opener_role: OpenerRole,
    reason: String,
    description: String,
    status: DisputeStatus,
    assigned_to: Option<UserId>,
    evidence: Vec<EvidenceItem>,
    messages: Vec<DisputeMessage>,
    decisions: Vec<DisputeDecision>,
    opened_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
}

impl Dispute {
    /// Opens a new dispute in the `OPEN` status.
    #[must_use]
    pub fn open(
        order_id: OrderId,
        opened_by: UserId,
        opener_role: OpenerRole,
        reason: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: DisputeId::new(),
            order_id,
            opened_by,
            opener_role,
            reason: bounded(reason.into(), MAX_REASON_LEN),
            description: bounded(description.into(), MAX_DESCRIPTION_LEN),
            status: DisputeStatus::Open,
            assigned_to: None,
            evidence: Vec::new(),
            messages: Vec::new(),
            decisions: Vec::new(),
            opened_at: now,
            updated_at: now,
            resolved_at: None,
        }
    }

    /// Unique dispute id.
    #[must_use]
    pub const fn id(&self) -> DisputeId {
        self.id
    }

    /// The order this dispute was opened against.
    #[must_use]
    pub const fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// Who opened the dispute.
    #[must_use]
    pub const fn opened_by(&self) -> UserId {
        self.opened_by
    }

    /// Which side of the trade opened it.
    #[must_use]
    pub const fn opener_role(&self) -> OpenerRole {
        self.opener_role
    }

    /// Short reason given at opening.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Detailed description given at opening.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Current workflow status.
    #[must_use]
    pub const fn status(&self) -> DisputeStatus {
        self.status
    }

    /// The adjudicator the case is assigned to, if any.
    #[must_use]
    pub const fn assigned_to(&self) -> Option<UserId> {
        self.assigned_to
    }

    /// Evidence attached so far.
    #[must_use]
    pub fn evidence(&self) -> &[EvidenceItem] {
        &self.evidence
    }

    /// The decision that settled this dispute, if it is settled.
    #[must_use]
    pub fn decision(&self) -> Option<&DisputeDecision> {
        self.decisions.last()
    }

    /// When the dispute was opened.
    #[must_use]
    pub const fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// When the dispute was resolved, if it was.
    #[must_use]
    pub const fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    /// Whether the dispute still blocks the order (not yet settled).
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, DisputeStatus::Open | DisputeStatus::InReview)
    }

    /// The full message thread, adjudicator view.
    #[must_use]
    pub fn all_messages(&self) -> &[DisputeMessage] {
        &self.messages
    }

    /// The message thread as a participant sees it: internal
    /// adjudicator notes are filtered out.
    #[must_use]
    pub fn participant_messages(&self) -> Vec<&DisputeMessage> {
        self.messages.iter().filter(|m| !m.internal).collect()
    }

    /// Assigns the case to an adjudicator, moving `OPEN -> IN_REVIEW`.
    /// Reassignment while in review is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`DisputeError::Inactive`] once the dispute is settled.
    pub fn assign(&mut self, adjudicator: UserId) -> Result<()> {
        if !self.is_active() {
            return Err(DisputeError::Inactive {
                status: self.status,
            });
        }
        self.assigned_to = Some(adjudicator);
        self.status = DisputeStatus::InReview;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Attaches an evidence item.
    ///
    /// # Errors
    ///
    /// Returns [`DisputeError::Inactive`] once the dispute is settled.
    pub fn add_evidence(&mut self, item: EvidenceItem) -> Result<()> {
        if !self.is_active() {
            return Err(DisputeError::Inactive {
                status: self.status,
            });
        }
        self.evidence.push(item);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Appends a message to the thread.
    ///
    /// # Errors
    ///
    /// Returns [`DisputeError::Inactive`] once the dispute is settled.
    pub fn add_message(&mut self, message: DisputeMessage) -> Result<()> {
        if !self.is_active() {
            return Err(DisputeError::Inactive {
                status: self.status,
            });
        }
        self.messages.push(message);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Records the settling decision and moves the dispute to its
    /// terminal status.
    ///
    /// # Errors
    ///
    /// Returns [`DisputeError::AlreadyDecided`] if the dispute is already
    /// settled, or [`DisputeError::NotASettlement`] if `final_status` is
    /// not terminal. The dispute is unchanged on error.
    pub fn settle(&mut self, decision: DisputeDecision, final_status: DisputeStatus) -> Result<()> {
        if !self.is_active() {
            return Err(DisputeError::AlreadyDecided {
                status: self.status,
            });
        }
        if !final_status.is_terminal() {
            return Err(DisputeError::NotASettlement {
                status: final_status,
            });
        }

        self.decisions.push(decision);
        self.status = final_status;
        let now = Utc::now();
        self.updated_at = now;
        if final_status == DisputeStatus::Resolved {
            self.resolved_at = Some(now);
        }
        Ok(())
    }
}

fn bounded(mut text: String, max: usize) -> String {
    if text.len() > max {
        let mut cut = max;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::DecisionKind;

    fn dispute() -> Dispute {
        Dispute::open(
            OrderId::new(),
            UserId::new(),
            OpenerRole::Buyer,
            "item never arrived",
            "paid three days ago, seller stopped responding",
        )
    }

    #[test]
    fn opens_in_open_status() {
        let dispute = dispute();
        assert_eq!(dispute.status(), DisputeStatus::Open);
        assert!(dispute.is_active());
        assert!(dispute.assigned_to().is_none());
        assert!(dispute.decision().is_none());
    }

    #[test]
    fn reason_and_description_are_bounded() {
        let dispute = Dispute::open(
            OrderId::new(),
            UserId::new(),
            OpenerRole::Seller,
            "r".repeat(500),
            "d".repeat(10_000),
        );
        assert_eq!(dispute.reason().len(), 100);
        assert_eq!(dispute.description().len(), 2_000);
    }

    #[test]
    fn assign_moves_to_in_review() {
        let mut dispute = dispute();
        let admin = UserId::new();
        dispute.assign(admin).expect("assign");
        assert_eq!(dispute.status(), DisputeStatus::InReview);
        assert_eq!(dispute.assigned_to(), Some(admin));

        // Reassignment while in review is fine.
        let other = UserId::new();
        dispute.assign(other).expect("reassign");
        assert_eq!(dispute.assigned_to(), Some(other));
    }

    #[test]
    fn evidence_and_messages_accepted_while_active() {
        let mut dispute = dispute();
        dispute
            .add_evidence(EvidenceItem::new(
                dispute.opened_by(),
                "evidence/shot.png",
                "image/png",
                2_048,
                None,
            ))
            .expect("evidence");
        dispute
            .add_message(DisputeMessage::new(dispute.opened_by(), "see attached", false))
            .expect("message");

        assert_eq!(dispute.evidence().len(), 1);
        assert_eq!(dispute.all_messages().len(), 1);
    }

    #[test]
    fn internal_messages_hidden_from_participants() {
        let mut dispute = dispute();
        let admin = UserId::new();
        dispute
            .add_message(DisputeMessage::new(dispute.opened_by(), "hello", false))
            .expect("participant message");
        dispute
            .add_message(DisputeMessage::new(admin, "seller has two prior bans", true))
            .expect("internal note");

        assert_eq!(dispute.all_messages().len(), 2);
        let visible = dispute.participant_messages();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].body, "hello");
    }

    #[test]
    fn settle_resolves_and_timestamps() {
        let mut dispute = dispute();
        let admin = UserId::new();
        dispute
            .settle(
                DisputeDecision::new(DecisionKind::RefundBuyer, admin, "seller no-show", None),
                DisputeStatus::Resolved,
            )
            .expect("settle");

        assert_eq!(dispute.status(), DisputeStatus::Resolved);
        assert!(dispute.resolved_at().is_some());
        assert!(!dispute.is_active());
        assert_eq!(dispute.decision().map(|d| d.kind), Some(DecisionKind::RefundBuyer));
    }

    #[test]
    fn close_without_action_has_no_resolved_at() {
        let mut dispute = dispute();
        dispute
            .settle(
                DisputeDecision::new(DecisionKind::CloseNoAction, UserId::new(), "stale", None),
                DisputeStatus::Closed,
            )
            .expect("close");
        assert_eq!(dispute.status(), DisputeStatus::Closed);
        assert!(dispute.resolved_at().is_none());
    }

    #[test]
    fn decisions_are_exclusive() {
        let mut dispute = dispute();
        let admin = UserId::new();
        dispute
            .settle(
                DisputeDecision::new(DecisionKind::ReleaseSeller, admin, "delivered fine", None),
                DisputeStatus::Resolved,
            )
            .expect("first decision");

        let err = dispute
            .settle(
                DisputeDecision::new(DecisionKind::RefundBuyer, admin, "changed my mind", None),
                DisputeStatus::Resolved,
            )
            .unwrap_err();
        assert_eq!(
            err,
            DisputeError::AlreadyDecided {
                status: DisputeStatus::Resolved,
            }
        );
        assert_eq!(dispute.decision().map(|d| d.kind), Some(DecisionKind::ReleaseSeller));
    }

    #[test]
    fn settle_rejects_non_terminal_target() {
        let mut dispute = dispute();
        let err = dispute
            .settle(
                DisputeDecision::new(DecisionKind::RefundBuyer, UserId::new(), "", None),
                DisputeStatus::InReview,
            )
            .unwrap_err();
        assert!(matches!(err, DisputeError::NotASettlement { .. }));
        assert!(dispute.is_active());
        assert!(dispute.decision().is_none());
    }

    #[test]
    fn settled_dispute_rejects_submissions() {
        let mut dispute = dispute();
        dispute
            .settle(
                DisputeDecision::new(DecisionKind::CloseNoAction, UserId::new(), "", None),
                DisputeStatus::Closed,
            )
            .expect("close");

        assert!(dispute.assign(UserId::new()).is_err());
        assert!(dispute
            .add_message(DisputeMessage::new(UserId::new(), "too late", false))
            .is_err());
        assert!(dispute
            .add_evidence(EvidenceItem::new(UserId::new(), "ref", "text/plain", 1, None))
            .is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let mut dispute = dispute();
        dispute.assign(UserId::new()).expect("assign");
        let json = serde_json::to_string(&dispute).expect("serialize");
        let parsed: Dispute = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.id(), dispute.id());
        assert_eq!(parsed.status(), DisputeStatus::InReview);
    }
}
