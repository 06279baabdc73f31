//! Append-only transition log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use souq_core::{OrderId, TransitionId, UserId};

use crate::state::OrderState;

/// One entry in an order's immutable transition log.
///
/// Created exactly once per successful transition, never mutated or
/// deleted. The acting user is `None` for system-driven transitions
/// (payment confirmation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Unique record id.
    pub id: TransitionId,
    /// The order that transitioned.
    pub order_id: OrderId,
    /// State before the transition.
    pub from_state: OrderState,
    /// State after the transition.
    pub to_state: OrderState,
    /// The user who triggered the change, `None` for the system.
    pub actor: Option<UserId>,
    /// Why the transition happened.
    pub reason: String,
    /// Origin of the request (IP address), when known.
    pub origin: Option<String>,
    /// When the transition was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl TransitionRecord {
    /// Creates a record for a transition that just happened.
    #[must_use]
    pub fn new(
        order_id: OrderId,
        from_state: OrderState,
        to_state: OrderState,
        actor: Option<UserId>,
        reason: impl Into<String>,
        origin: Option<String>,
    ) -> Self {
        Self {
            id: TransitionId::new(),
            order_id,
            from_state,
            to_state,
            actor,
            reason: reason.into(),
            origin,
            recorded_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for TransitionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} -> {}",
            self.order_id, self.from_state, self.to_state
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_captures_transition() {
        let order_id = OrderId::new();
        let user = UserId::new();
        let record = TransitionRecord::new(
            order_id,
            OrderState::Delivered,
            OrderState::Confirmed,
            Some(user),
            "buyer confirmed delivery",
            Some("203.0.113.7".to_string()),
        );

        assert_eq!(record.order_id, order_id);
        assert_eq!(record.from_state, OrderState::Delivered);
        assert_eq!(record.to_state, OrderState::Confirmed);
        assert_eq!(record.actor, Some(user));
        assert_eq!(record.origin.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn system_record_has_no_actor() {
        let record = TransitionRecord::new(
            OrderId::new(),
            OrderState::Created,
            OrderState::Paid,
            None,
            "payment confirmed",
            None,
        );
        assert!(record.actor.is_none());
    }

    #[test]
    fn display_shows_edge() {
        let record = TransitionRecord::new(
            OrderId::new(),
            OrderState::Paid,
            OrderState::InProgress,
            None,
            "",
            None,
        );
        assert!(record.to_string().contains("PAID -> IN_PROGRESS"));
    }
}
