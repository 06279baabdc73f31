//! Transition authorization policy.
//!
//! Authorization is attribute-based: each *target* state declares the
//! actor classes allowed to drive an order into it, colocated here with
//! the state machine rather than scattered across callers. The policy
//! reads only the order's party references and the actor's capability
//! flags; it never touches credentials.

use serde::{Deserialize, Serialize};
use souq_core::Actor;

use crate::error::{OrderError, Result};
use crate::order::Order;
use crate::state::OrderState;

/// A class of actor relative to one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorClass {
    /// The order's buyer.
    Buyer,
    /// The order's seller.
    Seller,
    /// Staff with adjudication authority.
    Admin,
    /// The system itself (service-to-service paths only).
    System,
}

/// The actor classes allowed to drive an order into `target`.
///
/// `CREATED` is never a transition target, so it allows nobody.
#[must_use]
pub const fn allowed_classes(target: OrderState) -> &'static [ActorClass] {
    use ActorClass::{Admin, Buyer, Seller, System};

    match target {
        OrderState::Created => &[],
        // Only the payment-confirmation path may mark an order paid.
        OrderState::Paid => &[System],
        OrderState::InProgress | OrderState::Delivered => &[Seller],
        OrderState::Confirmed => &[Buyer, Admin],
        OrderState::Disputed => &[Buyer, Seller],
        OrderState::Cancelled => &[Buyer, Seller, Admin],
        OrderState::Refunded => &[Admin],
    }
}

/// Checks that `actor` may drive `order` into `target`.
///
/// # Errors
///
/// Returns [`OrderError::Forbidden`] when the actor matches none of the
/// target state's allowed classes, or when the acting user's account is
/// deactivated.
pub fn authorize(order: &Order, actor: &Actor, target: OrderState) -> Result<()> {
    if let Actor::User(user) = actor {
        if !user.is_active {
            return Err(OrderError::forbidden("account is deactivated"));
        }
    }

    let matched = allowed_classes(target).iter().any(|class| match class {
        ActorClass::Buyer => actor
            .user_id()
            .is_some_and(|user| order.is_buyer(user)),
        ActorClass::Seller => actor
            .user_id()
            .is_some_and(|user| order.is_seller(user)),
        ActorClass::Admin => actor.is_staff(),
        ActorClass::System => actor.is_system(),
    });

    if matched {
        Ok(())
    } else {
        Err(OrderError::forbidden(format!(
            "actor may not move order {} to {target}",
            order.id()
        )))
    }
}
