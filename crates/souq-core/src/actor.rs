//! Actor capability model.
//!
//! The trade core never reads credentials. Callers arrive as an opaque
//! [`Actor`]: either the system itself (payment confirmation and other
//! service-to-service paths) or a user carrying the capability flags the
//! identity collaborator resolved for them.
//!
//! The system path is an explicit variant rather than "no user present",
//! so a missing actor can never be mistaken for system authority.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// A reference to a marketplace user with resolved capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// The user's identity.
    pub id: UserId,
    /// Whether the user holds staff (adjudicator/admin) capability.
    pub is_staff: bool,
    /// Whether the account is active (not banned or deactivated).
    pub is_active: bool,
}

/// The party attempting an operation against the trade core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    /// A trusted service-to-service caller (e.g. the payment confirmation
    /// path). Carries no user identity.
    System,
    /// A marketplace user.
    User(UserRef),
}

impl Actor {
    /// Creates a system actor.
    #[must_use]
    pub const fn system() -> Self {
        Self::System
    }

    /// Creates an ordinary active user actor.
    #[must_use]
    pub const fn user(id: UserId) -> Self {
        Self::User(UserRef {
            id,
            is_staff: false,
            is_active: true,
        })
    }

    /// Creates an active staff actor.
    #[must_use]
    pub const fn staff(id: UserId) -> Self {
        Self::User(UserRef {
            id,
            is_staff: true,
            is_active: true,
        })
    }

    /// Whether this is the system actor.
    #[must_use]
    pub const fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }

    /// Whether this actor holds staff capability.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::User(user) if user.is_staff)
    }

    /// The acting user's id, if any (`None` for the system actor).
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::System => None,
            Self::User(user) => Some(user.id),
        }
    }

    /// Whether this actor is the given user.
    #[must_use]
    pub fn is_user(&self, id: UserId) -> bool {
        self.user_id() == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_actor_has_no_user() {
        let actor = Actor::system();
        assert!(actor.is_system());
        assert!(!actor.is_staff());
        assert!(actor.user_id().is_none());
    }

    #[test]
    fn plain_user_is_not_staff() {
        let id = UserId::new();
        let actor = Actor::user(id);
        assert!(!actor.is_system());
        assert!(!actor.is_staff());
        assert_eq!(actor.user_id(), Some(id));
        assert!(actor.is_user(id));
        assert!(!actor.is_user(UserId::new()));
    }

    #[test]
    fn staff_user_is_staff() {
        let actor = Actor::staff(UserId::new());
        assert!(actor.is_staff());
        assert!(!actor.is_system());
    }

    #[test]
    fn serde_roundtrip() {
        let actor = Actor::staff(UserId::new());
        let json = serde_json::to_string(&actor).expect("serialize");
        let parsed: Actor = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(actor, parsed);
    }
}
