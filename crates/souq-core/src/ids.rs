//! Typed identifiers for trade-core entities.
//!
//! Every aggregate gets its own UUID-backed newtype so ids cannot be mixed
//! up across entity boundaries.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random id.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id! {
    /// Identifies one order (a single trade instance).
    OrderId
}

entity_id! {
    /// Identifies a marketplace participant or staff member.
    UserId
}

entity_id! {
    /// Identifies a marketplace listing.
    ListingId
}

entity_id! {
    /// Identifies a dispute opened against an order.
    DisputeId
}

entity_id! {
    /// Identifies one evidence item attached to a dispute.
    EvidenceId
}

entity_id! {
    /// Identifies one message in a dispute thread.
    MessageId
}

entity_id! {
    /// Identifies one adjudicator decision record.
    DecisionId
}

entity_id! {
    /// Identifies one entry in an order's transition log.
    TransitionId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(OrderId::new(), OrderId::new());
        assert_ne!(DisputeId::new(), DisputeId::new());
    }

    #[test]
    fn uuid_roundtrip() {
        let id = UserId::new();
        assert_eq!(UserId::from_uuid(id.as_uuid()), id);
    }

    #[test]
    fn display_is_uuid_format() {
        let id = OrderId::new();
        let text = id.to_string();
        assert_eq!(text.len(), 36);
        assert_eq!(text, id.as_uuid().to_string());
    }

    #[test]
    fn serde_roundtrip() {
        let id = ListingId::new();
        let json = serde_json::to_string(&id).expect("serialize");
        let parsed: ListingId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }
}
