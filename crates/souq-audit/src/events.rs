//! Audit event types.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use souq_core::UserId;
use uuid::Uuid;

use crate::error::AuditError;

/// Category of an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditCategory {
    /// Order lifecycle events (transitions).
    Order,
    /// Money movement events (escrow mutations).
    Payment,
    /// Dispute workflow events.
    Dispute,
    /// Adjudicator/staff actions.
    AdminAction,
}

impl AuditCategory {
    /// Returns the string representation of this category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Payment => "payment",
            Self::Dispute => "dispute",
            Self::AdminAction => "admin_action",
        }
    }
}

impl fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One structured audit event.
///
/// Events are immutable once built; sinks receive them by reference and
/// never hand them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Event category.
    pub category: AuditCategory,
    /// What happened, dotted-path style (e.g. `order.transition`).
    pub action: String,
    /// The acting user, `None` for system actions.
    pub actor: Option<UserId>,
    /// Identifier of the subject entity (order, escrow, dispute).
    pub subject: String,
    /// State before the action, when the action changed a state.
    pub before_state: Option<String>,
    /// State after the action, when the action changed a state.
    pub after_state: Option<String>,
    /// Additional context data.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    /// Creates an event with the required fields.
    #[must_use]
    pub fn new(
        category: AuditCategory,
        action: impl Into<String>,
        subject: impl fmt::Display,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            category,
            action: action.into(),
            actor: None,
            subject: subject.to_string(),
            before_state: None,
            after_state: None,
            metadata: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Sets the acting user.
    #[must_use]
    pub const fn with_actor(mut self, actor: Option<UserId>) -> Self {
        self.actor = actor;
        self
    }

    /// Sets the before/after states.
    #[must_use]
    pub fn with_states(mut self, before: impl fmt::Display, after: impl fmt::Display) -> Self {
        self.before_state = Some(before.to_string());
        self.after_state = Some(after.to_string());
        self
    }

    /// Adds one metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Serializes the event to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, AuditError> {
        serde_json::to_string(self).map_err(AuditError::from)
    }
}
