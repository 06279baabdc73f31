//! Evidence items and dispute thread messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use souq_core::{EvidenceId, MessageId, UserId};

/// Maximum stored length of an evidence description.
const MAX_DESCRIPTION_LEN: usize = 500;

/// Maximum stored length of a message body.
const MAX_MESSAGE_LEN: usize = 2_000;

/// One piece of evidence attached to a dispute.
///
/// The file itself lives in external media storage; only the reference
/// and its metadata are recorded here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Unique evidence id.
    pub id: EvidenceId,
    /// Who uploaded the evidence.
    pub uploaded_by: UserId,
    /// Opaque reference into the media store.
    pub reference: String,
    /// Declared content type of the upload.
    pub content_type: String,
    /// Upload size in bytes.
    pub size_bytes: u64,
    /// Optional free-form description.
    pub description: Option<String>,
    /// When the evidence was attached.
    pub uploaded_at: DateTime<Utc>,
}

impl EvidenceItem {
    /// Creates an evidence item, bounding the description length.
    #[must_use]
    pub fn new(
        uploaded_by: UserId,
        reference: impl Into<String>,
        content_type: impl Into<String>,
        size_bytes: u64,
        description: Option<String>,
    ) -> Self {
        Self {
            id: EvidenceId::new(),
            uploaded_by,
            reference: reference.into(),
            content_type: content_type.into(),
            size_bytes,
            description: description.map(|d| bounded(d, MAX_DESCRIPTION_LEN)),
            uploaded_at: Utc::now(),
        }
    }
}

/// One message in a dispute thread.
///
/// Messages with `internal` set are adjudicator-only notes and are
/// filtered out of every participant-facing view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisputeMessage {
    /// Unique message id.
    pub id: MessageId,
    /// Who sent the message.
    pub sender: UserId,
    /// Message body.
    pub body: String,
    /// Whether the message is visible to adjudicators only.
    pub internal: bool,
    /// When the message was sent.
    pub sent_at: DateTime<Utc>,
}

impl DisputeMessage {
    /// Creates a message, bounding the body length.
    #[must_use]
    pub fn new(sender: UserId, body: impl Into<String>, internal: bool) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            body: bounded(body.into(), MAX_MESSAGE_LEN),
            internal,
            sent_at: Utc::now(),
        }
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

    #[test]
    fn evidence_bounds_description() {
        let item = EvidenceItem::new(
            UserId::new(),
            "evidence/2026/xyz.pdf",
            "application/pdf",
            14_200,
            Some("y".repeat(2_000)),
        );
        assert_eq!(item.description.map(|d| d.len()), Some(500));
    }

    #[test]
    fn message_bounds_body() {
        let message = DisputeMessage::new(UserId::new(), "z".repeat(9_000), false);
        assert_eq!(message.body.len(), 2_000);
        assert!(!message.internal);
    }

    #[test]
    fn internal_flag_is_kept() {
        let note = DisputeMessage::new(UserId::new(), "checking seller history", true);
        assert!(note.internal);
    }
}
