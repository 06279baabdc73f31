//! # souq-disputes
//!
//! Dispute workflow records for the Souq trade core.
//!
//! A [`Dispute`] is a ticket a trade participant opens against an order.
//! It collects [`EvidenceItem`]s and [`DisputeMessage`]s (some visible to
//! adjudicators only) and terminates with exactly one effective
//! [`DisputeDecision`]:
//!
//! ```text
//! OPEN -> IN_REVIEW -> RESOLVED
//! OPEN | IN_REVIEW -> CLOSED
//! ```
//!
//! The money-moving consequences of a decision (ledger calls, forced order
//! transitions) are orchestrated by the lifecycle service; this crate
//! enforces the dispute-local invariants — status edges, decision
//! exclusivity, and submission guards.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod decision;
pub mod dispute;
pub mod error;
pub mod evidence;

pub use decision::{DecisionKind, DisputeDecision};
pub use dispute::{Dispute, DisputeStatus, OpenerRole};
pub use error::{DisputeError, Result};
pub use evidence::{DisputeMessage, EvidenceItem};
