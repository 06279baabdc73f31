//! # souq-audit
//!
//! Structured audit events for the Souq trade core.
//!
//! Every successful transition, ledger mutation, and dispute decision
//! emits one [`AuditEvent`] through an [`AuditSink`]. Delivery is
//! fire-and-forget: a sink failure is the sink's problem and must never
//! affect the business transaction that produced the event.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod sink;

pub use error::AuditError;
pub use events::{AuditCategory, AuditEvent};
pub use sink::{AuditSink, MemoryAuditSink, NoopAuditSink, TracingAuditSink};
