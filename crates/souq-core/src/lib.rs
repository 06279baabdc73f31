//! # souq-core
//!
//! Shared primitives for the Souq escrowed-trade core.
//!
//! This crate provides:
//!
//! - [`Amount`] — Money with fixed-point minor-unit precision
//! - Typed identifiers ([`OrderId`], [`UserId`], [`ListingId`], ...)
//! - [`Actor`] — The capability model separating system and user callers

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod actor;
pub mod amount;
pub mod error;
pub mod ids;

pub use actor::{Actor, UserRef};
pub use amount::Amount;
pub use error::CoreError;
pub use ids::{
    DecisionId, DisputeId, EvidenceId, ListingId, MessageId, OrderId, TransitionId, UserId,
};

/// Minor units per major currency unit (e.g. cents per dollar).
pub const MINOR_PER_MAJOR: u64 = 100;
