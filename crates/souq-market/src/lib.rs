//! # souq-market
//!
//! Trade lifecycle orchestration for the Souq marketplace core.
//!
//! This crate combines the order state machine, the escrow ledger, and
//! the dispute workflow behind one [`MarketService`]:
//!
//! - Buyer/seller lifecycle: create, mark paid, start, deliver, confirm,
//!   cancel
//! - Dispute resolution: escalate, collect evidence and messages, and
//!   apply adjudicator rulings that drive the ledger and force order
//!   transitions
//! - A [`TradeStore`] that serializes every multi-step mutation behind a
//!   per-order exclusive lock with bounded acquisition, so concurrent
//!   actors cannot race a trade into an inconsistent settlement
//! - Collaborator boundaries for listings/inventory and account
//!   deactivation, and fire-and-forget audit emission

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod accounts;
pub mod config;
pub mod disputes;
pub mod error;
pub mod listing;
pub mod service;
pub mod store;

pub use accounts::{AccountDirectory, InMemoryAccounts};
pub use config::MarketConfig;
pub use disputes::{EvidenceSubmission, Ruling};
pub use error::{FailureKind, MarketError, Result};
pub use listing::{InMemoryListings, Listing, ListingDirectory, ListingStatus, NewListing};
pub use service::{MarketService, ProofSubmission};
pub use store::{Trade, TradeStore};
