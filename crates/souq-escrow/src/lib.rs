//! # souq-escrow
//!
//! Escrow ledger for the Souq trade core.
//!
//! One [`EscrowAccount`] holds the funds of one paid order until release,
//! refund, or an adjudicated split. The ledger enforces the conservation
//! invariant `amount_released + amount_refunded <= amount_held` on every
//! mutation: funds can never move twice, nor beyond what is held.
//!
//! Actually transferring money is a payment-rail concern outside this
//! crate; the ledger records what must move and in which direction.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod error;

pub use account::{EscrowAccount, EscrowStatus};
pub use error::{EscrowError, Result};
