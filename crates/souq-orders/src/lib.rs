//! # souq-orders
//!
//! Order record and state machine for the Souq trade core.
//!
//! This crate provides:
//!
//! - [`Order`] — One trade instance with economics frozen at creation
//! - [`OrderState`] — The transition graph (only listed edges are legal)
//! - [`policy`] — Which actor class may drive an order into each state
//! - [`TransitionRecord`] — Append-only audit entry, one per transition
//!
//! The state machine validates *edges* and applies timestamps; it is
//! authorization-agnostic. Callers check [`policy::authorize`] first and
//! hold the order's exclusive lock around the whole read-validate-apply
//! sequence.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod order;
pub mod policy;
pub mod record;
pub mod state;

pub use error::{OrderError, Result};
pub use order::{DeliveryProof, NewOrder, Order, ProofKind, MAX_ORDER_QUANTITY};
pub use policy::ActorClass;
pub use record::TransitionRecord;
pub use state::OrderState;
