//! Error types for dispute operations.

use thiserror::Error;

use crate::dispute::DisputeStatus;

/// Result type alias for dispute operations.
pub type Result<T> = std::result::Result<T, DisputeError>;

/// Errors that can occur when mutating a dispute.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DisputeError {
    /// The dispute is no longer accepting submissions or status changes.
    #[error("dispute is {status}, no further submissions accepted")]
    Inactive {
        /// The dispute's current status.
        status: DisputeStatus,
    },

    /// A decision was already recorded and the dispute is settled.
    #[error("dispute is already {status}, decisions are exclusive")]
    AlreadyDecided {
        /// The terminal status the dispute reached.
        status: DisputeStatus,
    },

    /// The requested status is not a legal settlement target.
    #[error("a decision must settle the dispute as RESOLVED or CLOSED, not {status}")]
    NotASettlement {
        /// The rejected target status.
        status: DisputeStatus,
    },
}
