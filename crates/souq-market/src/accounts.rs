//! Account collaborator boundary.
//!
//! Identity and account management live outside the trade core. The core
//! needs exactly one capability here: deactivating a seller's account
//! when an adjudicator issues a ban ruling.

use std::collections::HashMap;

use parking_lot::RwLock;
use souq_core::UserId;

use crate::error::Result;

/// Boundary contract for the account collaborator.
pub trait AccountDirectory: Send + Sync {
    /// Deactivates the given account.
    ///
    /// Runs inside the same unit of work as the ban ruling that triggered
    /// it; a failure here aborts the whole decision.
    fn deactivate(&self, user: UserId) -> Result<()>;
}

/// In-memory account directory.
#[derive(Debug, Default)]
pub struct InMemoryAccounts {
    active: RwLock<HashMap<UserId, bool>>,
}

impl InMemoryAccounts {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an active account.
    pub fn register(&self, user: UserId) {
        self.active.write().insert(user, true);
    }

    /// Whether the account is currently active. Unknown accounts are
    /// treated as active (the identity collaborator owns existence).
    #[must_use]
    pub fn is_active(&self, user: UserId) -> bool {
        self.active.read().get(&user).copied().unwrap_or(true)
    }
}

impl AccountDirectory for InMemoryAccounts {
    fn deactivate(&self, user: UserId) -> Result<()> {
        self.active.write().insert(user, false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deactivate_flips_flag() {
        let accounts = InMemoryAccounts::new();
        let user = UserId::new();
        accounts.register(user);
        assert!(accounts.is_active(user));

        accounts.deactivate(user).expect("deactivate");
        assert!(!accounts.is_active(user));
    }

    #[test]
    fn unknown_account_defaults_active() {
        let accounts = InMemoryAccounts::new();
        assert!(accounts.is_active(UserId::new()));
    }
}
