//! The trade store: per-order aggregates behind exclusive locks.
//!
//! One [`Trade`] aggregates everything that must stay consistent for a
//! single order — the order record, its escrow account, its transition
//! log, and its disputes. Every multi-step mutation runs through
//! [`TradeStore::with_trade`], which serializes access per order and
//! commits all-or-nothing: the closure mutates a working copy that only
//! replaces the authoritative record when it returns `Ok`.
//!
//! Lock acquisition is bounded; a timed-out wait surfaces as a retryable
//! [`MarketError::LockContended`], never as a partial update.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use souq_core::{DisputeId, OrderId};
use souq_disputes::Dispute;
use souq_escrow::EscrowAccount;
use souq_orders::{Order, TransitionRecord};
use tokio::sync::Mutex;

use crate::error::{MarketError, Result};

/// Everything owned by one order, locked and committed as a unit.
#[derive(Debug, Clone)]
pub struct Trade {
    /// The order record.
    pub order: Order,
    /// Escrow account, present once the order has been paid.
    pub escrow: Option<EscrowAccount>,
    /// Append-only transition log.
    pub transitions: Vec<TransitionRecord>,
    /// Every dispute ever opened against the order.
    pub disputes: Vec<Dispute>,
}

impl Trade {
    /// Wraps a freshly created order.
    #[must_use]
    pub const fn new(order: Order) -> Self {
        Self {
            order,
            escrow: None,
            transitions: Vec::new(),
            disputes: Vec::new(),
        }
    }

    /// The currently active (unsettled) dispute, if any.
    #[must_use]
    pub fn active_dispute(&self) -> Option<&Dispute> {
        self.disputes.iter().find(|d| d.is_active())
    }

    /// Looks up a dispute by id.
    #[must_use]
    pub fn dispute(&self, id: DisputeId) -> Option<&Dispute> {
        self.disputes.iter().find(|d| d.id() == id)
    }

    /// Looks up a dispute by id for mutation.
    pub fn dispute_mut(&mut self, id: DisputeId) -> Option<&mut Dispute> {
        self.disputes.iter_mut().find(|d| d.id() == id)
    }

    /// The escrow account, or `EscrowNotFound` if payment was never
    /// confirmed.
    pub fn escrow_mut(&mut self) -> Result<&mut EscrowAccount> {
        let order = self.order.id();
        self.escrow
            .as_mut()
            .ok_or(MarketError::EscrowNotFound { order })
    }
}

/// Shared store of trade aggregates.
#[derive(Debug)]
pub struct TradeStore {
    trades: RwLock<HashMap<OrderId, Arc<Mutex<Trade>>>>,
    dispute_index: RwLock<HashMap<DisputeId, OrderId>>,
    lock_timeout: Duration,
}

impl TradeStore {
    /// Creates an empty store with the given lock acquisition bound.
    #[must_use]
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            trades: RwLock::new(HashMap::new()),
            dispute_index: RwLock::new(HashMap::new()),
            lock_timeout,
        }
    }

    /// Inserts a new trade aggregate and returns its order id.
    pub fn insert(&self, trade: Trade) -> OrderId {
        let id = trade.order.id();
        self.trades.write().insert(id, Arc::new(Mutex::new(trade)));
        id
    }

    /// Whether the store holds a trade for the given order.
    #[must_use]
    pub fn contains(&self, id: OrderId) -> bool {
        self.trades.read().contains_key(&id)
    }

    /// Maps a dispute id to its owning order for later lookups.
    pub fn register_dispute(&self, dispute: DisputeId, order: OrderId) {
        self.dispute_index.write().insert(dispute, order);
    }

    /// Resolves the order that owns a dispute.
    pub fn order_for_dispute(&self, dispute: DisputeId) -> Result<OrderId> {
        self.dispute_index
            .read()
            .get(&dispute)
            .copied()
            .ok_or(MarketError::DisputeNotFound { id: dispute })
    }

    fn entry(&self, id: OrderId) -> Result<Arc<Mutex<Trade>>> {
        self.trades
            .read()
            .get(&id)
            .cloned()
            .ok_or(MarketError::OrderNotFound { id })
    }

    /// Runs a mutation against the trade under its exclusive lock.
    ///
    /// The closure receives a working copy; it replaces the authoritative
    /// record only when the closure returns `Ok`, so an error part-way
    /// through a multi-step mutation leaves no effect at all. Lock waits
    /// are bounded by the store's timeout and surface as
    /// [`MarketError::LockContended`].
    pub async fn with_trade<T, F>(&self, id: OrderId, f: F) -> Result<T>
    where
        F: FnOnce(&mut Trade) -> Result<T>,
    {
        let entry = self.entry(id)?;
        let mut guard = tokio::time::timeout(self.lock_timeout, entry.lock())
            .await
            .map_err(|_| MarketError::LockContended { order: id })?;

        let mut working = guard.clone();
        let value = f(&mut working)?;
        *guard = working;
        Ok(value)
    }

    /// Reads from the trade under its lock without mutating it.
    pub async fn read<T, F>(&self, id: OrderId, f: F) -> Result<T>
    where
        F: FnOnce(&Trade) -> T,
    {
        let entry = self.entry(id)?;
        let guard = tokio::time::timeout(self.lock_timeout, entry.lock())
            .await
            .map_err(|_| MarketError::LockContended { order: id })?;
        Ok(f(&guard))
    }

    /// Clones the whole aggregate for inspection.
    pub async fn snapshot(&self, id: OrderId) -> Result<Trade> {
        self.read(id, Clone::clone).await
    }
}
