use crate::payload::Transaction;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Pending transactions in submission order.
///
/// Adds and drains take the same lock, so a concurrent add lands either
/// wholly before a drain (and is drained) or wholly after it (and stays).
#[derive(Debug, Default)]
pub struct TransactionPool {
    pending: Mutex<Vec<Transaction>>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the Vec half-written.
    fn pending(&self) -> MutexGuard<'_, Vec<Transaction>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add(&self, tx: Transaction) -> Transaction {
        let mut pending = self.pending();
        pending.push(tx.clone());
        debug!(pending = pending.len(), "transaction admitted");
        tx
    }

    /// Takes every pending transaction, leaving the pool empty.
    pub fn drain(&self) -> Vec<Transaction> {
        let batch = std::mem::take(&mut *self.pending());
        debug!(drained = batch.len(), "transaction pool drained");
        batch
    }

    pub fn len(&self) -> usize {
        self.pending().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending().is_empty()
    }

    /// Copy of the pending transactions, oldest first.
    pub fn pending_snapshot(&self) -> Vec<Transaction> {
        self.pending().clone()
    }
}
