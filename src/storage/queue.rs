use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::domain::Transaction;

/// FIFO of pending transactions with a cancellable blocking receive
///
/// Every push releases exactly one permit on the semaphore; a pop consumes one
/// permit before taking the head of the queue, so each transaction is handed
/// to at most one consumer. Closing the queue wakes every blocked consumer.
pub struct TransactionQueue {
    pending: Mutex<VecDeque<Transaction>>,
    available: Semaphore,
    open: AtomicBool,
    closed: CancellationToken,
}

impl TransactionQueue {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            available: Semaphore::new(0),
            open: AtomicBool::new(true),
            closed: CancellationToken::new(),
        }
    }

    /// Append to the tail and signal one waiting consumer
    pub fn push(&self, transaction: Transaction) {
        self.pending.lock().push_back(transaction);
        self.available.add_permits(1);
    }

    /// Wait for the head of the queue
    ///
    /// Returns `None` once the queue is closed, even if transactions remain;
    /// those are left in place for [`TransactionQueue::drain`].
    pub async fn pop(&self) -> Option<Transaction> {
        loop {
            tokio::select! {
                biased;
                _ = self.closed.cancelled() => return None,
                permit = self.available.acquire() => {
                    permit.ok()?.forget();
                    // a permit may outlive its item if a drain raced the push
                    if let Some(transaction) = self.pending.lock().pop_front() {
                        return Some(transaction);
                    }
                }
            }
        }
    }

    /// Close the queue, returning true only for the call that closed it
    pub fn close(&self) -> bool {
        let was_open = self.open.swap(false, Ordering::SeqCst);
        self.closed.cancel();
        was_open
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Token cancelled when the queue closes, for producers to observe
    pub fn closed_token(&self) -> CancellationToken {
        self.closed.child_token()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Remove and return everything still queued, in FIFO order
    ///
    /// Reclaims one permit per drained item so later pops on an open queue
    /// wait for fresh pushes.
    pub fn drain(&self) -> Vec<Transaction> {
        let drained: Vec<_> = self.pending.lock().drain(..).collect();
        for _ in &drained {
            match self.available.try_acquire() {
                Ok(permit) => permit.forget(),
                Err(_) => break,
            }
        }
        drained
    }
}

impl Default for TransactionQueue {
    fn default() -> Self {
        Self::new()
    }
}
