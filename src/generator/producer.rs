use std::ops::RangeInclusive;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::bank::{Bank, BankRegistry};
use crate::domain::{AccountRef, FixedPoint, Transaction, TransactionId};

/// Simulated time units waited between two generated transactions
pub const ARRIVAL_GAP: RangeInclusive<u32> = 0..=3;

/// Amount of a generated transaction, in whole units of the origin currency
pub const AMOUNT_RANGE: RangeInclusive<i64> = 1_000..=100_000_000;

/// Shared source of unique transaction ids
#[derive(Debug, Clone, Default)]
pub struct TransactionIds(Arc<AtomicU64>);

impl TransactionIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> TransactionId {
        self.0.fetch_add(1, Ordering::Relaxed)
    }

    /// Ids handed out so far
    pub fn issued(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Random payment traffic originating at one bank
///
/// Origins are accounts of its own bank; destinations are any account of any
/// registered bank, in that bank's home currency.
pub struct TransactionGenerator {
    bank: Arc<Bank>,
    registry: Arc<BankRegistry>,
    ids: TransactionIds,
    time_unit: Duration,
    rng: StdRng,
}

impl TransactionGenerator {
    pub fn new(bank: Arc<Bank>, registry: Arc<BankRegistry>, ids: TransactionIds) -> Self {
        Self {
            bank,
            registry,
            ids,
            time_unit: Duration::ZERO,
            rng: StdRng::from_entropy(),
        }
    }

    /// Real duration of one simulated time unit
    pub fn with_time_unit(mut self, time_unit: Duration) -> Self {
        self.time_unit = time_unit;
        self
    }

    /// Make the traffic reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Build the next random transaction
    ///
    /// Returns `None` while the origin bank, or the chosen destination bank,
    /// has no accounts.
    pub fn next_transaction(&mut self) -> Option<Transaction> {
        let origin_accounts = self.bank.accounts().len();
        if origin_accounts == 0 || self.registry.is_empty() {
            return None;
        }

        let origin = AccountRef::new(self.bank.id(), self.pick(origin_accounts));

        let destination_index = self.rng.gen_range(0..self.registry.len());
        let destination_bank = Arc::clone(self.registry.get(destination_index).ok()?);
        let destination_accounts = destination_bank.accounts().len();
        if destination_accounts == 0 {
            return None;
        }
        let destination = AccountRef::new(destination_bank.id(), self.pick(destination_accounts));

        let amount = FixedPoint::from_units(self.rng.gen_range(AMOUNT_RANGE));

        Transaction::new(self.ids.next(), origin, destination, amount, destination_bank.currency()).ok()
    }

    /// Keep feeding the bank until it stops operating
    ///
    /// Returns the number of transactions enqueued.
    pub async fn run(mut self) -> u64 {
        let shutdown = self.bank.shutdown_token();
        let mut generated = 0;

        loop {
            let gap = self.time_unit * self.rng.gen_range(ARRIVAL_GAP);

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(gap) => {}
            }

            if !self.bank.is_operating() {
                break;
            }

            if let Some(transaction) = self.next_transaction() {
                debug!(
                    bank = self.bank.id(),
                    tx_id = transaction.id(),
                    destination_bank = transaction.destination().bank,
                    amount = %transaction.amount(),
                    "Transaction generated"
                );
                self.bank.enqueue(transaction);
                generated += 1;
            } else {
                // nothing to pay from or into yet
                tokio::task::yield_now().await;
            }
        }

        info!(bank = self.bank.id(), generated, "Transaction generator stopped");
        generated
    }

    fn pick(&mut self, len: usize) -> u32 {
        u32::try_from(self.rng.gen_range(0..len)).unwrap_or(u32::MAX)
    }
}
