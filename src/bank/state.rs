use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::error::BankError;
use super::info::{AbandonedWork, BankInfo};
use crate::domain::{AccountId, BankId, Currency, FixedPoint, Transaction, TransactionStatus};
use crate::storage::{ConcurrentAccountStore, CurrencyReserves, TransactionQueue};

/// Fee revenue accumulated by a bank, in the units it was charged in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Revenue {
    /// Spread kept on cross-bank transfers
    pub bank_taxes: FixedPoint,
    /// Interest charged on overdraft draws
    pub overdraft_taxes: FixedPoint,
}

impl Revenue {
    pub fn profit(&self) -> FixedPoint {
        self.bank_taxes + self.overdraft_taxes
    }
}

/// Settlement throughput figures of a bank
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingMetrics {
    pub processed: u64,
    pub failed: u64,
    pub total_processing_time: Duration,
}

impl ProcessingMetrics {
    /// Mean processing time of successful settlements
    pub fn mean_processing_time(&self) -> Option<Duration> {
        let processed = u32::try_from(self.processed).ok().filter(|n| *n > 0)?;
        Some(self.total_processing_time / processed)
    }
}

/// A national bank: its accounts, reserves, pending queue and counters
///
/// Each group of fields that must change together sits behind its own lock:
/// accounts per entry, revenue as a pair, metrics as a pair. The two transfer
/// counts are independent atomics.
pub struct Bank {
    id: BankId,
    currency: Currency,
    reserves: CurrencyReserves,
    accounts: ConcurrentAccountStore,
    queue: TransactionQueue,
    national_transactions: AtomicU64,
    international_transactions: AtomicU64,
    revenue: Mutex<Revenue>,
    metrics: Mutex<ProcessingMetrics>,
}

impl Bank {
    /// Create an operating bank with no accounts and empty reserves
    pub fn new(id: BankId, currency: Currency) -> Self {
        Self {
            id,
            currency,
            reserves: CurrencyReserves::new(),
            accounts: ConcurrentAccountStore::new(id, currency),
            queue: TransactionQueue::new(),
            national_transactions: AtomicU64::new(0),
            international_transactions: AtomicU64::new(0),
            revenue: Mutex::new(Revenue::default()),
            metrics: Mutex::new(ProcessingMetrics::default()),
        }
    }

    pub fn id(&self) -> BankId {
        self.id
    }

    /// Home currency of the bank's client accounts
    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn reserves(&self) -> &CurrencyReserves {
        &self.reserves
    }

    pub fn accounts(&self) -> &ConcurrentAccountStore {
        &self.accounts
    }

    pub fn is_operating(&self) -> bool {
        self.queue.is_open()
    }

    /// Token cancelled when the bank stops operating
    pub fn shutdown_token(&self) -> CancellationToken {
        self.queue.closed_token()
    }

    /// Open a client account in the bank's home currency
    pub fn new_account(&self, balance: FixedPoint, overdraft_limit: FixedPoint) -> AccountId {
        self.accounts.open(balance, overdraft_limit)
    }

    /// Queue a transaction for settlement and wake one processor
    pub fn enqueue(&self, transaction: Transaction) {
        debug!(bank = self.id, tx_id = transaction.id(), "Transaction queued");
        self.queue.push(transaction);
    }

    /// Wait for the next transaction in arrival order
    pub async fn dequeue(&self) -> Result<Transaction, BankError> {
        self.queue
            .pop()
            .await
            .ok_or(BankError::ShutdownInProgress(self.id))
    }

    /// Stop operating and wake every processor blocked on the queue
    ///
    /// Only the first call has an effect; it returns true.
    pub fn shutdown(&self) -> bool {
        let first = self.queue.close();
        if first {
            info!(bank = self.id, pending = self.queue.len(), "Bank stopped operating");
        }
        first
    }

    pub fn pending_transactions(&self) -> usize {
        self.queue.len()
    }

    /// Remove transactions left in the queue, measuring their age at `now`
    pub fn take_abandoned(&self, now: Instant) -> AbandonedWork {
        AbandonedWork::from_transactions(&self.queue.drain(), now)
    }

    pub(crate) fn record_national(&self) {
        self.national_transactions.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_international(&self) {
        self.international_transactions.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn add_revenue(&self, bank_taxes: FixedPoint, overdraft_taxes: FixedPoint) {
        let mut revenue = self.revenue.lock();
        revenue.bank_taxes = revenue.bank_taxes + bank_taxes;
        revenue.overdraft_taxes = revenue.overdraft_taxes + overdraft_taxes;
    }

    pub(crate) fn record_completion(&self, status: TransactionStatus, elapsed: Duration) {
        let mut metrics = self.metrics.lock();
        match status {
            TransactionStatus::Successful => {
                metrics.processed += 1;
                metrics.total_processing_time += elapsed;
            }
            TransactionStatus::Failed => metrics.failed += 1,
            TransactionStatus::Pending => {}
        }
    }

    pub fn national_transactions(&self) -> u64 {
        self.national_transactions.load(Ordering::SeqCst)
    }

    pub fn international_transactions(&self) -> u64 {
        self.international_transactions.load(Ordering::SeqCst)
    }

    pub fn revenue(&self) -> Revenue {
        *self.revenue.lock()
    }

    pub fn metrics(&self) -> ProcessingMetrics {
        *self.metrics.lock()
    }

    /// Point-in-time statistics of the bank
    pub fn info(&self) -> BankInfo {
        BankInfo {
            bank_id: self.id,
            currency: self.currency,
            reserves: self.reserves.snapshot(),
            national_transactions: self.national_transactions(),
            international_transactions: self.international_transactions(),
            account_count: self.accounts.len(),
            client_balance: self.accounts.total_balance(),
            revenue: self.revenue(),
            metrics: self.metrics(),
            pending: self.pending_transactions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccountRef;

    fn tx(id: u64) -> Transaction {
        Transaction::new(
            id,
            AccountRef::new(0, 0),
            AccountRef::new(0, 1),
            FixedPoint::from_units(10),
            Currency::USD,
        )
        .unwrap()
    }

    #[test]
    fn new_bank_is_operating_and_empty() {
        let bank = Bank::new(2, Currency::GBP);

        assert_eq!(bank.id(), 2);
        assert_eq!(bank.currency(), Currency::GBP);
        assert!(bank.is_operating());
        assert!(bank.accounts().is_empty());
        assert_eq!(bank.revenue(), Revenue::default());
        assert_eq!(bank.metrics(), ProcessingMetrics::default());
    }

    #[test]
    fn new_account_uses_home_currency() {
        let bank = Bank::new(1, Currency::EUR);
        let id = bank.new_account(FixedPoint::from_units(100), FixedPoint::from_units(10));

        let account = bank.accounts().read(id).unwrap();
        assert_eq!(account.currency(), Currency::EUR);
        assert_eq!(account.bank_id(), 1);
    }

    #[tokio::test]
    async fn dequeue_follows_arrival_order() {
        let bank = Bank::new(0, Currency::USD);
        bank.enqueue(tx(1));
        bank.enqueue(tx(2));

        assert_eq!(bank.dequeue().await.unwrap().id(), 1);
        assert_eq!(bank.dequeue().await.unwrap().id(), 2);
    }

    #[tokio::test]
    async fn dequeue_after_shutdown_reports_shutdown() {
        let bank = Bank::new(4, Currency::CHF);
        bank.enqueue(tx(1));

        assert!(bank.shutdown());
        assert!(!bank.shutdown());
        assert!(!bank.is_operating());
        assert_eq!(
            bank.dequeue().await.unwrap_err(),
            BankError::ShutdownInProgress(4)
        );
        assert_eq!(bank.pending_transactions(), 1);
    }

    #[tokio::test]
    async fn shutdown_token_is_cancelled() {
        let bank = Bank::new(0, Currency::USD);
        let token = bank.shutdown_token();
        bank.shutdown();
        token.cancelled().await;
    }

    #[test]
    fn take_abandoned_empties_the_queue() {
        let bank = Bank::new(0, Currency::USD);
        bank.enqueue(tx(1));
        bank.enqueue(tx(2));
        bank.shutdown();

        let abandoned = bank.take_abandoned(Instant::now());
        assert_eq!(abandoned.count, 2);
        assert_eq!(bank.pending_transactions(), 0);
    }

    #[tokio::test]
    async fn operating_bank_keeps_waiting_after_take_abandoned() {
        let bank = Bank::new(3, Currency::JPY);
        bank.enqueue(tx(1));
        assert_eq!(bank.take_abandoned(Instant::now()).count, 1);

        bank.enqueue(tx(2));
        assert_eq!(bank.dequeue().await.unwrap().id(), 2);

        let mut next = tokio_test::task::spawn(bank.dequeue());
        tokio_test::assert_pending!(next.poll());
        assert!(bank.is_operating());
    }

    #[test]
    fn revenue_accumulates_both_taxes() {
        let bank = Bank::new(0, Currency::USD);
        bank.add_revenue(FixedPoint::from_units(4), FixedPoint::from_units(5));
        bank.add_revenue(FixedPoint::zero(), FixedPoint::from_units(1));

        let revenue = bank.revenue();
        assert_eq!(revenue.bank_taxes, FixedPoint::from_units(4));
        assert_eq!(revenue.overdraft_taxes, FixedPoint::from_units(6));
        assert_eq!(revenue.profit(), FixedPoint::from_units(10));
    }

    #[test]
    fn completion_metrics_split_success_and_failure() {
        let bank = Bank::new(0, Currency::USD);
        bank.record_completion(TransactionStatus::Successful, Duration::from_millis(30));
        bank.record_completion(TransactionStatus::Successful, Duration::from_millis(10));
        bank.record_completion(TransactionStatus::Failed, Duration::from_millis(99));

        let metrics = bank.metrics();
        assert_eq!(metrics.processed, 2);
        assert_eq!(metrics.failed, 1);
        assert_eq!(metrics.total_processing_time, Duration::from_millis(40));
        assert_eq!(metrics.mean_processing_time(), Some(Duration::from_millis(20)));
    }

    #[test]
    fn mean_processing_time_needs_samples() {
        assert_eq!(ProcessingMetrics::default().mean_processing_time(), None);
    }

    #[test]
    fn counters_are_independent() {
        let bank = Bank::new(0, Currency::USD);
        bank.record_national();
        bank.record_national();
        bank.record_international();

        assert_eq!(bank.national_transactions(), 2);
        assert_eq!(bank.international_transactions(), 1);
    }

    #[test]
    fn info_reports_current_state() {
        let bank = Bank::new(3, Currency::JPY);
        bank.new_account(FixedPoint::from_units(100), FixedPoint::zero());
        bank.new_account(FixedPoint::from_units(50), FixedPoint::zero());
        bank.reserves()
            .deposit(Currency::USD, FixedPoint::from_units(7))
            .unwrap();
        bank.add_revenue(FixedPoint::from_units(1), FixedPoint::from_units(2));
        bank.record_international();
        bank.enqueue(tx(1));

        let info = bank.info();
        assert_eq!(info.bank_id, 3);
        assert_eq!(info.currency, Currency::JPY);
        assert_eq!(info.account_count, 2);
        assert_eq!(info.client_balance, FixedPoint::from_units(150));
        assert_eq!(info.reserves[0], (Currency::USD, FixedPoint::from_units(7)));
        assert_eq!(info.international_transactions, 1);
        assert_eq!(info.revenue.profit(), FixedPoint::from_units(3));
        assert_eq!(info.pending, 1);
    }
}
