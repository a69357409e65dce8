use tracing::{debug, info};

use super::error::ErrorPolicy;
use crate::domain::{BankId, ExchangeRates};
use crate::engine::PaymentProcessor;

/// What one worker did before its bank stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub bank_id: BankId,
    pub settled: u64,
    pub failed: u64,
}

/// Drain the processor's bank until it stops operating
///
/// Waits on the bank queue, settles each transaction it receives and hands
/// failures to `policy`. Returns once shutdown wakes the pending dequeue.
pub async fn run_worker<R, P>(processor: PaymentProcessor<R>, policy: &P) -> WorkerReport
where
    R: ExchangeRates,
    P: ErrorPolicy + ?Sized,
{
    let bank = processor.bank();
    let mut report = WorkerReport {
        worker_id: processor.id(),
        bank_id: bank.id(),
        ..WorkerReport::default()
    };

    debug!(bank = report.bank_id, worker = report.worker_id, "Worker started");

    while bank.is_operating() {
        let mut transaction = match bank.dequeue().await {
            Ok(transaction) => transaction,
            Err(_) => break,
        };

        match processor.execute(&mut transaction).await {
            Ok(_) => report.settled += 1,
            Err(e) => {
                report.failed += 1;
                policy.handle_settlement_error(&transaction, &e);
            }
        }
    }

    info!(
        bank = report.bank_id,
        worker = report.worker_id,
        settled = report.settled,
        failed = report.failed,
        "Worker stopped"
    );

    report
}
