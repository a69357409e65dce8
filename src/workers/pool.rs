use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use super::error::ErrorPolicy;
use super::worker::{WorkerReport, run_worker};
use crate::bank::BankRegistry;
use crate::domain::{BankId, ExchangeRates};
use crate::engine::PaymentProcessor;

/// Spawns settlement workers for every bank of a registry
///
/// # Example
/// ```rust,ignore
/// let handle = ProcessorPool::new(registry.clone(), rates, LogErrors)
///     .with_workers(4)
///     .spawn();
///
/// registry.shutdown_all();
/// let results = handle.join().await;
/// ```
pub struct ProcessorPool<R, P>
where
    R: ExchangeRates + 'static,
    P: ErrorPolicy + 'static,
{
    registry: Arc<BankRegistry>,
    rates: Arc<R>,
    policy: Arc<P>,
    workers_per_bank: usize,
    processing_delay: Duration,
}

impl<R, P> ProcessorPool<R, P>
where
    R: ExchangeRates + 'static,
    P: ErrorPolicy + 'static,
{
    pub fn new(registry: Arc<BankRegistry>, rates: Arc<R>, policy: P) -> Self {
        Self {
            registry,
            rates,
            policy: Arc::new(policy),
            workers_per_bank: 1,
            processing_delay: Duration::ZERO,
        }
    }

    /// Set the number of workers per bank (defaults to 1)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers_per_bank = workers.max(1);
        self
    }

    /// Simulated latency of each settlement (defaults to none)
    pub fn with_processing_delay(mut self, delay: Duration) -> Self {
        self.processing_delay = delay;
        self
    }

    /// Start every worker as its own task
    pub fn spawn(self) -> PoolHandle {
        let mut handles = Vec::with_capacity(self.registry.len() * self.workers_per_bank);

        for bank in self.registry.iter() {
            for worker_id in 0..self.workers_per_bank {
                let processor = PaymentProcessor::new(
                    worker_id,
                    Arc::clone(bank),
                    Arc::clone(&self.registry),
                    Arc::clone(&self.rates),
                )
                .with_processing_delay(self.processing_delay);
                let policy = Arc::clone(&self.policy);

                let handle =
                    tokio::spawn(async move { run_worker(processor, &*policy).await });
                handles.push((bank.id(), worker_id, handle));
            }
        }

        info!(
            banks = self.registry.len(),
            workers_per_bank = self.workers_per_bank,
            "Payment processors started"
        );

        PoolHandle { handles }
    }
}

/// Running workers of a pool
pub struct PoolHandle {
    handles: Vec<(BankId, usize, JoinHandle<WorkerReport>)>,
}

impl PoolHandle {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every worker to stop
    ///
    /// Workers only stop once their bank shuts down.
    pub async fn join(self) -> PoolResults {
        let mut reports = Vec::with_capacity(self.handles.len());
        let mut crashed = 0;

        for (bank_id, worker_id, handle) in self.handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!(bank = bank_id, worker = worker_id, error = %e, "Worker task failed");
                    crashed += 1;
                }
            }
        }

        PoolResults { reports, crashed }
    }
}

/// Reports of every worker of a pool
#[derive(Debug, Default)]
pub struct PoolResults {
    pub reports: Vec<WorkerReport>,
    /// Workers whose task panicked or was aborted
    pub crashed: usize,
}

impl PoolResults {
    pub fn all_stopped_cleanly(&self) -> bool {
        self.crashed == 0
    }

    pub fn settled(&self) -> u64 {
        self.reports.iter().map(|r| r.settled).sum()
    }

    pub fn failed(&self) -> u64 {
        self.reports.iter().map(|r| r.failed).sum()
    }

    pub fn for_bank(&self, bank_id: BankId) -> impl Iterator<Item = &WorkerReport> {
        self.reports.iter().filter(move |r| r.bank_id == bank_id)
    }
}
