use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::app::SimulationConfig;
use crate::bank::BankRegistry;
use crate::domain::{Currency, DomainError, ExchangeRates, StaticRateTable};
use crate::generator::{TransactionGenerator, TransactionIds, seed_bank};
use crate::report::RunSummary;
use crate::workers::{LogErrors, ProcessorPool};

/// A whole run: one bank per currency, their producers and processors
pub struct Simulation<R: ExchangeRates + 'static = StaticRateTable> {
    config: SimulationConfig,
    registry: Arc<BankRegistry>,
    rates: Arc<R>,
}

impl Simulation<StaticRateTable> {
    /// Open one seeded bank per supported currency
    pub fn new(config: SimulationConfig) -> Result<Self, DomainError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let registry = BankRegistry::with_currencies(&Currency::ALL);
        for bank in registry.iter() {
            seed_bank(bank, config.accounts_per_bank, &mut rng)?;
        }

        Ok(Self::with_registry(config, Arc::new(registry), Arc::new(StaticRateTable::new())))
    }
}

impl<R: ExchangeRates + 'static> Simulation<R> {
    /// Run over an already built network
    pub fn with_registry(config: SimulationConfig, registry: Arc<BankRegistry>, rates: Arc<R>) -> Self {
        Self {
            config,
            registry,
            rates,
        }
    }

    pub fn registry(&self) -> &Arc<BankRegistry> {
        &self.registry
    }

    /// Run until the configured duration elapses or `shutdown` is cancelled
    ///
    /// Every bank is then stopped, producers and processors are joined and
    /// the transactions left in the queues are counted in the summary.
    pub async fn run(self, shutdown: CancellationToken) -> RunSummary {
        let config = &self.config;
        info!(
            banks = self.registry.len(),
            time_unit = ?config.time_unit,
            total_time = config.total_time,
            workers_per_bank = config.workers_per_bank,
            accounts_per_bank = config.accounts_per_bank,
            "Starting simulation"
        );

        let pool = ProcessorPool::new(Arc::clone(&self.registry), Arc::clone(&self.rates), LogErrors)
            .with_workers(config.workers_per_bank)
            .with_processing_delay(config.processing_delay())
            .spawn();

        let ids = TransactionIds::new();
        let producers: Vec<_> = self
            .registry
            .iter()
            .map(|bank| {
                let mut generator =
                    TransactionGenerator::new(Arc::clone(bank), Arc::clone(&self.registry), ids.clone())
                        .with_time_unit(config.time_unit);
                if let Some(seed) = config.seed {
                    generator = generator.with_seed(seed.wrapping_add(bank.id() as u64 + 1));
                }
                tokio::spawn(generator.run())
            })
            .collect();

        tokio::select! {
            _ = tokio::time::sleep(config.duration()) => {
                info!("Simulated time is over");
            }
            _ = shutdown.cancelled() => {
                info!("Simulation interrupted");
            }
        }

        self.registry.shutdown_all();

        for producer in producers {
            if let Err(e) = producer.await {
                error!(error = %e, "Transaction generator failed");
            }
        }

        let results = pool.join().await;
        if !results.all_stopped_cleanly() {
            error!(crashed = results.crashed, "Some payment processors did not stop cleanly");
        }

        info!(
            generated = ids.issued(),
            settled = results.settled(),
            failed = results.failed(),
            "All workers stopped"
        );

        RunSummary::collect(&self.registry, Instant::now(), config.time_unit)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn quick_config() -> SimulationConfig {
        SimulationConfig {
            time_unit: Duration::from_millis(1),
            total_time: 30,
            workers_per_bank: 2,
            accounts_per_bank: 4,
            seed: Some(11),
            debug: false,
        }
    }

    #[test]
    fn new_opens_one_seeded_bank_per_currency() {
        let simulation = Simulation::new(quick_config()).unwrap();
        let registry = simulation.registry();

        assert_eq!(registry.len(), Currency::ALL.len());
        for bank in registry.iter() {
            assert_eq!(bank.accounts().len(), 4);
            assert!(bank.reserves().snapshot().iter().all(|(_, b)| b.is_positive()));
        }
    }

    #[tokio::test]
    async fn run_stops_every_bank_and_drains_queues() {
        let simulation = Simulation::new(quick_config()).unwrap();
        let registry = Arc::clone(simulation.registry());

        let summary = simulation.run(CancellationToken::new()).await;

        assert_eq!(summary.banks.len(), 6);
        assert!(registry.iter().all(|bank| !bank.is_operating()));
        assert!(registry.iter().all(|bank| bank.pending_transactions() == 0));
    }

    #[tokio::test]
    async fn cancellation_ends_the_run_early() {
        let config = SimulationConfig {
            total_time: 1_000_000,
            ..quick_config()
        };
        let simulation = Simulation::new(config).unwrap();
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let summary = tokio::time::timeout(Duration::from_secs(5), simulation.run(shutdown))
            .await
            .unwrap();
        assert_eq!(summary.banks.len(), 6);
    }
}
