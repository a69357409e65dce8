use std::time::Duration;

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;
use tracing::info;

use super::error::ReportError;
use crate::bank::{AbandonedWork, BankInfo, BankRegistry};
use crate::domain::{BankId, Currency, FixedPoint};

/// End-of-run figures of one bank
#[derive(Debug, Clone)]
pub struct BankReport {
    pub info: BankInfo,
    pub abandoned: AbandonedWork,
}

/// End-of-run report of the whole network
///
/// Durations are expressed in simulated time units.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub banks: Vec<BankReport>,
    pub time_unit: Duration,
}

/// One CSV line of the summary
#[derive(Debug, Serialize)]
struct SummaryRow {
    bank: BankId,
    currency: Currency,
    reserve_usd: FixedPoint,
    reserve_eur: FixedPoint,
    reserve_gbp: FixedPoint,
    reserve_jpy: FixedPoint,
    reserve_chf: FixedPoint,
    reserve_brl: FixedPoint,
    national: u64,
    international: u64,
    accounts: usize,
    client_balance: FixedPoint,
    bank_taxes: FixedPoint,
    overdraft_taxes: FixedPoint,
    profit: FixedPoint,
    processed: u64,
    failed: u64,
    mean_processing_time: Option<f64>,
    abandoned: usize,
    mean_abandoned_age: Option<f64>,
}

impl RunSummary {
    /// Snapshot every bank and take what is left in its queue
    ///
    /// Banks should be stopped first; queued transactions are removed and
    /// their age measured at `now`.
    pub fn collect(registry: &BankRegistry, now: Instant, time_unit: Duration) -> Self {
        let banks = registry
            .iter()
            .map(|bank| {
                let abandoned = bank.take_abandoned(now);
                BankReport {
                    info: bank.info(),
                    abandoned,
                }
            })
            .collect();

        Self { banks, time_unit }
    }

    /// Queued transactions left by every bank
    pub fn abandoned(&self) -> AbandonedWork {
        self.banks
            .iter()
            .fold(AbandonedWork::default(), |total, report| total.merge(report.abandoned))
    }

    /// Mean wait of every abandoned transaction, in time units
    pub fn mean_abandoned_age(&self) -> Option<f64> {
        self.abandoned().mean_age().map(|age| self.in_units(age))
    }

    pub fn total_settled(&self) -> u64 {
        self.banks.iter().map(|r| r.info.metrics.processed).sum()
    }

    pub fn total_failed(&self) -> u64 {
        self.banks.iter().map(|r| r.info.metrics.failed).sum()
    }

    /// Emit the per-bank statistics and totals through `tracing`
    pub fn log(&self) {
        for report in &self.banks {
            info!("{}", report.info);
        }

        let abandoned = self.abandoned();
        info!(
            abandoned = abandoned.count,
            mean_wait = self.mean_abandoned_age().unwrap_or(0.0),
            "{} transactions were left waiting and never settled",
            abandoned.count
        );
        info!(
            settled = self.total_settled(),
            failed = self.total_failed(),
            "Simulation finished"
        );
    }

    /// Write one CSV line per bank, header included
    pub async fn write_csv<W>(&self, mut writer: W) -> Result<(), ReportError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut csv = csv::Writer::from_writer(Vec::new());
        for report in &self.banks {
            csv.serialize(self.row(report))?;
        }
        let bytes = csv.into_inner().map_err(|e| e.into_error())?;

        writer.write_all(&bytes).await?;
        writer.flush().await?;
        Ok(())
    }

    fn row(&self, report: &BankReport) -> SummaryRow {
        let info = &report.info;
        let reserve = |currency: Currency| {
            info.reserves
                .iter()
                .find(|(c, _)| *c == currency)
                .map(|(_, balance)| *balance)
                .unwrap_or_default()
        };

        SummaryRow {
            bank: info.bank_id,
            currency: info.currency,
            reserve_usd: reserve(Currency::USD),
            reserve_eur: reserve(Currency::EUR),
            reserve_gbp: reserve(Currency::GBP),
            reserve_jpy: reserve(Currency::JPY),
            reserve_chf: reserve(Currency::CHF),
            reserve_brl: reserve(Currency::BRL),
            national: info.national_transactions,
            international: info.international_transactions,
            accounts: info.account_count,
            client_balance: info.client_balance,
            bank_taxes: info.revenue.bank_taxes,
            overdraft_taxes: info.revenue.overdraft_taxes,
            profit: info.revenue.profit(),
            processed: info.metrics.processed,
            failed: info.metrics.failed,
            mean_processing_time: info.metrics.mean_processing_time().map(|d| self.in_units(d)),
            abandoned: report.abandoned.count,
            mean_abandoned_age: report.abandoned.mean_age().map(|d| self.in_units(d)),
        }
    }

    fn in_units(&self, duration: Duration) -> f64 {
        if self.time_unit.is_zero() {
            return duration.as_secs_f64();
        }
        duration.as_secs_f64() / self.time_unit.as_secs_f64()
    }
}
