use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use super::state::{ProcessingMetrics, Revenue};
use crate::domain::{BankId, Currency, FixedPoint, Transaction};

/// Snapshot of a bank's statistics
///
/// Each figure is read under its own lock, so the snapshot is consistent per
/// counter but not linearizable with settlements still in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct BankInfo {
    pub bank_id: BankId,
    pub currency: Currency,
    pub reserves: Vec<(Currency, FixedPoint)>,
    pub national_transactions: u64,
    pub international_transactions: u64,
    pub account_count: usize,
    pub client_balance: FixedPoint,
    pub revenue: Revenue,
    pub metrics: ProcessingMetrics,
    pub pending: usize,
}

impl fmt::Display for BankInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Statistics of national bank {} ({}):", self.bank_id, self.currency)?;
        writeln!(f, "  Reserves:")?;
        for (currency, balance) in &self.reserves {
            writeln!(f, "    {} -> {}", currency, balance)?;
        }
        writeln!(f, "  National transfers -> {}", self.national_transactions)?;
        writeln!(f, "  International transfers -> {}", self.international_transactions)?;
        writeln!(f, "  Registered accounts -> {}", self.account_count)?;
        writeln!(f, "  Total client balance -> {}", self.client_balance)?;
        writeln!(f, "  Settled -> {} ({} failed)", self.metrics.processed, self.metrics.failed)?;
        write!(f, "  Profit -> {} {}", self.currency, self.revenue.profit())
    }
}

/// Transactions still queued when a bank stopped operating
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbandonedWork {
    pub count: usize,
    pub total_age: Duration,
}

impl AbandonedWork {
    pub fn from_transactions(transactions: &[Transaction], now: Instant) -> Self {
        Self {
            count: transactions.len(),
            total_age: transactions.iter().map(|tx| tx.age(now)).sum(),
        }
    }

    pub fn mean_age(&self) -> Option<Duration> {
        let count = u32::try_from(self.count).ok().filter(|n| *n > 0)?;
        Some(self.total_age / count)
    }

    /// Combine two tallies
    pub fn merge(self, other: Self) -> Self {
        Self {
            count: self.count + other.count,
            total_age: self.total_age + other.total_age,
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
            AccountRef::new(1, 0),
            FixedPoint::from_units(1),
            Currency::EUR,
        )
        .unwrap()
    }

    #[test]
    fn abandoned_work_measures_age() {
        let first = tx(1);
        let second = tx(2);
        let now = first.created_at().max(second.created_at()) + Duration::from_secs(4);

        let abandoned = AbandonedWork::from_transactions(&[first.clone(), second.clone()], now);

        assert_eq!(abandoned.count, 2);
        assert_eq!(abandoned.total_age, first.age(now) + second.age(now));
        assert!(abandoned.mean_age().unwrap() >= Duration::from_secs(4));
    }

    #[test]
    fn empty_queue_has_no_mean_age() {
        let abandoned = AbandonedWork::from_transactions(&[], Instant::now());
        assert_eq!(abandoned, AbandonedWork::default());
        assert_eq!(abandoned.mean_age(), None);
    }

    #[test]
    fn merge_adds_tallies() {
        let a = AbandonedWork {
            count: 1,
            total_age: Duration::from_secs(2),
        };
        let b = AbandonedWork {
            count: 3,
            total_age: Duration::from_secs(6),
        };

        let merged = a.merge(b);
        assert_eq!(merged.count, 4);
        assert_eq!(merged.mean_age(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn display_lists_reserves_and_profit() {
        let info = BankInfo {
            bank_id: 0,
            currency: Currency::USD,
            reserves: vec![(Currency::USD, FixedPoint::from_units(10))],
            national_transactions: 2,
            international_transactions: 1,
            account_count: 3,
            client_balance: FixedPoint::from_units(300),
            revenue: Revenue {
                bank_taxes: FixedPoint::from_raw(45_000),
                overdraft_taxes: FixedPoint::from_units(5),
            },
            metrics: ProcessingMetrics::default(),
            pending: 0,
        };

        let text = info.to_string();
        assert!(text.contains("national bank 0 (USD)"));
        assert!(text.contains("USD -> 10.0000"));
        assert!(text.contains("Registered accounts -> 3"));
        assert!(text.contains("Profit -> USD 9.5000"));
    }
}
