use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, warn};

use super::error::EngineError;
use crate::bank::{Bank, BankRegistry};
use crate::domain::{
    AccountRef, Currency, DomainError, ExchangeRates, FixedPoint, Transaction, TransactionStatus,
    Withdrawal, apply_deposit, apply_withdrawal,
};
use crate::storage::StorageError;

/// Interest charged on the overdraft-drawn part of a transfer
pub const OVERDRAFT_INTEREST: f64 = 0.05;

/// Share of a converted cross-bank amount kept by the processing bank
pub const EXCHANGE_SPREAD: f64 = 0.01;

/// Share of a converted cross-bank amount paid out to the destination
pub const EXCHANGE_PAYOUT: f64 = 0.99;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettlementKind {
    Domestic,
    CrossBank { rate: f64 },
}

/// Money movements of one successful settlement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    pub kind: SettlementKind,
    /// Taken from the origin account, in its currency
    pub debited: FixedPoint,
    /// Paid into the destination account
    pub credited: FixedPoint,
    /// Part of the debit drawn from the overdraft line
    pub overdraft: FixedPoint,
    pub bank_taxes: FixedPoint,
    pub overdraft_taxes: FixedPoint,
}

/// Settles transactions dequeued from one bank
///
/// Any number of processors may share a bank. Two settlements only contend
/// when they touch the same account, the same reserve vault or the same
/// counter group.
pub struct PaymentProcessor<R: ExchangeRates> {
    id: usize,
    bank: Arc<Bank>,
    registry: Arc<BankRegistry>,
    rates: Arc<R>,
    processing_delay: Duration,
}

impl<R: ExchangeRates> Clone for PaymentProcessor<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            bank: Arc::clone(&self.bank),
            registry: Arc::clone(&self.registry),
            rates: Arc::clone(&self.rates),
            processing_delay: self.processing_delay,
        }
    }
}

impl<R: ExchangeRates> PaymentProcessor<R> {
    /// Create a processor for `bank`, resolving other banks through `registry`
    pub fn new(id: usize, bank: Arc<Bank>, registry: Arc<BankRegistry>, rates: Arc<R>) -> Self {
        Self {
            id,
            bank,
            registry,
            rates,
            processing_delay: Duration::ZERO,
        }
    }

    /// Simulated latency added to every settlement (defaults to none)
    pub fn with_processing_delay(mut self, delay: Duration) -> Self {
        self.processing_delay = delay;
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn bank(&self) -> &Arc<Bank> {
        &self.bank
    }

    /// Settle a transaction and return its final status
    pub async fn process(&self, transaction: &mut Transaction) -> TransactionStatus {
        if let Err(e) = self.execute(transaction).await {
            warn!(
                bank = self.bank.id(),
                worker = self.id,
                tx_id = transaction.id(),
                error = %e,
                "Settlement failed"
            );
        }
        transaction.status()
    }

    /// Settle a transaction, stamp its status and timing, and update the
    /// bank's processing metrics
    pub async fn execute(&self, transaction: &mut Transaction) -> Result<Settlement, EngineError> {
        transaction.start_processing(Instant::now());

        let result = self.settle(transaction);

        if !self.processing_delay.is_zero() {
            tokio::time::sleep(self.processing_delay).await;
        }

        let status = if result.is_ok() {
            TransactionStatus::Successful
        } else {
            TransactionStatus::Failed
        };
        transaction.complete(status, Instant::now());
        self.bank
            .record_completion(status, transaction.processing_time().unwrap_or_default());

        result
    }

    /// Apply the money movements of a transaction
    ///
    /// On error no balance, reserve or counter is left changed.
    pub fn settle(&self, transaction: &Transaction) -> Result<Settlement, EngineError> {
        let origin_bank = self.route(transaction.origin())?;
        let destination_bank = self.route(transaction.destination())?;

        let settlement = if transaction.is_domestic_to(self.bank.id()) {
            self.settle_domestic(transaction, origin_bank, destination_bank)?
        } else {
            self.settle_cross_bank(transaction, origin_bank, destination_bank)?
        };

        debug!(
            bank = self.bank.id(),
            worker = self.id,
            tx_id = transaction.id(),
            debited = %settlement.debited,
            credited = %settlement.credited,
            overdraft = %settlement.overdraft,
            "Transaction settled"
        );

        Ok(settlement)
    }

    fn settle_domestic(
        &self,
        transaction: &Transaction,
        origin_bank: &Bank,
        destination_bank: &Bank,
    ) -> Result<Settlement, EngineError> {
        let amount = transaction.amount();
        let withdrawal = withdraw(origin_bank, transaction.origin(), amount)?;

        let overdraft_taxes = withdrawal.overdraft.scale(OVERDRAFT_INTEREST);
        let credited = amount - overdraft_taxes;

        if let Err(e) = credit(destination_bank, transaction.destination(), credited) {
            refund(origin_bank, transaction.origin(), amount);
            return Err(e);
        }

        self.bank.record_national();
        self.bank.add_revenue(FixedPoint::zero(), overdraft_taxes);

        Ok(Settlement {
            kind: SettlementKind::Domestic,
            debited: amount,
            credited,
            overdraft: withdrawal.overdraft,
            bank_taxes: FixedPoint::zero(),
            overdraft_taxes,
        })
    }

    fn settle_cross_bank(
        &self,
        transaction: &Transaction,
        origin_bank: &Bank,
        destination_bank: &Bank,
    ) -> Result<Settlement, EngineError> {
        let amount = transaction.amount();
        let currency = transaction.currency();
        let rate = self.rates.rate(self.bank.currency(), currency);

        let withdrawal = withdraw(origin_bank, transaction.origin(), amount)?;

        let overdraft_taxes = withdrawal.overdraft.scale(OVERDRAFT_INTEREST);
        let principal = amount - overdraft_taxes;
        let gross = principal.scale(rate);
        let payout = gross.scale(EXCHANGE_PAYOUT);
        let bank_taxes = if withdrawal.used_overdraft() {
            principal.scale(EXCHANGE_SPREAD)
        } else {
            gross - payout
        };

        // The vault takes the full converted amount and pays out the net
        let converted = amount.scale(rate);
        if let Err(e) = self.bank.reserves().settle(currency, converted, payout) {
            refund(origin_bank, transaction.origin(), amount);
            return Err(e.into());
        }

        if let Err(e) = credit(destination_bank, transaction.destination(), payout) {
            self.reverse_reserve(currency, converted, payout);
            refund(origin_bank, transaction.origin(), amount);
            return Err(e);
        }

        self.bank.record_international();
        self.bank.add_revenue(bank_taxes, overdraft_taxes);

        Ok(Settlement {
            kind: SettlementKind::CrossBank { rate },
            debited: amount,
            credited: payout,
            overdraft: withdrawal.overdraft,
            bank_taxes,
            overdraft_taxes,
        })
    }

    fn route(&self, target: AccountRef) -> Result<&Arc<Bank>, EngineError> {
        self.registry
            .resolve(target)
            .ok_or(EngineError::UnknownRoute {
                bank: target.bank,
                account: target.account,
            })
    }

    fn reverse_reserve(&self, currency: Currency, converted: FixedPoint, payout: FixedPoint) {
        if let Err(e) = self.bank.reserves().settle(currency, payout, converted) {
            error!(bank = self.bank.id(), %currency, error = %e, "Reserve reversal failed");
        }
    }
}

fn withdraw(bank: &Bank, target: AccountRef, amount: FixedPoint) -> Result<Withdrawal, EngineError> {
    let unknown = EngineError::UnknownRoute {
        bank: target.bank,
        account: target.account,
    };
    let mut entry = bank.accounts().entry(target.account).map_err(|_| unknown.clone())?;

    entry
        .try_update(|account| apply_withdrawal(account, amount))
        .map_err(|e| match e {
            StorageError::DomainError(DomainError::InsufficientFunds) => {
                EngineError::InsufficientFunds {
                    bank: target.bank,
                    account: target.account,
                }
            }
            StorageError::AccountNotFound(_) => unknown,
            other => EngineError::Storage(other),
        })
}

fn credit(bank: &Bank, target: AccountRef, amount: FixedPoint) -> Result<(), EngineError> {
    if !amount.is_positive() {
        return Ok(());
    }

    bank.accounts()
        .entry(target.account)?
        .try_update(|account| apply_deposit(account, amount))?;
    Ok(())
}

fn refund(bank: &Bank, target: AccountRef, amount: FixedPoint) {
    if let Err(e) = credit(bank, target, amount) {
        error!(
            bank = target.bank,
            account = target.account,
            amount = %amount,
            error = %e,
            "Refund after failed settlement did not apply"
        );
    }
}
