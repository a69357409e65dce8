use std::time::Duration;

use tokio::time::Instant;

use super::account::{AccountId, BankId};
use super::amount::FixedPoint;
use super::currency::Currency;
use super::error::DomainError;

/// Identifier of a transaction, unique within a run
pub type TransactionId = u64;

/// Address of an account in the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountRef {
    pub bank: BankId,
    pub account: AccountId,
}

impl AccountRef {
    pub fn new(bank: BankId, account: AccountId) -> Self {
        Self { bank, account }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Successful,
    Failed,
}

/// Transfer request travelling through a bank's queue
///
/// Everything but the status and timing stamps is fixed at creation. The
/// processor that dequeues the transaction is its only writer.
#[derive(Debug, Clone)]
pub struct Transaction {
    id: TransactionId,
    origin: AccountRef,
    destination: AccountRef,
    amount: FixedPoint,
    currency: Currency,
    created_at: Instant,
    status: TransactionStatus,
    processing_started_at: Option<Instant>,
    completed_at: Option<Instant>,
}

impl Transaction {
    /// Create a pending transaction stamped with the current time
    pub fn new(
        id: TransactionId,
        origin: AccountRef,
        destination: AccountRef,
        amount: FixedPoint,
        currency: Currency,
    ) -> Result<Self, DomainError> {
        if !amount.is_positive() {
            return Err(DomainError::InvalidAmount);
        }

        Ok(Self {
            id,
            origin,
            destination,
            amount,
            currency,
            created_at: Instant::now(),
            status: TransactionStatus::Pending,
            processing_started_at: None,
            completed_at: None,
        })
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn origin(&self) -> AccountRef {
        self.origin
    }

    pub fn destination(&self) -> AccountRef {
        self.destination
    }

    pub fn amount(&self) -> FixedPoint {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn is_domestic_to(&self, bank: BankId) -> bool {
        self.destination.bank == bank
    }

    /// Time spent since creation, measured at `now`
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// Duration between processing start and completion, once both are stamped
    pub fn processing_time(&self) -> Option<Duration> {
        match (self.processing_started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end.saturating_duration_since(start)),
            _ => None,
        }
    }

    pub(crate) fn start_processing(&mut self, now: Instant) {
        if self.processing_started_at.is_none() {
            self.processing_started_at = Some(now);
        }
    }

    /// Record the final status; a transaction settles exactly once
    pub(crate) fn complete(&mut self, status: TransactionStatus, now: Instant) -> bool {
        if self.status != TransactionStatus::Pending || status == TransactionStatus::Pending {
            return false;
        }
        self.status = status;
        self.completed_at = Some(now);
        true
    }
}
