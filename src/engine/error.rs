use thiserror::Error;

use crate::bank::BankError;
use crate::domain::{AccountId, BankId, DomainError};
use crate::storage::StorageError;

/// Engine-level errors for transaction settlement
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Insufficient funds in account {account} of bank {bank}")]
    InsufficientFunds { bank: BankId, account: AccountId },

    #[error("Unknown route: account {account} of bank {bank}")]
    UnknownRoute { bank: BankId, account: AccountId },

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Bank error: {0}")]
    Bank(#[from] BankError),
}
