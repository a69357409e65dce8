use thiserror::Error;

use crate::domain::{AccountId, DomainError};

/// Storage-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Domain error: {0}")]
    DomainError(#[from] DomainError),
}
