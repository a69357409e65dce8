use thiserror::Error;

use crate::domain::BankId;
use crate::storage::StorageError;

/// Bank-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    #[error("Bank {0} is shutting down")]
    ShutdownInProgress(BankId),

    #[error("Unknown bank: {0}")]
    UnknownBank(BankId),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        assert_eq!(
            BankError::ShutdownInProgress(3).to_string(),
            "Bank 3 is shutting down"
        );
        assert_eq!(BankError::UnknownBank(9).to_string(), "Unknown bank: 9");
    }

    #[test]
    fn storage_error_conversion() {
        let bank_err = BankError::from(StorageError::AccountNotFound(4));

        match bank_err {
            BankError::Storage(StorageError::AccountNotFound(4)) => {}
            _ => panic!("Expected Storage error variant"),
        }
    }
}
