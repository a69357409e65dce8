pub mod account;
pub mod amount;
pub mod currency;
pub mod error;
pub mod operations;
pub mod transaction;

// Re-export commonly used types
pub use account::{Account, AccountId, BankId};
pub use amount::FixedPoint;
pub use currency::{Currency, ExchangeRates, StaticRateTable};
pub use error::DomainError;
pub use operations::{Withdrawal, apply_deposit, apply_withdrawal};
pub use transaction::{AccountRef, Transaction, TransactionId, TransactionStatus};
