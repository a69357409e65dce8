pub mod accounts;
pub mod error;
pub mod queue;
pub mod reserves;

// Re-export commonly used types
pub use accounts::{AccountEntry, ConcurrentAccountStore};
pub use error::StorageError;
pub use queue::TransactionQueue;
pub use reserves::CurrencyReserves;
