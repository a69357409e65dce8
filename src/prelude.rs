//! Prelude module for convenient imports
//!
//! Import everything you need with: `use banknet::prelude::*;`

// Domain types
pub use crate::domain::{
    Account, AccountId, AccountRef, BankId, Currency, DomainError, ExchangeRates, FixedPoint,
    StaticRateTable, Transaction, TransactionId, TransactionStatus,
};

// Storage types
pub use crate::storage::{ConcurrentAccountStore, CurrencyReserves, StorageError, TransactionQueue};

// Bank types
pub use crate::bank::{AbandonedWork, Bank, BankError, BankInfo, BankRegistry, Revenue};

// Engine types
pub use crate::engine::{EngineError, PaymentProcessor, Settlement, SettlementKind};

// Worker types
pub use crate::workers::{
    ErrorPolicy, LogErrors, PoolHandle, PoolResults, ProcessorPool, SilentSkip, WorkerReport,
    run_worker,
};

// Traffic and seeding
pub use crate::generator::{TransactionGenerator, TransactionIds, seed_bank};

// Reporting
pub use crate::report::{ReportError, RunSummary};

// App types
pub use crate::app::{AppError, Args, CliApp, SimulationConfig};
pub use crate::simulation::Simulation;
