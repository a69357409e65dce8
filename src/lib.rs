//! Concurrent settlement of multi-currency payments between national banks
//!
//! Each bank owns its accounts, currency reserves and a FIFO of pending
//! transactions. Producers enqueue transfers; any number of payment
//! processors per bank dequeue and settle them, applying overdraft interest
//! and the exchange spread on cross-bank transfers.

pub mod app;
pub mod bank;
pub mod domain;
pub mod engine;
pub mod generator;
pub mod prelude;
pub mod report;
pub mod simulation;
pub mod storage;
pub mod workers;
