pub mod error;
pub mod info;
pub mod registry;
pub mod state;

// Re-export commonly used types
pub use error::BankError;
pub use info::{AbandonedWork, BankInfo};
pub use registry::BankRegistry;
pub use state::{Bank, ProcessingMetrics, Revenue};
