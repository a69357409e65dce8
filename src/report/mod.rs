pub mod error;
pub mod summary;

pub use error::ReportError;
pub use summary::{BankReport, RunSummary};
