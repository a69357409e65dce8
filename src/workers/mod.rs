pub mod error;
pub mod pool;
pub mod worker;

pub use error::{ErrorPolicy, LogErrors, SilentSkip};
pub use pool::{PoolHandle, PoolResults, ProcessorPool};
pub use worker::{WorkerReport, run_worker};
