pub mod producer;
pub mod seed;

pub use producer::{AMOUNT_RANGE, ARRIVAL_GAP, TransactionGenerator, TransactionIds};
pub use seed::seed_bank;
