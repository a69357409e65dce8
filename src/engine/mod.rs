pub mod error;
pub mod processor;

pub use error::EngineError;
pub use processor::{
    EXCHANGE_PAYOUT, EXCHANGE_SPREAD, OVERDRAFT_INTEREST, PaymentProcessor, Settlement,
    SettlementKind,
};
