use tracing::warn;

use crate::domain::Transaction;
use crate::engine::EngineError;

/// Policy for reacting to a settlement that failed
///
/// Failures are local to one transaction: the worker keeps draining its queue
/// whatever the policy does.
pub trait ErrorPolicy: Send + Sync {
    fn handle_settlement_error(&self, transaction: &Transaction, error: &EngineError);
}

/// Log each failed settlement as a warning
#[derive(Debug, Clone, Copy, Default)]
pub struct LogErrors;

impl ErrorPolicy for LogErrors {
    fn handle_settlement_error(&self, transaction: &Transaction, error: &EngineError) {
        warn!(
            tx_id = transaction.id(),
            origin_bank = transaction.origin().bank,
            origin_account = transaction.origin().account,
            amount = %transaction.amount(),
            error = %error,
            "Transaction failed"
        );
    }
}

/// Ignore failed settlements
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSkip;

impl ErrorPolicy for SilentSkip {
    fn handle_settlement_error(&self, _transaction: &Transaction, _error: &EngineError) {}
}
