use super::amount::FixedPoint;
use super::currency::Currency;

/// Identifier of a bank in the registry (its index)
pub type BankId = usize;

/// Identifier of an account within its bank
pub type AccountId = u32;

/// Customer account with private fields enforcing invariants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    bank_id: BankId,
    currency: Currency,
    balance: FixedPoint,
    overdraft_limit: FixedPoint,
}

impl Account {
    /// Create an account with an opening balance and overdraft line
    pub fn new(
        id: AccountId,
        bank_id: BankId,
        currency: Currency,
        balance: FixedPoint,
        overdraft_limit: FixedPoint,
    ) -> Self {
        Self {
            id,
            bank_id,
            currency,
            balance,
            overdraft_limit: overdraft_limit.max(FixedPoint::zero()),
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn bank_id(&self) -> BankId {
        self.bank_id
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Current balance; negative while the overdraft line is drawn
    pub fn balance(&self) -> FixedPoint {
        self.balance
    }

    pub fn overdraft_limit(&self) -> FixedPoint {
        self.overdraft_limit
    }

    /// Funds that can still be withdrawn, overdraft included
    pub fn spendable(&self) -> FixedPoint {
        self.balance + self.overdraft_limit
    }

    // Internal mutation, reserved for the operations module
    pub(crate) fn set_balance(&mut self, amount: FixedPoint) {
        self.balance = amount;
    }
}
