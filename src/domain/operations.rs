use super::account::Account;
use super::amount::FixedPoint;
use super::error::DomainError;

/// Outcome of a successful withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Withdrawal {
    /// Portion of the amount drawn from the overdraft line
    pub overdraft: FixedPoint,
}

impl Withdrawal {
    pub fn used_overdraft(&self) -> bool {
        self.overdraft.is_positive()
    }
}

/// Apply a deposit to an account
pub fn apply_deposit(account: &mut Account, amount: FixedPoint) -> Result<(), DomainError> {
    if !amount.is_positive() {
        return Err(DomainError::InvalidAmount);
    }

    let new_balance = account
        .balance()
        .checked_add(amount)
        .ok_or(DomainError::Overflow)?;

    account.set_balance(new_balance);
    Ok(())
}

/// Apply a withdrawal, drawing on the overdraft line when the balance is short
///
/// The overdraft drawn is `amount - max(balance_before, 0)`, so an account
/// that is already negative draws the whole amount from its line.
///
/// Leaves the account untouched on error. The balance never ends below
/// `-overdraft_limit`.
pub fn apply_withdrawal(
    account: &mut Account,
    amount: FixedPoint,
) -> Result<Withdrawal, DomainError> {
    if !amount.is_positive() {
        return Err(DomainError::InvalidAmount);
    }

    let before = account.balance();
    if account.spendable() < amount {
        return Err(DomainError::InsufficientFunds);
    }

    let new_balance = before.checked_sub(amount).ok_or(DomainError::Overflow)?;

    // Only the part not covered by a positive balance is overdraft credit
    let overdraft = if before >= amount {
        FixedPoint::zero()
    } else {
        amount - before.max(FixedPoint::zero())
    };

    account.set_balance(new_balance);
    Ok(Withdrawal { overdraft })
}
