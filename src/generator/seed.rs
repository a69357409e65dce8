use std::ops::RangeInclusive;

use rand::Rng;

use crate::bank::Bank;
use crate::domain::{AccountId, Currency, DomainError, FixedPoint};

/// Opening balance of each currency vault, in whole units
pub const RESERVE_RANGE: RangeInclusive<i64> = 100_000_000..=10_000_000_000;

/// Opening balance of each seeded client account, in whole units
pub const BALANCE_RANGE: RangeInclusive<i64> = 50_000_000..=300_000_000;

/// Overdraft line of each seeded client account, in whole units
pub const OVERDRAFT_RANGE: RangeInclusive<i64> = 30_000_000..=100_000_000;

/// Fill every reserve vault and open `accounts` client accounts
///
/// Returns the ids of the new accounts.
pub fn seed_bank<G: Rng>(
    bank: &Bank,
    accounts: usize,
    rng: &mut G,
) -> Result<Vec<AccountId>, DomainError> {
    for currency in Currency::ALL {
        let amount = FixedPoint::from_units(rng.gen_range(RESERVE_RANGE));
        bank.reserves().deposit(currency, amount)?;
    }

    let ids = (0..accounts)
        .map(|_| {
            let balance = FixedPoint::from_units(rng.gen_range(BALANCE_RANGE));
            let limit = FixedPoint::from_units(rng.gen_range(OVERDRAFT_RANGE));
            bank.new_account(balance, limit)
        })
        .collect();

    Ok(ids)
}
