use dashmap::DashMap;

use crate::domain::{Currency, DomainError, FixedPoint};

/// One vault per supported currency, owned by a single bank
///
/// Vaults carry no overdraft limit: a withdrawal always succeeds and may take a
/// vault below zero.
pub struct CurrencyReserves {
    vaults: DashMap<Currency, FixedPoint>,
}

impl CurrencyReserves {
    /// Create reserves with every vault empty
    pub fn new() -> Self {
        let vaults = DashMap::with_capacity(Currency::ALL.len());
        for currency in Currency::ALL {
            vaults.insert(currency, FixedPoint::zero());
        }
        Self { vaults }
    }

    pub fn balance(&self, currency: Currency) -> FixedPoint {
        self.vaults
            .get(&currency)
            .map(|r| *r.value())
            .unwrap_or_default()
    }

    pub fn deposit(&self, currency: Currency, amount: FixedPoint) -> Result<(), DomainError> {
        self.settle(currency, amount, FixedPoint::zero()).map(|_| ())
    }

    pub fn withdraw(&self, currency: Currency, amount: FixedPoint) -> Result<(), DomainError> {
        self.settle(currency, FixedPoint::zero(), amount).map(|_| ())
    }

    /// Credit then debit one vault inside a single critical section
    ///
    /// Returns the net change. Negative legs are rejected and leave the vault
    /// untouched.
    pub fn settle(
        &self,
        currency: Currency,
        credit: FixedPoint,
        debit: FixedPoint,
    ) -> Result<FixedPoint, DomainError> {
        if credit < FixedPoint::zero() || debit < FixedPoint::zero() {
            return Err(DomainError::InvalidAmount);
        }

        let mut vault = self.vaults.entry(currency).or_default();
        let updated = vault
            .value()
            .checked_add(credit)
            .and_then(|v| v.checked_sub(debit))
            .ok_or(DomainError::Overflow)?;

        *vault.value_mut() = updated;
        Ok(credit - debit)
    }

    /// Balances of every vault in [`Currency::ALL`] order
    pub fn snapshot(&self) -> Vec<(Currency, FixedPoint)> {
        Currency::ALL
            .iter()
            .map(|&currency| (currency, self.balance(currency)))
            .collect()
    }
}

impl Default for CurrencyReserves {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn new_reserves_are_empty() {
        let reserves = CurrencyReserves::new();
        let snapshot = reserves.snapshot();

        assert_eq!(snapshot.len(), 6);
        assert!(snapshot.iter().all(|(_, balance)| *balance == FixedPoint::zero()));
        assert_eq!(snapshot[3].0, Currency::JPY);
    }

    #[test]
    fn deposit_and_withdraw_adjust_one_vault() {
        let reserves = CurrencyReserves::new();
        reserves.deposit(Currency::EUR, FixedPoint::from_units(100)).unwrap();
        reserves.withdraw(Currency::EUR, FixedPoint::from_units(40)).unwrap();

        assert_eq!(reserves.balance(Currency::EUR), FixedPoint::from_units(60));
        assert_eq!(reserves.balance(Currency::USD), FixedPoint::zero());
    }

    #[test]
    fn withdraw_may_go_negative() {
        let reserves = CurrencyReserves::new();
        reserves.withdraw(Currency::BRL, FixedPoint::from_units(5)).unwrap();
        assert_eq!(reserves.balance(Currency::BRL), FixedPoint::from_units(-5));
    }

    #[test]
    fn settle_keeps_the_spread() {
        let reserves = CurrencyReserves::new();
        let net = reserves
            .settle(
                Currency::EUR,
                FixedPoint::from_units(450),
                FixedPoint::from_raw(4_455_000),
            )
            .unwrap();

        assert_eq!(net, FixedPoint::from_raw(45_000));
        assert_eq!(reserves.balance(Currency::EUR), FixedPoint::from_raw(45_000));
    }

    #[test]
    fn negative_legs_are_rejected() {
        let reserves = CurrencyReserves::new();
        let result = reserves.deposit(Currency::USD, FixedPoint::from_units(-1));

        assert_eq!(result, Err(DomainError::InvalidAmount));
        assert_eq!(reserves.balance(Currency::USD), FixedPoint::zero());
    }

    #[test]
    fn concurrent_settlements_on_one_vault() {
        let reserves = Arc::new(CurrencyReserves::new());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let reserves = Arc::clone(&reserves);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        reserves
                            .settle(Currency::GBP, FixedPoint::from_raw(100), FixedPoint::from_raw(99))
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(reserves.balance(Currency::GBP), FixedPoint::from_raw(4_000));
    }
}
