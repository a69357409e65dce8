use std::sync::Arc;

use super::error::BankError;
use super::state::Bank;
use crate::domain::{AccountRef, BankId, Currency};

/// The set of banks taking part in a run, indexed by bank id
///
/// Built once by whoever orchestrates the run and shared by reference with the
/// processors that need to reach other banks.
#[derive(Clone, Default)]
pub struct BankRegistry {
    banks: Vec<Arc<Bank>>,
}

impl BankRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One bank per currency; bank `i` uses `currencies[i]` as home currency
    pub fn with_currencies(currencies: &[Currency]) -> Self {
        let mut registry = Self::new();
        for &currency in currencies {
            registry.add_bank(currency);
        }
        registry
    }

    /// Register a bank with the next id
    pub fn add_bank(&mut self, currency: Currency) -> Arc<Bank> {
        let bank = Arc::new(Bank::new(self.banks.len(), currency));
        self.banks.push(Arc::clone(&bank));
        bank
    }

    pub fn get(&self, id: BankId) -> Result<&Arc<Bank>, BankError> {
        self.banks.get(id).ok_or(BankError::UnknownBank(id))
    }

    /// Bank holding `target`, if both the bank and the account exist
    pub fn resolve(&self, target: AccountRef) -> Option<&Arc<Bank>> {
        self.banks
            .get(target.bank)
            .filter(|bank| bank.accounts().contains(target.account))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Bank>> {
        self.banks.iter()
    }

    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }

    /// Stop every bank; returns how many were still operating
    pub fn shutdown_all(&self) -> usize {
        self.banks.iter().filter(|bank| bank.shutdown()).count()
    }
}
