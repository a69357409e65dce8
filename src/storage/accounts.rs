use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;

use super::error::StorageError;
use crate::domain::{Account, AccountId, BankId, Currency, DomainError, FixedPoint};

/// Concurrent in-memory account book of one bank, backed by DashMap
///
/// Accounts are append-only: ids are handed out sequentially and an account,
/// once opened, stays for the whole run.
pub struct ConcurrentAccountStore {
    bank_id: BankId,
    currency: Currency,
    accounts: DashMap<AccountId, Account>,
    next_id: AtomicU32,
}

impl ConcurrentAccountStore {
    /// Create an empty account book for a bank
    pub fn new(bank_id: BankId, currency: Currency) -> Self {
        Self {
            bank_id,
            currency,
            accounts: DashMap::new(),
            next_id: AtomicU32::new(0),
        }
    }

    /// Open a new account with the next sequential id
    pub fn open(&self, balance: FixedPoint, overdraft_limit: FixedPoint) -> AccountId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let account = Account::new(id, self.bank_id, self.currency, balance, overdraft_limit);
        self.accounts.insert(id, account);
        id
    }

    /// Entry handle for an existing account
    pub fn entry(&self, account_id: AccountId) -> Result<AccountEntry<'_>, StorageError> {
        if !self.accounts.contains_key(&account_id) {
            return Err(StorageError::AccountNotFound(account_id));
        }
        Ok(AccountEntry {
            account_id,
            accounts: &self.accounts,
        })
    }

    pub fn contains(&self, account_id: AccountId) -> bool {
        self.accounts.contains_key(&account_id)
    }

    /// Clone of the account's current state
    pub fn read(&self, account_id: AccountId) -> Option<Account> {
        self.accounts.get(&account_id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Sum of all client balances
    ///
    /// DashMap holds brief per-shard locks while iterating, so the result is
    /// consistent per account but not across concurrent settlements.
    pub fn total_balance(&self) -> FixedPoint {
        self.accounts.iter().map(|entry| entry.value().balance()).sum()
    }

    /// Clone of every account, ordered by id
    pub fn snapshot(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by_key(Account::id);
        accounts
    }
}

/// Entry for atomic access to one account
pub struct AccountEntry<'a> {
    account_id: AccountId,
    accounts: &'a DashMap<AccountId, Account>,
}

impl AccountEntry<'_> {
    /// Atomic read-modify-write with validation
    ///
    /// The account's shard stays write-locked for the duration of `update_fn`,
    /// so concurrent withdrawals and deposits on the same account serialize.
    pub fn try_update<F, R>(&mut self, update_fn: F) -> Result<R, StorageError>
    where
        F: FnOnce(&mut Account) -> Result<R, DomainError>,
    {
        let mut account = self
            .accounts
            .get_mut(&self.account_id)
            .ok_or(StorageError::AccountNotFound(self.account_id))?;
        Ok(update_fn(account.value_mut())?)
    }
}
