//! Account lookup and balance storage
//!
//! This module defines the [`AccountStore`] trait the engine consumes and an
//! in-memory implementation backed by `DashMap`.
//!
//! # Design
//!
//! The engine never holds a lock across a whole transfer. Instead the store
//! exposes a compare-and-swap balance update: the caller passes the balance
//! it read, and the write is rejected with [`StaleBalance`] if another
//! writer got there first. Per-account read-modify-write is therefore
//! linearizable without any lock ordering concerns, and a lost race is
//! observable and retryable rather than silent.
//!
//! # Thread Safety
//!
//! `InMemoryAccountStore` uses `DashMap` for fine-grained per-account
//! locking. Operations on different accounts proceed in parallel; operations
//! on the same account are serialized by the map entry.

use crate::types::{Account, AccountId, StaleBalance};
use dashmap::DashMap;
use rust_decimal::Decimal;

/// Account lookup and balance mutation interface consumed by the engine
///
/// Implementations must provide linearizable per-account balance updates:
/// `update_balance` applies only if the account's current balance equals
/// `expected_prior`, and fails with [`StaleBalance`] otherwise.
pub trait AccountStore: Send + Sync {
    /// Look up an account by its internal identity
    fn find_by_id(&self, id: AccountId) -> Option<Account>;

    /// Look up an account by its externally addressable number
    fn find_by_number(&self, number: &str) -> Option<Account>;

    /// Compare-and-swap balance update
    ///
    /// Sets the account's balance to `new_balance` if and only if its
    /// current balance equals `expected_prior`.
    ///
    /// # Errors
    ///
    /// Returns [`StaleBalance`] if the account does not exist or its balance
    /// no longer matches `expected_prior`.
    fn update_balance(
        &self,
        id: AccountId,
        expected_prior: Decimal,
        new_balance: Decimal,
    ) -> Result<(), StaleBalance>;
}

/// In-memory account store
///
/// Holds accounts in a `DashMap` keyed by identity, with a secondary index
/// from account number to identity. Seeding (`insert`) and listing
/// (`accounts`) exist for the CSV harness and tests; in a deployment those
/// belong to the account-management collaborator.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    /// Accounts by internal identity
    accounts: DashMap<AccountId, Account>,

    /// Secondary index: account number to identity
    by_number: DashMap<String, AccountId>,
}

impl InMemoryAccountStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            by_number: DashMap::new(),
        }
    }

    /// Insert or replace an account
    ///
    /// Used to seed the store from the account CSV. Replacing an account
    /// re-points the number index; the engine itself never inserts.
    pub fn insert(&self, account: Account) {
        self.by_number.insert(account.number.clone(), account.id);
        self.accounts.insert(account.id, account);
    }

    /// Snapshot of all accounts, sorted by identity for deterministic output
    pub fn accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by_key(|account| account.id);
        accounts
    }

    /// Number of accounts in the store
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the store holds no accounts
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn find_by_id(&self, id: AccountId) -> Option<Account> {
        self.accounts.get(&id).map(|entry| entry.value().clone())
    }

    fn find_by_number(&self, number: &str) -> Option<Account> {
        let id = *self.by_number.get(number)?;
        self.find_by_id(id)
    }

    fn update_balance(
        &self,
        id: AccountId,
        expected_prior: Decimal,
        new_balance: Decimal,
    ) -> Result<(), StaleBalance> {
        // The entry guard serializes concurrent updates to the same account,
        // making the compare and the swap one atomic step.
        let mut entry = self
            .accounts
            .get_mut(&id)
            .ok_or(StaleBalance { account: id })?;

        if entry.balance != expected_prior {
            return Err(StaleBalance { account: id });
        }

        entry.balance = new_balance;
        Ok(())
    }
}
