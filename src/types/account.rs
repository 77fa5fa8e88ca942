//! Account-related types for the transfer engine
//!
//! This module defines the Account structure shared between the engine core
//! and the account store. Accounts themselves are created and destroyed by an
//! external account-management collaborator; the engine only ever mutates
//! their balances.

use super::transaction::UserId;
use rust_decimal::Decimal;

/// Account identifier
///
/// Supports account IDs from 0 to 2^64 - 1
pub type AccountId = u64;

/// A bank account as seen by the transfer engine
///
/// The `number` is the externally addressable alias used in transfer
/// requests; the `id` is the internal identity referenced by transaction
/// history records.
///
/// Invariant: `balance >= 0` at all observable times. The balance is only
/// mutated through [`crate::core::AccountStore::update_balance`] within a
/// transfer commit.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Internal account identity
    pub id: AccountId,

    /// Externally addressable account number (unique alias)
    pub number: String,

    /// Owning user
    pub user: UserId,

    /// Current balance
    pub balance: Decimal,
}

impl Account {
    /// Create an account with the given identity and a zero balance
    pub fn new(id: AccountId, number: impl Into<String>, user: UserId) -> Self {
        Account {
            id,
            number: number.into(),
            user,
            balance: Decimal::ZERO,
        }
    }

    /// Create an account with an opening balance
    pub fn with_balance(
        id: AccountId,
        number: impl Into<String>,
        user: UserId,
        balance: Decimal,
    ) -> Self {
        Account {
            id,
            number: number.into(),
            user,
            balance,
        }
    }
}
