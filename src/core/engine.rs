//! Transfer orchestration
//!
//! This module provides the [`TransferEngine`], which turns a validated
//! transfer request into committed state: one or two balance writes, an
//! appended history record, and a billing record for bill payments.
//!
//! # Commit protocol
//!
//! Balance writes go through the account store's compare-and-swap
//! [`update_balance`](crate::core::AccountStore::update_balance). A write
//! that loses a race restarts the whole attempt with fresh reads, up to
//! [`MAX_COMMIT_ATTEMPTS`]; exhaustion surfaces as the retryable
//! [`TransferError::Conflict`]. No lock is ever held across a transfer, so
//! two opposite-direction transfers over the same account pair cannot
//! deadlock.
//!
//! Two-sided transfers debit the source before crediting the destination.
//! The destination was validated before any write, so a credit that loses
//! its race is simply retried against a fresh read; if the retries run dry
//! the compensating action re-credits the source and the attempt restarts.
//! Compensation only ever adds money back, which keeps every balance
//! non-negative at all observable times.
//!
//! # Thread Safety
//!
//! The engine is `Clone` and takes `&self`; all internal state lives behind
//! `Arc`, so concurrent workers share one engine.

use crate::core::account_store::{AccountStore, InMemoryAccountStore};
use crate::core::billing::BillingRecorder;
use crate::core::ledger::{HistoryLedger, KeyReservation, PendingRecord};
use crate::core::validator::{TransactionValidator, TransferPlan};
use crate::types::{Account, AccountId, TransactionRecord, TransferError, TransferRequest};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Upper bound on full commit attempts before giving up with `Conflict`
pub const MAX_COMMIT_ATTEMPTS: usize = 5;

/// Upper bound on fresh-read retries for a single credit or compensation
const MAX_CAS_RETRIES: usize = 16;

/// Orchestrates validation, balance mutation, and record persistence
///
/// Generic over the [`AccountStore`] implementation so the engine can run
/// against the bundled in-memory store or any store honoring the CAS
/// contract.
#[derive(Debug)]
pub struct TransferEngine<S: AccountStore = InMemoryAccountStore> {
    accounts: Arc<S>,
    ledger: Arc<HistoryLedger>,
    billing: Arc<BillingRecorder>,
}

impl<S: AccountStore> Clone for TransferEngine<S> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            ledger: Arc::clone(&self.ledger),
            billing: Arc::clone(&self.billing),
        }
    }
}

impl TransferEngine<InMemoryAccountStore> {
    /// Create an engine over a fresh in-memory store, ledger, and recorder
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryAccountStore::new()),
            Arc::new(HistoryLedger::new()),
            Arc::new(BillingRecorder::new()),
        )
    }
}

impl<S: AccountStore> TransferEngine<S> {
    /// Create an engine over the given collaborators
    pub fn new(
        accounts: Arc<S>,
        ledger: Arc<HistoryLedger>,
        billing: Arc<BillingRecorder>,
    ) -> Self {
        Self {
            accounts,
            ledger,
            billing,
        }
    }

    /// The account store this engine mutates
    pub fn accounts(&self) -> &Arc<S> {
        &self.accounts
    }

    /// The transaction history this engine appends to
    pub fn ledger(&self) -> &Arc<HistoryLedger> {
        &self.ledger
    }

    /// The billing recorder this engine appends to
    pub fn billing(&self) -> &Arc<BillingRecorder> {
        &self.billing
    }

    /// Apply a transfer request
    ///
    /// Pipeline per attempt: resolve the source account, check balance
    /// sufficiency, run the per-kind validation (which resolves the
    /// destination), then commit the balance write(s) and append the
    /// history record (plus billing record for bill payments).
    ///
    /// Failures before the balance writes abort with zero side effects.
    /// A lost balance race restarts the attempt with fresh reads; after
    /// [`MAX_COMMIT_ATTEMPTS`] lost races the request fails with the
    /// retryable [`TransferError::Conflict`].
    ///
    /// # Errors
    ///
    /// - `Validation` for a bad amount or missing conditionally-required field
    /// - `AccountNotFound` if source or destination does not resolve
    /// - `InsufficientFunds` if the source cannot cover the amount
    /// - `OwnershipMismatch` for self transfers touching foreign accounts
    /// - `DuplicateRequest` if the idempotency key was already used
    /// - `Conflict` when contention exhausts the commit retries
    /// - `Internal` on unrecoverable storage inconsistencies
    pub fn apply(&self, request: &TransferRequest) -> Result<TransactionRecord, TransferError> {
        if request.amount <= Decimal::ZERO {
            return Err(TransferError::validation(
                "amount",
                "must be greater than zero",
            ));
        }

        // Reserve the idempotency key before any mutation. The guard releases
        // the key if this request fails before committing.
        let mut reservation = request
            .idempotency_key
            .as_deref()
            .map(|key| self.ledger.reserve_key(key))
            .transpose()?;

        let mut attempts = 0;
        loop {
            let from = self
                .accounts
                .find_by_number(&request.from_account)
                .ok_or_else(|| TransferError::account_not_found(&request.from_account))?;

            if from.balance < request.amount {
                return Err(TransferError::insufficient_funds(
                    from.id,
                    from.balance,
                    request.amount,
                ));
            }

            let plan = TransactionValidator::validate(request, &from, self.accounts.as_ref())?;

            if self.try_commit(&from, &plan, request.amount)? {
                let record = self.persist(request, &from, plan, reservation.take());
                tracing::info!(
                    kind = record.kind.as_str(),
                    transaction = record.id,
                    user = record.user_id,
                    amount = %record.amount,
                    "transfer committed"
                );
                return Ok(record);
            }

            attempts += 1;
            if attempts >= MAX_COMMIT_ATTEMPTS {
                tracing::warn!(
                    account = from.id,
                    attempts,
                    "transfer aborted after repeated balance conflicts"
                );
                return Err(TransferError::conflict(from.id));
            }
            tracing::debug!(account = from.id, attempts, "balance write lost the race; retrying");
        }
    }

    /// Apply the balance write(s) for one attempt
    ///
    /// Returns `Ok(false)` when a write lost its race and the attempt should
    /// restart with fresh reads.
    fn try_commit(
        &self,
        from: &Account,
        plan: &TransferPlan,
        amount: Decimal,
    ) -> Result<bool, TransferError> {
        let debited = from.balance.checked_sub(amount).ok_or_else(|| {
            TransferError::internal(format!("balance underflow debiting account {}", from.id))
        })?;

        match plan {
            TransferPlan::AccountCredit { to } => {
                if self
                    .accounts
                    .update_balance(from.id, from.balance, debited)
                    .is_err()
                {
                    return Ok(false);
                }

                if self.credit_with_retry(to.id, amount)? {
                    return Ok(true);
                }

                // Compensating action: put the debited amount back, then let
                // the caller restart with fresh reads.
                if !self.credit_with_retry(from.id, amount)? {
                    return Err(TransferError::internal(format!(
                        "failed to restore balance of account {} after aborted credit",
                        from.id
                    )));
                }
                Ok(false)
            }
            TransferPlan::UpiDebit { .. } | TransferPlan::BillDebit { .. } => Ok(self
                .accounts
                .update_balance(from.id, from.balance, debited)
                .is_ok()),
        }
    }

    /// Add `amount` to an account via fresh-read CAS, retrying lost races
    ///
    /// Returns `Ok(false)` if the retries run dry or the account vanished.
    fn credit_with_retry(
        &self,
        account: AccountId,
        amount: Decimal,
    ) -> Result<bool, TransferError> {
        for _ in 0..MAX_CAS_RETRIES {
            let Some(current) = self.accounts.find_by_id(account) else {
                return Ok(false);
            };
            let credited = current.balance.checked_add(amount).ok_or_else(|| {
                TransferError::internal(format!("balance overflow crediting account {}", account))
            })?;
            if self
                .accounts
                .update_balance(account, current.balance, credited)
                .is_ok()
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Append the history record (and billing record for bill payments)
    fn persist(
        &self,
        request: &TransferRequest,
        from: &Account,
        plan: TransferPlan,
        reservation: Option<KeyReservation<'_>>,
    ) -> TransactionRecord {
        let (to_account, upi_id, billing_target) = match plan {
            TransferPlan::AccountCredit { to } => (Some(to.id), None, None),
            TransferPlan::UpiDebit { upi_id } => (None, Some(upi_id), None),
            TransferPlan::BillDebit { target } => (None, None, Some(target)),
        };

        let record = self.ledger.append(
            PendingRecord {
                user_id: request.user_id,
                kind: request.kind,
                from_account: Some(from.id),
                to_account,
                amount: request.amount,
                upi_id,
            },
            reservation,
        );

        if let Some(target) = billing_target {
            self.billing.create(record.id, record.amount, target);
        }

        record
    }
}
