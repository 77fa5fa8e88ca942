//! Bank Transfer Engine Library
//! # Overview
//!
//! This library provides a funds-transfer engine for a small banking ledger:
//! validated, atomic movements of money between accounts with an append-only
//! transaction history, plus a CSV batch harness with sync and async
//! processing strategies.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, TransferRequest, TransactionRecord, etc.)
//! - [`cli`] - CLI argument parsing
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Transfer orchestration and the commit protocol
//!   - [`core::account_store`] - Account lookup and CAS balance storage
//!   - [`core::validator`] - Per-kind request validation
//!   - [`core::ledger`] - Append-only transaction history
//!   - [`core::billing`] - Billing sub-records for bill payments
//! - [`io`] - CSV I/O with sync and async readers
//! - [`strategy`] - Pluggable sequential / concurrent pipelines
//!
//! # Transfer Kinds
//!
//! The engine supports four transfer kinds:
//!
//! - **SELF_TRANSFER**: Move funds between two accounts of the same user
//! - **TRANSFER_TO_OTHERS**: Move funds to another user's account
//! - **UPI**: One-sided debit addressed by an external payment identifier
//! - **BILL_PAYMENT**: One-sided debit with a linked billing record
//!   (electricity, rent, or water)
//!
//! # Consistency
//!
//! Balance mutations go through a compare-and-swap store interface with
//! bounded retry; a transfer either commits its balance write(s) together
//! with its history record or leaves no trace. Concurrent contention
//! surfaces as a retryable `Conflict` error, never as a negative balance.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use crate::core::{
    AccountStore, BatchProcessor, BillingRecorder, HistoryLedger, InMemoryAccountStore,
    TransactionValidator, TransferEngine, TransferPlan,
};
pub use crate::io::write_accounts_csv;
pub use crate::types::{
    Account, AccountId, BillingRecord, BillingTarget, BillingType, StaleBalance, TransactionId,
    TransactionRecord, TransactionStatus, TransferError, TransferKind, TransferRequest, UserId,
};
