//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: accounts and account identifiers
//! - `transaction`: transfer requests, history records, billing records
//! - `error`: error types for the transfer engine

pub mod account;
pub mod error;
pub mod transaction;

pub use account::{Account, AccountId};
pub use error::{StaleBalance, TransferError};
pub use transaction::{
    BillingId, BillingRecord, BillingTarget, BillingType, TransactionId, TransactionRecord,
    TransactionStatus, TransferKind, TransferRequest, UserId,
};
