//! Error types for the transfer engine
//!
//! This module defines all error types that can occur while applying a
//! transfer or running the CSV pipeline.
//!
//! # Error Categories
//!
//! - **Request Errors**: validation failures, unknown accounts, insufficient
//!   funds, ownership violations — deterministic outcomes of the input,
//!   reported to the caller without retry.
//! - **Contention Errors**: `Conflict` signals that concurrent mutation kept
//!   winning the balance race; the caller may retry the same request.
//! - **Infrastructure Errors**: `Internal` is an opaque failure; underlying
//!   storage detail must not leak to the caller.
//! - **File I/O and CSV Parsing Errors**: fatal or recoverable pipeline
//!   errors with line context where available.

use crate::types::{AccountId, UserId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Store-level rejection of a compare-and-swap balance update
///
/// Returned by [`crate::core::AccountStore::update_balance`] when the
/// account's current balance no longer matches the expected prior balance
/// (or the account vanished). The engine reacts by re-reading and retrying;
/// retry exhaustion surfaces to callers as [`TransferError::Conflict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("stale balance for account {account}")]
pub struct StaleBalance {
    /// The account whose balance moved underneath the update
    pub account: AccountId,
}

/// Main error type for the transfer engine
///
/// Each variant includes the context needed to diagnose the failure. All
/// variants except `Conflict` and `Internal` are deterministic outcomes of
/// the request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransferError {
    /// A request field failed validation
    ///
    /// Covers missing conditionally-required fields (e.g. `upiId` for UPI
    /// transfers) as well as malformed values. No side effects occur.
    #[error("validation failed for field '{field}': {reason}")]
    Validation {
        /// The offending request field
        field: String,
        /// Why the field was rejected
        reason: String,
    },

    /// An account number did not resolve to an existing account
    #[error("account '{number}' not found")]
    AccountNotFound {
        /// The account number that failed to resolve
        number: String,
    },

    /// The source account cannot cover the requested amount
    #[error(
        "insufficient funds in account {account}: available {available}, requested {requested}"
    )]
    InsufficientFunds {
        /// Source account identity
        account: AccountId,
        /// Available balance
        available: Decimal,
        /// Requested debit amount
        requested: Decimal,
    },

    /// A self-transfer touched an account the requesting user does not own
    #[error("account {account} does not belong to user {user}")]
    OwnershipMismatch {
        /// The requesting user
        user: UserId,
        /// The account with a different owner
        account: AccountId,
    },

    /// The transfer kind is not one of the recognized kinds
    ///
    /// Raised at the parse boundary; inside the engine the kind is a closed
    /// enum and cannot be unsupported.
    #[error("unsupported transfer kind '{kind}'")]
    UnsupportedKind {
        /// The unrecognized kind string
        kind: String,
    },

    /// An idempotency key was already used by an earlier request
    #[error("duplicate request: idempotency key '{key}' already used")]
    DuplicateRequest {
        /// The repeated key
        key: String,
    },

    /// Concurrent mutation contention exhausted the commit retries
    ///
    /// Retryable: the same request may be resubmitted and will re-read fresh
    /// balances.
    #[error("transfer aborted after repeated balance conflicts on account {account}")]
    Conflict {
        /// The contended account
        account: AccountId,
    },

    /// Opaque internal failure
    #[error("internal error: {message}")]
    Internal {
        /// Generic description; storage detail must not leak here
        message: String,
    },

    /// File not found at the specified path
    ///
    /// Fatal pipeline error.
    #[error("file not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error while reading or writing files
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error
    ///
    /// Recoverable in the pipeline: the malformed record is skipped and
    /// processing continues.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Parse {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl From<std::io::Error> for TransferError {
    fn from(error: std::io::Error) -> Self {
        TransferError::Io {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for TransferError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        TransferError::Parse {
            line,
            message: error.to_string(),
        }
    }
}

// Helper constructors for the common variants

impl TransferError {
    /// Create a Validation error
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        TransferError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a Validation error for a conditionally-required field
    pub fn missing_field(field: &str, context: &str) -> Self {
        TransferError::Validation {
            field: field.to_string(),
            reason: format!("is required for {}", context),
        }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(number: &str) -> Self {
        TransferError::AccountNotFound {
            number: number.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountId, available: Decimal, requested: Decimal) -> Self {
        TransferError::InsufficientFunds {
            account,
            available,
            requested,
        }
    }

    /// Create an OwnershipMismatch error
    pub fn ownership_mismatch(user: UserId, account: AccountId) -> Self {
        TransferError::OwnershipMismatch { user, account }
    }

    /// Create an UnsupportedKind error
    pub fn unsupported_kind(kind: &str) -> Self {
        TransferError::UnsupportedKind {
            kind: kind.to_string(),
        }
    }

    /// Create a DuplicateRequest error
    pub fn duplicate_request(key: &str) -> Self {
        TransferError::DuplicateRequest {
            key: key.to_string(),
        }
    }

    /// Create a Conflict error
    pub fn conflict(account: AccountId) -> Self {
        TransferError::Conflict { account }
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        TransferError::Internal {
            message: message.into(),
        }
    }

    /// Whether the caller may retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransferError::Conflict { .. })
    }

    /// Attach a line number to a `Parse` error that lacks one
    pub fn with_line(self, line: u64) -> Self {
        match self {
            TransferError::Parse { line: None, message } => TransferError::Parse {
                line: Some(line),
                message,
            },
            other => other,
        }
    }
}
