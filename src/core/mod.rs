//! Core business logic module
//!
//! This module contains the transfer processing components:
//! - `account_store` - account lookup and CAS balance storage
//! - `validator` - per-kind request validation
//! - `engine` - transfer orchestration and the commit protocol
//! - `ledger` - append-only transaction history with idempotency keys
//! - `billing` - billing sub-records for bill payments
//! - `batch` - user-partitioned batch application

pub mod account_store;
pub mod batch;
pub mod billing;
pub mod engine;
pub mod ledger;
pub mod validator;

pub use account_store::{AccountStore, InMemoryAccountStore};
pub use batch::{BatchProcessor, ProcessingResult};
pub use billing::BillingRecorder;
pub use engine::{TransferEngine, MAX_COMMIT_ATTEMPTS};
pub use ledger::{HistoryLedger, KeyReservation, PendingRecord};
pub use validator::{TransactionValidator, TransferPlan};
