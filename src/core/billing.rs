//! Billing sub-records for bill payments
//!
//! The [`BillingRecorder`] persists one [`BillingRecord`] per BILL_PAYMENT
//! transaction, linked to the owning transaction record by identity. Records
//! are created in the same commit step as the owning transaction and never
//! mutated afterward.

use crate::types::{BillingId, BillingRecord, BillingTarget, TransactionId};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

/// Store of billing sub-records
///
/// Thread-safe; concurrent bill payments append without contention. The
/// engine is the only writer and only calls [`BillingRecorder::create`] for
/// BILL_PAYMENT transfers.
#[derive(Debug, Default)]
pub struct BillingRecorder {
    /// Billing records by identity
    records: DashMap<BillingId, BillingRecord>,

    /// Secondary index: owning transaction to billing record (1:1)
    by_transaction: DashMap<TransactionId, BillingId>,

    /// Identity source
    next_id: AtomicU64,
}

impl BillingRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            by_transaction: DashMap::new(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Persist a billing record for a committed bill-payment transaction
    pub fn create(
        &self,
        transaction_id: TransactionId,
        amount: Decimal,
        target: BillingTarget,
    ) -> BillingRecord {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;

        let record = BillingRecord {
            id,
            transaction_id,
            amount,
            target,
        };

        self.by_transaction.insert(transaction_id, id);
        self.records.insert(id, record.clone());
        record
    }

    /// The billing record linked to a transaction, if any
    pub fn find_by_transaction(&self, transaction_id: TransactionId) -> Option<BillingRecord> {
        let id = *self.by_transaction.get(&transaction_id)?;
        self.records.get(&id).map(|entry| entry.value().clone())
    }

    /// Total number of billing records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no billing records exist
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
