//! Append-only transaction history
//!
//! This module provides the [`HistoryLedger`], the append-only store of
//! completed transaction records. Records receive a monotonically increasing
//! identity on append and are never mutated afterward.
//!
//! The ledger also owns the idempotency-key table: a key is reserved
//! atomically before a transfer commits, bound to the record on append, and
//! released if the transfer fails before committing.
//!
//! # Thread Safety
//!
//! Records and keys live in `DashMap`s; identity assignment uses an atomic
//! counter. Appends from concurrent workers never collide, and creation
//! order is recoverable from the identity order.

use crate::types::{
    AccountId, TransactionId, TransactionRecord, TransactionStatus, TransferError, TransferKind,
    UserId,
};
use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

/// The fields of a record the engine knows before the ledger assigns
/// identity and timestamp
#[derive(Debug, Clone)]
pub struct PendingRecord {
    /// The requesting user
    pub user_id: UserId,

    /// The transfer kind
    pub kind: TransferKind,

    /// Source account identity
    pub from_account: Option<AccountId>,

    /// Destination account identity (two-sided kinds only)
    pub to_account: Option<AccountId>,

    /// Amount moved
    pub amount: Decimal,

    /// External payment identifier (UPI kind only)
    pub upi_id: Option<String>,
}

/// Reservation state of an idempotency key
///
/// The reservation token identifies which in-flight transfer holds the key,
/// so the insert-if-absent race has a well-defined single winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyState {
    /// Reserved by the in-flight transfer holding this token
    Reserved(u64),

    /// Bound to a committed record
    Committed(TransactionId),
}

/// Append-only store of completed transaction records
#[derive(Debug, Default)]
pub struct HistoryLedger {
    /// Records by identity
    records: DashMap<TransactionId, TransactionRecord>,

    /// Identity source; identities start at 1 and only grow
    next_id: AtomicU64,

    /// Idempotency keys, either reserved or bound to a record
    keys: DashMap<String, KeyState>,

    /// Reservation token source
    next_token: AtomicU64,
}

impl HistoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicU64::new(0),
            keys: DashMap::new(),
            next_token: AtomicU64::new(0),
        }
    }

    /// Append a completed record, assigning identity and timestamp
    ///
    /// If `reservation` is provided, the key is bound to the new record so
    /// the reservation survives the guard being dropped.
    pub fn append(
        &self,
        pending: PendingRecord,
        reservation: Option<KeyReservation<'_>>,
    ) -> TransactionRecord {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;

        let record = TransactionRecord {
            id,
            user_id: pending.user_id,
            kind: pending.kind,
            from_account: pending.from_account,
            to_account: pending.to_account,
            amount: pending.amount,
            upi_id: pending.upi_id,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        };

        self.records.insert(id, record.clone());

        if let Some(reservation) = reservation {
            reservation.commit(id);
        }

        record
    }

    /// Look up a record by identity
    pub fn get(&self, id: TransactionId) -> Option<TransactionRecord> {
        self.records.get(&id).map(|entry| entry.value().clone())
    }

    /// All records for a user, in creation order
    ///
    /// An empty result is a valid state, not an error; surfacing it
    /// differently is the reporting collaborator's choice.
    pub fn list_by_user(&self, user_id: UserId) -> Vec<TransactionRecord> {
        let mut records: Vec<TransactionRecord> = self
            .records
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.id);
        records
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Atomically reserve an idempotency key
    ///
    /// The returned guard releases the key on drop unless the transfer
    /// commits it via [`HistoryLedger::append`].
    ///
    /// # Errors
    ///
    /// `DuplicateRequest` if the key is already reserved or committed.
    pub fn reserve_key<'a>(&'a self, key: &str) -> Result<KeyReservation<'a>, TransferError> {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed) + 1;

        // Insert-if-absent under the entry lock; an existing state means
        // another request holds or committed the key.
        let state = self
            .keys
            .entry(key.to_string())
            .or_insert(KeyState::Reserved(token));
        let owned = matches!(*state, KeyState::Reserved(held) if held == token);
        drop(state);

        if owned {
            Ok(KeyReservation {
                ledger: self,
                key: key.to_string(),
                committed: false,
            })
        } else {
            Err(TransferError::duplicate_request(key))
        }
    }

    /// Record bound to an idempotency key, if the key committed
    pub fn find_by_key(&self, key: &str) -> Option<TransactionRecord> {
        match *self.keys.get(key)? {
            KeyState::Committed(id) => self.get(id),
            KeyState::Reserved(_) => None,
        }
    }
}

/// RAII guard for a reserved idempotency key
///
/// Dropping the guard without committing releases the key, so a failed
/// transfer does not poison its key for retries.
#[derive(Debug)]
pub struct KeyReservation<'a> {
    ledger: &'a HistoryLedger,
    key: String,
    committed: bool,
}

impl KeyReservation<'_> {
    /// Bind the key to a committed record
    fn commit(mut self, id: TransactionId) {
        self.ledger
            .keys
            .insert(self.key.clone(), KeyState::Committed(id));
        self.committed = true;
    }
}

impl Drop for KeyReservation<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.ledger.keys.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(user_id: UserId, amount: i64) -> PendingRecord {
        PendingRecord {
            user_id,
            kind: TransferKind::SelfTransfer,
            from_account: Some(1),
            to_account: Some(2),
            amount: Decimal::new(amount, 2),
            upi_id: None,
        }
    }

    #[test]
    fn test_append_assigns_monotonic_ids() {
        let ledger = HistoryLedger::new();

        let first = ledger.append(pending(1, 1000), None);
        let second = ledger.append(pending(1, 2000), None);

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.status, TransactionStatus::Completed);
    }

    #[test]
    fn test_get_returns_appended_record() {
        let ledger = HistoryLedger::new();

        let record = ledger.append(pending(1, 1000), None);
        let fetched = ledger.get(record.id).unwrap();

        assert_eq!(fetched, record);
    }

    #[test]
    fn test_list_by_user_filters_and_orders() {
        let ledger = HistoryLedger::new();

        ledger.append(pending(1, 1000), None);
        ledger.append(pending(2, 2000), None);
        ledger.append(pending(1, 3000), None);

        let records = ledger.list_by_user(1);

        assert_eq!(records.len(), 2);
        assert!(records[0].id < records[1].id);
        assert_eq!(records[0].amount, Decimal::new(1000, 2));
        assert_eq!(records[1].amount, Decimal::new(3000, 2));
    }

    #[test]
    fn test_list_by_user_empty_is_valid() {
        let ledger = HistoryLedger::new();
        assert!(ledger.list_by_user(42).is_empty());
    }

    #[test]
    fn test_reserve_key_rejects_duplicate_while_reserved() {
        let ledger = HistoryLedger::new();

        let _guard = ledger.reserve_key("req-1").unwrap();
        let result = ledger.reserve_key("req-1");

        assert!(matches!(
            result,
            Err(TransferError::DuplicateRequest { key }) if key == "req-1"
        ));
    }

    #[test]
    fn test_dropped_reservation_releases_key() {
        let ledger = HistoryLedger::new();

        {
            let _guard = ledger.reserve_key("req-1").unwrap();
        }

        // Key is free again after the failed attempt
        assert!(ledger.reserve_key("req-1").is_ok());
    }

    #[test]
    fn test_committed_key_stays_bound() {
        let ledger = HistoryLedger::new();

        let guard = ledger.reserve_key("req-1").unwrap();
        let record = ledger.append(pending(1, 1000), Some(guard));

        assert!(ledger.reserve_key("req-1").is_err());
        assert_eq!(ledger.find_by_key("req-1").unwrap().id, record.id);
    }

    #[test]
    fn test_find_by_key_none_while_reserved() {
        let ledger = HistoryLedger::new();

        let _guard = ledger.reserve_key("req-1").unwrap();

        assert!(ledger.find_by_key("req-1").is_none());
    }

    #[test]
    fn test_concurrent_appends_produce_unique_ids() {
        use std::collections::HashSet;
        use std::sync::Arc;
        use std::thread;

        let ledger = Arc::new(HistoryLedger::new());
        let mut handles = vec![];

        for user in 0..20u64 {
            let ledger = Arc::clone(&ledger);
            handles.push(thread::spawn(move || {
                ledger.append(pending(user, 1000), None).id
            }));
        }

        let ids: HashSet<TransactionId> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(ids.len(), 20);
        assert_eq!(ledger.len(), 20);
    }

    #[test]
    fn test_concurrent_key_reservation_admits_one_winner() {
        use std::sync::Arc;
        use std::thread;

        let ledger = Arc::new(HistoryLedger::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let ledger = Arc::clone(&ledger);
            handles.push(thread::spawn(move || {
                match ledger.reserve_key("req-race") {
                    Ok(guard) => {
                        ledger.append(pending(1, 1000), Some(guard));
                        true
                    }
                    Err(_) => false,
                }
            }));
        }

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(ledger.len(), 1);
    }
}
