//! Batch processing with user-based partitioning
//!
//! This module provides the `BatchProcessor`, which fans a batch of transfer
//! requests out across tokio tasks while keeping each user's requests in
//! submission order.
//!
//! # Design
//!
//! A batch is partitioned by requesting user. Different users' requests run
//! concurrently; a single user's requests run sequentially in their original
//! order, so a user's later transfer observes the balance effects of their
//! earlier one. The engine underneath is fully thread-safe, so partitioning
//! is purely an ordering guarantee, not a safety requirement.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::account_store::AccountStore;
use crate::core::engine::TransferEngine;
use crate::types::{TransactionRecord, TransferError, TransferRequest, UserId};

/// Result of applying a single transfer request
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The request that was applied
    pub request: TransferRequest,

    /// The outcome: the persisted record, or the typed failure
    pub result: Result<TransactionRecord, TransferError>,
}

/// Applies batches of transfer requests with per-user ordering
#[derive(Debug)]
pub struct BatchProcessor<S: AccountStore> {
    /// Shared thread-safe engine
    engine: Arc<TransferEngine<S>>,
}

impl<S: AccountStore> Clone for BatchProcessor<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<S: AccountStore + 'static> BatchProcessor<S> {
    /// Create a processor over a shared engine
    pub fn new(engine: Arc<TransferEngine<S>>) -> Self {
        Self { engine }
    }

    /// Partition a batch by requesting user, preserving per-user order
    pub fn partition_by_user(
        &self,
        batch: Vec<TransferRequest>,
    ) -> HashMap<UserId, Vec<TransferRequest>> {
        let mut user_batches: HashMap<UserId, Vec<TransferRequest>> = HashMap::new();

        for request in batch {
            user_batches
                .entry(request.user_id)
                .or_default()
                .push(request);
        }

        user_batches
    }

    /// Apply one user's requests sequentially, in order
    pub async fn process_user_requests(
        &self,
        requests: Vec<TransferRequest>,
    ) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(requests.len());

        for request in requests {
            let result = self.engine.apply(&request);
            results.push(ProcessingResult { request, result });
        }

        results
    }

    /// Apply a batch: users in parallel, each user's requests in order
    ///
    /// All requests are applied even when some fail; failures are captured
    /// in the returned results. Result order across users is unspecified.
    pub async fn process_batch(&self, batch: Vec<TransferRequest>) -> Vec<ProcessingResult> {
        let user_batches = self.partition_by_user(batch);

        let mut tasks = Vec::new();
        for (_user_id, requests) in user_batches {
            let processor = self.clone();
            tasks.push(tokio::spawn(async move {
                processor.process_user_requests(requests).await
            }));
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(user_results) => results.extend(user_results),
                Err(e) => {
                    tracing::error!("batch worker panicked: {:?}", e);
                }
            }
        }

        results
    }
}
