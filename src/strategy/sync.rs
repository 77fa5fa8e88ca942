//! Synchronous processing strategy
//!
//! Single-threaded implementation of the ProcessingStrategy trait. It
//! orchestrates the pipeline by coordinating the account seed loader, the
//! streaming TransferReader, and the TransferEngine.
//!
//! # Design
//!
//! The strategy focuses on orchestration, delegating:
//! - account seeding to `io::sync_reader::load_accounts`
//! - request parsing to `TransferReader` (iterator interface)
//! - transfer semantics to `TransferEngine`
//! - output to `io::csv_format::write_accounts_csv`
//!
//! Transfer requests are applied strictly in file order, so the sequential
//! strategy doubles as the reference behavior for the concurrent one.
//!
//! # Memory Efficiency
//!
//! Requests stream one at a time; memory usage is O(accounts + history),
//! not O(all requests).

use crate::core::TransferEngine;
use crate::io::csv_format::write_accounts_csv;
use crate::io::sync_reader::{load_accounts, TransferReader};
use crate::strategy::ProcessingStrategy;
use crate::types::TransferError;
use std::io::Write;
use std::path::Path;

/// Sequential, single-threaded pipeline strategy
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Run the pipeline sequentially
    ///
    /// Fatal errors (missing files, corrupt seed rows, output failures) are
    /// returned immediately. Individual request failures are logged to
    /// stderr and processing continues.
    fn process(
        &self,
        accounts_path: &Path,
        transfers_path: &Path,
        output: &mut dyn Write,
    ) -> Result<(), TransferError> {
        let engine = TransferEngine::in_memory();

        for account in load_accounts(accounts_path)? {
            engine.accounts().insert(account);
        }

        let reader = TransferReader::new(transfers_path)?;

        for result in reader {
            match result {
                Ok(request) => {
                    if let Err(e) = engine.apply(&request) {
                        eprintln!("Transfer failed: {}", e);
                    }
                }
                Err(e) => {
                    eprintln!("CSV parsing error: {}", e);
                }
            }
        }

        let accounts = engine.accounts().accounts();
        write_accounts_csv(&accounts, output)?;

        Ok(())
    }
}
