//! Asynchronous batch processing strategy
//!
//! Multi-threaded implementation of the ProcessingStrategy trait. Transfer
//! requests are read in batches and processed with user-based partitioning.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncTransferReader (batched CSV reading)
//!     ├── BatchProcessor (user partitioning + task fan-out)
//!     └── TransferEngine (thread-safe commit pipeline)
//! ```
//!
//! # Ordering
//!
//! Batches run sequentially so a user's requests never reorder across batch
//! boundaries; within a batch, different users run in parallel while each
//! user's requests stay sequential. The engine itself tolerates arbitrary
//! interleavings; partitioning only pins down per-user ordering.

use crate::core::{BatchProcessor, TransferEngine};
use crate::io::async_reader::AsyncTransferReader;
use crate::io::csv_format::write_accounts_csv;
use crate::io::sync_reader::load_accounts;
use crate::strategy::ProcessingStrategy;
use crate::types::TransferError;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Configuration for batch processing
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of transfer requests per batch
    pub batch_size: usize,
    /// Worker threads for the tokio runtime
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a config, falling back to defaults for zero values
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            eprintln!(
                "Warning: Invalid batch_size ({}), using default ({})",
                batch_size, default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            eprintln!(
                "Warning: Invalid max_concurrent_batches ({}), using default ({})",
                max_concurrent_batches, default.max_concurrent_batches
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Concurrent batch pipeline strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    /// Create a strategy with the given batch configuration
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Run the pipeline with batched, user-partitioned concurrency
    ///
    /// Fatal errors (missing files, corrupt seed rows, runtime construction
    /// failures) are returned immediately. Individual request failures are
    /// reported and processing continues.
    fn process(
        &self,
        accounts_path: &Path,
        transfers_path: &Path,
        output: &mut dyn Write,
    ) -> Result<(), TransferError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| TransferError::internal(format!("failed to create tokio runtime: {}", e)))?;

        runtime.block_on(async {
            let engine = Arc::new(TransferEngine::in_memory());

            for account in load_accounts(accounts_path)? {
                engine.accounts().insert(account);
            }

            let processor = BatchProcessor::new(Arc::clone(&engine));

            let file = tokio::fs::File::open(transfers_path).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TransferError::FileNotFound {
                        path: transfers_path.display().to_string(),
                    }
                } else {
                    TransferError::Io {
                        message: format!("failed to open '{}': {}", transfers_path.display(), e),
                    }
                }
            })?;

            // Wrap the tokio file for csv-async's futures-io interface
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncTransferReader::new(compat_file);

            // Batches run sequentially so per-user ordering holds across the
            // whole file; users inside a batch run in parallel.
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                let results = processor.process_batch(batch).await;
                for processed in results {
                    if let Err(e) = processed.result {
                        eprintln!("Transfer failed: {}", e);
                    }
                }
            }

            let accounts = engine.accounts().accounts();
            write_accounts_csv(&accounts, output)?;

            Ok(())
        })
    }
}
