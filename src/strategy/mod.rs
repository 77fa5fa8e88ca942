//! Processing strategy module for the transfer pipeline
//!
//! This module defines the Strategy pattern for complete batch pipelines:
//! seeding accounts, applying transfer requests through the engine, and
//! writing final account states. It allows the sequential and concurrent
//! implementations to be selected at runtime.

use crate::cli::StrategyType;
use crate::types::TransferError;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy for a complete transfer pipeline run
///
/// Each strategy seeds the account store from the accounts CSV, applies
/// every transfer request from the transfers CSV through the engine, and
/// writes the final account states to the output.
pub trait ProcessingStrategy: Send + Sync {
    /// Run the pipeline
    ///
    /// # Arguments
    ///
    /// * `accounts_path` - account seed CSV
    /// * `transfers_path` - transfer request CSV
    /// * `output` - writer for the final account states
    ///
    /// # Errors
    ///
    /// Fatal errors only (missing files, corrupt seed data, I/O failures).
    /// Individual transfer failures are reported and processing continues
    /// with the next request.
    fn process(
        &self,
        accounts_path: &Path,
        transfers_path: &Path,
        output: &mut dyn Write,
    ) -> Result<(), TransferError>;
}

/// Create a processing strategy for the selected type
///
/// `config` tunes the concurrent strategy and is ignored by the sequential
/// one.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}
