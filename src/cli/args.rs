use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Apply funds transfers against a seeded account ledger
#[derive(Parser, Debug)]
#[command(name = "bank-transfer-engine")]
#[command(about = "Apply funds transfers against a seeded account ledger", long_about = None)]
pub struct CliArgs {
    /// Input CSV file containing transfer requests
    #[arg(value_name = "TRANSFERS", help = "Path to the transfer request CSV file")]
    pub transfers_file: PathBuf,

    /// Account seed CSV file
    #[arg(
        long = "accounts",
        value_name = "ACCOUNTS",
        help = "Path to the account seed CSV file"
    )]
    pub accounts_file: PathBuf,

    /// Processing strategy for applying transfers
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for sequential or 'async' for concurrent batches"
    )]
    pub strategy: StrategyType,

    /// Number of transfer requests per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of transfer requests per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of concurrent workers (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of concurrent workers (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,
}

/// Available processing strategies
#[derive(Clone, Debug, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Uses the provided values where given and falls back to defaults
    /// otherwise; zero values are rejected with a stderr warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }
}
