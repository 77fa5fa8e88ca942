//! Bank Transfer Engine CLI
//!
//! Command-line interface for applying funds transfers from CSV files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --accounts accounts.csv transfers.csv > accounts_out.csv
//! cargo run -- --accounts accounts.csv --strategy sync transfers.csv > accounts_out.csv
//! cargo run -- --accounts accounts.csv --strategy async --batch-size 2000 --max-concurrent 8 transfers.csv
//! ```
//!
//! The program seeds the account store from the accounts CSV, applies every
//! transfer request from the transfers CSV through the engine, and writes
//! the final account states to stdout. Diagnostics go to stderr; set
//! `RUST_LOG` to control log verbosity.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Fatal error (missing files, corrupt seed data, I/O failure)

use bank_transfer_engine::cli;
use bank_transfer_engine::strategy;
use std::env;
use std::process;

fn main() {
    // Log to stderr so stdout stays reserved for the CSV output
    let filter = env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.accounts_file, &args.transfers_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
