//! I/O module
//!
//! Handles CSV parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (row conversion, output serialization)
//! - `sync_reader` - synchronous streaming reader and account seed loader
//! - `async_reader` - asynchronous batched reader

pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::AsyncTransferReader;
pub use csv_format::{
    convert_account_row, convert_transfer_row, write_accounts_csv, AccountRow, TransferRow,
};
pub use sync_reader::{load_accounts, TransferReader};
