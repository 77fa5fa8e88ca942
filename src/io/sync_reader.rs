//! Synchronous CSV readers
//!
//! Provides a streaming iterator over transfer request rows and a loader for
//! the account seed file. Delegates CSV format concerns to the csv_format
//! module.
//!
//! # Design
//!
//! `TransferReader` reads and converts rows one at a time without loading
//! the file into memory; each row yields `Result<TransferRequest,
//! TransferError>` with line context on errors, so the pipeline can skip
//! malformed rows and continue.
//!
//! Account seeding is different: a corrupt seed row would silently change
//! transfer semantics, so `load_accounts` fails fast on the first bad row.

use crate::io::csv_format::{convert_account_row, convert_transfer_row, AccountRow, TransferRow};
use crate::types::{Account, TransferError, TransferRequest};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Open a CSV file with the reader configuration shared by both inputs
fn open_reader(path: &Path) -> Result<csv::Reader<File>, TransferError> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TransferError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            TransferError::Io {
                message: format!("failed to open '{}': {}", path.display(), e),
            }
        }
    })?;

    Ok(ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .buffer_capacity(8 * 1024)
        .from_reader(file))
}

/// Load and convert the account seed CSV
///
/// # Errors
///
/// Fails on the first unreadable or malformed row; seed data must be intact.
pub fn load_accounts(path: &Path) -> Result<Vec<Account>, TransferError> {
    let mut reader = open_reader(path)?;
    let mut accounts = Vec::new();

    for (index, result) in reader.deserialize::<AccountRow>().enumerate() {
        // Line 1 is the header
        let line = index as u64 + 2;
        let row = result.map_err(|e| TransferError::from(e).with_line(line))?;
        let account = convert_account_row(row).map_err(|e| e.with_line(line))?;
        accounts.push(account);
    }

    Ok(accounts)
}

/// Streaming iterator over transfer request rows
///
/// Yields `Result<TransferRequest, TransferError>` per CSV row; parse and
/// conversion failures carry the offending line number.
#[derive(Debug)]
pub struct TransferReader {
    reader: csv::Reader<File>,
    line_num: u64,
}

impl TransferReader {
    /// Open the transfers CSV for streaming iteration
    ///
    /// # Errors
    ///
    /// `FileNotFound` or `Io` if the file cannot be opened.
    pub fn new(path: &Path) -> Result<Self, TransferError> {
        Ok(Self {
            reader: open_reader(path)?,
            line_num: 1,
        })
    }
}

impl Iterator for TransferReader {
    type Item = Result<TransferRequest, TransferError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<TransferRow>();

        let result = deserializer.next()?;
        self.line_num += 1;
        let line = self.line_num;

        Some(match result {
            Ok(row) => convert_transfer_row(row).map_err(|e| e.with_line(line)),
            Err(e) => Err(TransferError::from(e).with_line(line)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransferKind;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TRANSFER_HEADER: &str =
        "kind,user,from,to,amount,upi_id,billing_type,customer_id,property_name,rr_number,idempotency_key\n";

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_load_accounts() {
        let file = create_temp_csv(
            "id,number,user,balance\n1,ACC-A,1,100.00\n2,ACC-B,2,0.00\n",
        );

        let accounts = load_accounts(file.path()).unwrap();

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].number, "ACC-A");
        assert_eq!(accounts[0].balance, Decimal::new(10000, 2));
        assert_eq!(accounts[1].user, 2);
    }

    #[test]
    fn test_load_accounts_missing_file() {
        let result = load_accounts(Path::new("nonexistent.csv"));
        assert!(matches!(result, Err(TransferError::FileNotFound { .. })));
    }

    #[test]
    fn test_load_accounts_fails_fast_on_bad_row() {
        let file = create_temp_csv(
            "id,number,user,balance\n1,ACC-A,1,100.00\n2,ACC-B,2,not-money\n",
        );

        let result = load_accounts(file.path());

        assert!(matches!(
            result,
            Err(TransferError::Parse { line: Some(3), .. })
        ));
    }

    #[test]
    fn test_transfer_reader_iterates_rows() {
        let content = format!(
            "{}SELF_TRANSFER,1,ACC-A,ACC-B,50.00,,,,,,\nUPI,1,ACC-A,,10.00,alice@upi,,,,,\n",
            TRANSFER_HEADER
        );
        let file = create_temp_csv(&content);

        let reader = TransferReader::new(file.path()).unwrap();
        let requests: Vec<_> = reader.collect();

        assert_eq!(requests.len(), 2);

        let first = requests[0].as_ref().unwrap();
        assert_eq!(first.kind, TransferKind::SelfTransfer);
        assert_eq!(first.to_account.as_deref(), Some("ACC-B"));
        assert_eq!(first.amount, Decimal::new(5000, 2));

        let second = requests[1].as_ref().unwrap();
        assert_eq!(second.kind, TransferKind::Upi);
        assert_eq!(second.upi_id.as_deref(), Some("alice@upi"));
    }

    #[test]
    fn test_transfer_reader_missing_file() {
        let result = TransferReader::new(Path::new("nonexistent.csv"));
        assert!(matches!(result, Err(TransferError::FileNotFound { .. })));
    }

    #[test]
    fn test_transfer_reader_reports_line_numbers() {
        let content = format!(
            "{}UPI,1,ACC-A,,10.00,alice@upi,,,,,\nUPI,1,ACC-A,,bad,alice@upi,,,,,\nUPI,1,ACC-A,,5.00,alice@upi,,,,,\n",
            TRANSFER_HEADER
        );
        let file = create_temp_csv(&content);

        let reader = TransferReader::new(file.path()).unwrap();
        let results: Vec<_> = reader.collect();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1].as_ref().unwrap_err(),
            TransferError::Parse { line: Some(3), .. }
        ));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_transfer_reader_continues_after_unknown_kind() {
        let content = format!(
            "{}WIRE,1,ACC-A,,10.00,,,,,,\nUPI,1,ACC-A,,5.00,alice@upi,,,,,\n",
            TRANSFER_HEADER
        );
        let file = create_temp_csv(&content);

        let reader = TransferReader::new(file.path()).unwrap();
        let results: Vec<_> = reader.collect();

        assert_eq!(results.len(), 2);
        assert!(matches!(
            results[0].as_ref().unwrap_err(),
            TransferError::UnsupportedKind { .. }
        ));
        assert!(results[1].is_ok());
    }

    #[test]
    fn test_transfer_reader_empty_file_after_header() {
        let file = create_temp_csv(TRANSFER_HEADER);

        let reader = TransferReader::new(file.path()).unwrap();
        assert_eq!(reader.count(), 0);
    }

    #[test]
    fn test_transfer_reader_trims_whitespace() {
        let content = format!(
            "{}  UPI  , 1 , ACC-A ,, 10.00 , alice@upi ,,,,,\n",
            TRANSFER_HEADER
        );
        let file = create_temp_csv(&content);

        let reader = TransferReader::new(file.path()).unwrap();
        let requests: Vec<_> = reader.filter_map(Result::ok).collect();

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].from_account, "ACC-A");
        assert_eq!(requests[0].amount, Decimal::new(1000, 2));
    }
}
