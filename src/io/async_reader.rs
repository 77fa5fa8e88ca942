//! Asynchronous CSV reader with batch interface
//!
//! Provides a streaming interface over transfer request rows for the
//! concurrent pipeline. Supports batch reading so the strategy can process
//! one bounded batch at a time.
//!
//! # Design
//!
//! The AsyncTransferReader uses:
//! - csv-async for streaming CSV parsing
//! - the shared csv_format conversion layer
//! - batch reading for bounded memory usage

use crate::io::csv_format::{convert_transfer_row, TransferRow};
use crate::types::TransferRequest;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;

/// Asynchronous transfer request reader
///
/// Reads rows in batches, converting each through the csv_format module.
/// Invalid rows are logged and skipped so a malformed record never stalls
/// the pipeline.
pub struct AsyncTransferReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncTransferReader<R> {
    /// Create a reader over an async byte source
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read up to `batch_size` transfer requests
    ///
    /// Returns an empty vector at end of input. Rows that fail to parse or
    /// convert are reported to stderr and skipped.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<TransferRequest> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut rows = self.csv_reader.deserialize::<TransferRow>();

        while batch.len() < batch_size {
            match rows.next().await {
                Some(Ok(row)) => match convert_transfer_row(row) {
                    Ok(request) => batch.push(request),
                    Err(e) => eprintln!("Record conversion error: {}", e),
                },
                Some(Err(e)) => eprintln!("CSV parse error: {}", e),
                None => break,
            }
        }

        batch
    }
}
