//! Batch import pipeline: delimited text in, incomes applied.
//!
//! File-level problems (missing/misnamed file, empty stream, I/O faults) fail
//! the whole run with `InvalidFileFormat`. Row-level problems never do: the row
//! (including one that is not valid UTF-8) is skipped, logged, and reported in
//! [`BatchReport::rejected`].
//!
//! The whole run shares one transaction, so duplicate keys collapse into one
//! record and a read fault part-way through rolls back the rows already applied.

use std::collections::HashMap;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info, instrument, warn};

use sockstock_core::{StockError, StockResult};
use sockstock_inventory::{RowError, StockKey, StockRecord, has_expected_extension, parse_row};

use crate::ledger::{StockLedger, receive_in};
use crate::store::StockStore;

/// A data line that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    /// 1-based line number (the header is line 1).
    pub line: usize,
    pub reason: RowError,
}

/// Outcome of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// One entry per distinct key that received an accepted row, in first-seen
    /// order, holding the record's state at the end of the run.
    pub records: Vec<StockRecord>,
    pub rejected: Vec<RejectedRow>,
    positions: HashMap<StockKey, usize>,
}

impl BatchReport {
    fn touch(&mut self, key: StockKey, record: StockRecord) {
        match self.positions.get(&key) {
            Some(&idx) => self.records[idx] = record,
            None => {
                self.positions.insert(key, self.records.len());
                self.records.push(record);
            }
        }
    }

    fn reject(&mut self, line: usize, reason: RowError) {
        self.rejected.push(RejectedRow { line, reason });
    }
}

impl<S> StockLedger<S>
where
    S: StockStore,
{
    /// Apply every valid row of a delimited upload as an income.
    ///
    /// The run's transaction is open while `reader` is consumed. On the
    /// in-memory store that holds the table lock, so other ledger calls wait
    /// for the whole stream; callers with a slow source should buffer it first.
    #[instrument(skip(self, reader), err)]
    pub async fn batch_income<R>(&self, filename: Option<&str>, mut reader: R) -> StockResult<BatchReport>
    where
        R: AsyncBufRead + Unpin + Send,
    {
        let filename = match filename {
            Some(name) if has_expected_extension(name) => name,
            Some(name) => {
                warn!(filename = name, "rejected batch upload with unexpected extension");
                return Err(StockError::invalid_file("file must be a .csv file"));
            }
            None => return Err(StockError::invalid_file("file name is missing")),
        };

        let empty = reader
            .fill_buf()
            .await
            .map_err(|e| read_fault(filename, e))?
            .is_empty();
        if empty {
            return Err(StockError::invalid_file("file is empty"));
        }

        let mut buf = Vec::new();
        // The header is read and discarded unchecked.
        next_raw_line(&mut reader, &mut buf)
            .await
            .map_err(|e| read_fault(filename, e))?;

        let mut tx = self.store().begin().await?;
        let mut report = BatchReport::default();
        let mut line = 1;

        while next_raw_line(&mut reader, &mut buf)
            .await
            .map_err(|e| read_fault(filename, e))?
        {
            line += 1;

            let row = match std::str::from_utf8(&buf)
                .map_err(|_| RowError::InvalidEncoding)
                .and_then(|raw| parse_row(line, raw))
            {
                Ok(row) => row,
                Err(reason) => {
                    warn!(filename, line, %reason, "skipping invalid batch row");
                    report.reject(line, reason);
                    continue;
                }
            };

            match receive_in(tx.as_mut(), &row.key, row.quantity).await {
                Ok(record) => report.touch(row.key, record),
                Err(StockError::InvalidQuantity(msg)) => {
                    warn!(filename, line, %msg, "skipping batch row that would overflow stock");
                    report.reject(line, RowError::QuantityOverflow);
                }
                Err(e) => return Err(e),
            }
        }

        tx.commit().await?;

        info!(
            filename,
            records = report.records.len(),
            rejected = report.rejected.len(),
            "batch import finished"
        );
        Ok(report)
    }
}

/// Read one line into `buf` without its `\n` / `\r\n` terminator.
///
/// Returns `false` at end of stream. Bytes are not decoded here, so a badly
/// encoded line stays a row-level problem.
async fn next_raw_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(false);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(true)
}

fn read_fault(filename: &str, err: std::io::Error) -> StockError {
    error!(filename, error = %err, "failed to read batch upload");
    StockError::invalid_file(format!("failed to read file: {err}"))
}
