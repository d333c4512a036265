//! Streaming recipient source reader.
//!
//! Wraps a `csv` reader: the header row is read and checked for an `email`
//! column when the reader is opened, then data rows are produced lazily, one
//! [`RecipientRecord`] per call to `next()`. Nothing is buffered beyond the
//! current row, so a run that stops early never reads the rest of the file.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};

use super::{EMAIL_COLUMN, RecipientRecord};
use crate::error::{ConfigError, Error, SourceError};

/// Lazy, forward-only sequence of recipient rows.
pub struct RecipientReader<R: Read> {
    headers: Vec<String>,
    records: StringRecordsIntoIter<R>,
    rows_read: u64,
}

impl RecipientReader<File> {
    /// Open a recipient file and validate its header.
    pub fn open(path: &Path, delimiter: u8) -> Result<Self, Error> {
        let file = File::open(path).map_err(SourceError::Io)?;
        tracing::debug!("Opened recipient source {}", path.display());
        Self::from_reader(file, delimiter)
    }
}

impl<R: Read> RecipientReader<R> {
    /// Read the header row from `reader` and validate it.
    ///
    /// Fails with [`ConfigError::MissingEmailColumn`] before any data row is
    /// read when the header lacks an `email` column.
    pub fn from_reader(reader: R, delimiter: u8) -> Result<Self, Error> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(malformed)?
            .iter()
            .map(str::to_string)
            .collect();

        if !headers.iter().any(|h| h == EMAIL_COLUMN) {
            return Err(ConfigError::MissingEmailColumn.into());
        }

        Ok(Self {
            headers,
            records: csv_reader.into_records(),
            rows_read: 0,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows produced so far.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    fn to_record(&self, row: &StringRecord) -> RecipientRecord {
        RecipientRecord::from_pairs(
            self.headers
                .iter()
                .zip(row.iter())
                .map(|(column, value)| (column.as_str(), value)),
        )
    }
}

impl<R: Read> Iterator for RecipientReader<R> {
    type Item = Result<RecipientRecord, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = match self.records.next()? {
            Ok(row) => row,
            Err(e) => return Some(Err(malformed(e))),
        };
        self.rows_read += 1;
        Some(Ok(self.to_record(&row)))
    }
}

fn malformed(e: csv::Error) -> SourceError {
    let line = e.position().map(|p| p.line()).unwrap_or(0);
    let reason = e.to_string();
    match e.into_kind() {
        csv::ErrorKind::Io(io) => SourceError::Io(io),
        _ => SourceError::Malformed { line, reason },
    }
}
