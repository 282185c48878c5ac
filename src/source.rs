//! Record sources: lazy, sequential ingestion of raw records.
//!
//! A [`RecordSource`] yields at most one record per pull and signals
//! end-of-input distinctly from a read failure. The pipeline never retries a
//! source after an error.
//!
//! Two implementations ship with the crate:
//! - [`VecSource`] — in-memory, infallible; the workhorse for tests and
//!   small programmatic runs.
//! - [`CsvRecordSource`] — flat-file ingestion via the `csv` crate, with a
//!   configurable number of header lines to skip (feature `io-csv`).

use crate::error::ReadError;
use crate::record::RawRecord;

/// Produces a finite sequence of raw records.
pub trait RecordSource {
    /// Pull the next record.
    ///
    /// Returns `Ok(None)` on end-of-input. An `Err` is fatal for the run:
    /// the source cannot be trusted to resume at the right position.
    ///
    /// # Errors
    /// Returns a [`ReadError`] if the underlying input could not be read or
    /// tokenized.
    fn next_record(&mut self) -> Result<Option<RawRecord>, ReadError>;
}

/// An in-memory source over a pre-built list of records.
pub struct VecSource {
    records: std::vec::IntoIter<RawRecord>,
}

impl VecSource {
    #[must_use]
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }
}

impl RecordSource for VecSource {
    fn next_record(&mut self) -> Result<Option<RawRecord>, ReadError> {
        Ok(self.records.next())
    }
}

#[cfg(feature = "io-csv")]
pub use self::csv_source::{CsvRecordSource, ReadOptions};

#[cfg(feature = "io-csv")]
mod csv_source {
    use super::{RawRecord, ReadError, RecordSource};
    use anyhow::{Context, Result, bail};
    use std::fs::File;
    use std::path::Path;

    /// Options for opening a CSV-backed source.
    #[derive(Clone, Copy, Debug)]
    pub struct ReadOptions {
        /// Leading lines to discard before the first data row.
        pub header_lines_to_skip: usize,
        /// Field delimiter byte.
        pub delimiter: u8,
    }

    impl Default for ReadOptions {
        fn default() -> Self {
            Self {
                header_lines_to_skip: 1,
                delimiter: b',',
            }
        }
    }

    /// A [`RecordSource`] over a delimited flat file.
    ///
    /// Rows are tokenized lazily, one per pull. Short rows pad missing
    /// trailing fields with empty strings and extra fields are ignored, so
    /// schema drift surfaces as validation rejections rather than read
    /// failures. Only genuine tokenization problems (broken quoting, invalid
    /// UTF-8, I/O errors) become [`ReadError`]s.
    pub struct CsvRecordSource {
        rows: csv::StringRecordsIntoIter<File>,
        /// Data rows yielded so far, for error context.
        cursor: u64,
    }

    impl CsvRecordSource {
        /// Open a CSV file and position the cursor past the header lines.
        ///
        /// # Errors
        /// Returns an error if the file cannot be opened or a header line
        /// cannot be tokenized.
        pub fn open(path: impl AsRef<Path>, options: ReadOptions) -> Result<Self> {
            let path = path.as_ref();
            let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let rdr = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .delimiter(options.delimiter)
                .from_reader(f);
            let mut rows = rdr.into_records();
            for i in 0..options.header_lines_to_skip {
                match rows.next() {
                    Some(Ok(_)) | None => {}
                    Some(Err(e)) => bail!("skip header line #{}: {e}", i + 1),
                }
            }
            Ok(Self { rows, cursor: 0 })
        }

        /// Open with [`ReadOptions::default`] (one header line, comma).
        ///
        /// # Errors
        /// See [`CsvRecordSource::open`].
        pub fn open_default(path: impl AsRef<Path>) -> Result<Self> {
            Self::open(path, ReadOptions::default())
        }
    }

    impl RecordSource for CsvRecordSource {
        fn next_record(&mut self) -> Result<Option<RawRecord>, ReadError> {
            match self.rows.next() {
                None => Ok(None),
                Some(Err(e)) => {
                    Err(ReadError::new(format!("tokenize CSV row: {e}")).at_record(self.cursor))
                }
                Some(Ok(row)) => {
                    self.cursor += 1;
                    let field = |i: usize| row.get(i).unwrap_or("").to_string();
                    Ok(Some(RawRecord {
                        id: field(0),
                        first_name: field(1),
                        last_name: field(2),
                        email: field(3),
                    }))
                }
            }
        }
    }
}
