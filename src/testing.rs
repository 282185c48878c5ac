//! Testing utilities for batch pipelines.
//!
//! Test doubles and fixtures for exercising the pipeline without a real
//! database or input file:
//!
//! - [`raw`] / [`clean`] — terse record builders
//! - [`FailingSource`] — injects a read failure after N records
//! - [`FlakySink`] — refuses selected commits, delegates the rest to a
//!   [`MemorySink`]
//! - [`TempCsv`] / [`mock_csv_file`] — tempfile-backed CSV fixtures built
//!   from raw lines, so malformed input is as easy to produce as valid input
//!
//! # Example
//!
//! ```
//! use chunkflow::testing::*;
//! use chunkflow::{ChunkConfig, ChunkPipeline, MemorySink, VecSource};
//!
//! let mut source = VecSource::new(vec![
//!     raw("1", "Ann", "Lee", "ann@x.com"),
//!     raw("0", "Bob", "Lee", "bob@x.com"),
//! ]);
//! let sink = MemorySink::new();
//! let report = ChunkPipeline::new(ChunkConfig::default()).run(&mut source, &sink);
//! assert_eq!(report.records_written, 1);
//! assert_eq!(report.records_skipped, 1);
//! ```

use crate::error::{ReadError, SinkError};
use crate::record::{CleanRecord, RawRecord};
use crate::sink::{MemorySink, Sink};
use crate::source::RecordSource;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Build a [`RawRecord`] from its four positional fields.
#[must_use]
pub fn raw(id: &str, first_name: &str, last_name: &str, email: &str) -> RawRecord {
    RawRecord::new(id, first_name, last_name, email)
}

/// Build a [`CleanRecord`] directly, bypassing validation.
#[must_use]
pub fn clean(id: i64, first_name: &str, last_name: &str, email: &str) -> CleanRecord {
    CleanRecord {
        id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
    }
}

/// A source that yields its records, then fails with a [`ReadError`].
pub struct FailingSource {
    records: std::vec::IntoIter<RawRecord>,
}

impl FailingSource {
    /// Yield `records` in order, then error on the next pull.
    #[must_use]
    pub fn after(records: Vec<RawRecord>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }
}

impl RecordSource for FailingSource {
    fn next_record(&mut self) -> Result<Option<RawRecord>, ReadError> {
        match self.records.next() {
            Some(r) => Ok(Some(r)),
            None => Err(ReadError::new("injected read failure")),
        }
    }
}

/// A sink that refuses selected commits and delegates the rest.
///
/// Commit calls are numbered from 0; calls whose index appears in the fail
/// list return a [`SinkError`], everything else lands in the inner
/// [`MemorySink`].
pub struct FlakySink {
    delegate: MemorySink,
    fail_on: Vec<usize>,
    calls: AtomicUsize,
}

impl FlakySink {
    /// Fail the commits with the given 0-based call indices.
    #[must_use]
    pub fn failing_on(fail_on: Vec<usize>) -> Self {
        Self {
            delegate: MemorySink::new(),
            fail_on,
            calls: AtomicUsize::new(0),
        }
    }

    /// Total commit calls observed, refused ones included.
    #[must_use]
    pub fn commit_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Rows that actually landed, in commit order.
    #[must_use]
    pub fn rows(&self) -> Vec<CleanRecord> {
        self.delegate.rows()
    }
}

impl Sink for FlakySink {
    fn commit(&self, chunk: &[CleanRecord]) -> Result<(), SinkError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.contains(&call) {
            return Err(SinkError::new(format!("injected failure on commit #{call}")));
        }
        self.delegate.commit(chunk)
    }
}

pub use self::fixtures::{TempCsv, mock_csv_file};

mod fixtures {
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tempfile::NamedTempFile;

    /// A temporary CSV file deleted when dropped.
    pub struct TempCsv {
        #[allow(dead_code)]
        temp_file: NamedTempFile,
        path: PathBuf,
    }

    impl TempCsv {
        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    /// Write the given lines verbatim to a fresh temporary `.csv` file.
    ///
    /// Lines include the header, if the scenario wants one; nothing is
    /// quoted or escaped on the way in.
    ///
    /// # Errors
    /// Returns an error if the temporary file cannot be created or written.
    pub fn mock_csv_file(lines: &[&str]) -> std::io::Result<TempCsv> {
        let mut temp_file = tempfile::Builder::new().suffix(".csv").tempfile()?;
        for line in lines {
            writeln!(temp_file, "{line}")?;
        }
        temp_file.flush()?;
        let path = temp_file.path().to_path_buf();
        Ok(TempCsv { temp_file, path })
    }
}
