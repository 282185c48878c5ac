//! Sinks: durable, atomic persistence of record chunks.
//!
//! A [`Sink`] accepts one ordered chunk per call and either persists all of
//! it or refuses all of it. Implementations take `&self` and use interior
//! mutability so a single sink can be shared by parallel committers.
//!
//! Provided implementations:
//! - [`MemorySink`] — appends into an in-process table; used by tests and
//!   small demos.
//! - [`CsvSink`] — appends chunks to a flat file (feature `io-csv`), with a
//!   whole-chunk buffered write so a serialization failure never leaves a
//!   partial chunk behind.

use crate::error::SinkError;
use crate::record::CleanRecord;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Commits chunks of validated records as atomic units.
pub trait Sink {
    /// Persist the whole chunk or refuse the whole chunk.
    ///
    /// The chunk's internal order must be preserved; no ordering is assumed
    /// between separate commit calls.
    ///
    /// # Errors
    /// Returns a [`SinkError`] if the chunk could not be committed. The
    /// pipeline converts the refusal into per-record `SinkError` skips.
    fn commit(&self, chunk: &[CleanRecord]) -> Result<(), SinkError>;
}

/// An in-memory sink backed by a mutex-protected table.
#[derive(Default)]
pub struct MemorySink {
    rows: Mutex<Vec<CleanRecord>>,
    commits: AtomicUsize,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all committed rows, in commit order.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn rows(&self) -> Vec<CleanRecord> {
        self.rows.lock().unwrap().clone()
    }

    /// Number of successful commit calls so far.
    #[must_use]
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

impl Sink for MemorySink {
    fn commit(&self, chunk: &[CleanRecord]) -> Result<(), SinkError> {
        let mut rows = self.rows.lock().unwrap();
        rows.extend_from_slice(chunk);
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(feature = "io-csv")]
pub use self::csv_sink::CsvSink;

#[cfg(feature = "io-csv")]
mod csv_sink {
    use super::{CleanRecord, Sink, SinkError};
    use crate::record::FIELD_NAMES;
    use anyhow::{Context, Result};
    use std::fs::File;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// A [`Sink`] that appends chunks to a CSV file.
    ///
    /// Each commit serializes the whole chunk into an in-memory buffer first
    /// and then appends it with a single `write_all`, so a row that fails to
    /// serialize refuses the chunk before any byte reaches the file.
    pub struct CsvSink {
        path: PathBuf,
        file: Mutex<File>,
    }

    impl CsvSink {
        /// Create (or truncate) the output file and write the header row.
        ///
        /// # Errors
        /// Returns an error if the file cannot be created or the header
        /// cannot be written.
        pub fn create(path: impl AsRef<Path>) -> Result<Self> {
            let path = path.as_ref().to_path_buf();
            let mut file =
                File::create(&path).with_context(|| format!("create {}", path.display()))?;
            let mut header = Vec::new();
            {
                let mut wtr = csv::WriterBuilder::new()
                    .has_headers(false)
                    .from_writer(&mut header);
                wtr.write_record(FIELD_NAMES)
                    .context("serialize header row")?;
                wtr.flush()?;
            }
            file.write_all(&header)
                .with_context(|| format!("write header to {}", path.display()))?;
            Ok(Self {
                path,
                file: Mutex::new(file),
            })
        }

        /// Path of the output file.
        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Sink for CsvSink {
        fn commit(&self, chunk: &[CleanRecord]) -> Result<(), SinkError> {
            let mut buf = Vec::with_capacity(chunk.len().saturating_mul(48));
            {
                let mut wtr = csv::WriterBuilder::new()
                    .has_headers(false)
                    .from_writer(&mut buf);
                for row in chunk {
                    wtr.serialize(row)
                        .map_err(|e| SinkError::new(format!("serialize row: {e}")))?;
                }
                wtr.flush()
                    .map_err(|e| SinkError::new(format!("flush chunk buffer: {e}")))?;
            }
            let mut file = self.file.lock().unwrap();
            file.write_all(&buf)
                .and_then(|()| file.flush())
                .map_err(|e| SinkError::new(format!("append to {}: {e}", self.path.display())))
        }
    }
}
