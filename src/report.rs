//! Run lifecycle reporting and metric aggregation.
//!
//! The [`RunReporter`] is a cloneable handle over a mutex-protected
//! accumulator. The pipeline notifies it of lifecycle events (run start,
//! record read, record skipped, chunk committed, run end) and it aggregates
//! counts and chunk timings; concurrent chunk-completion notifications from
//! parallel committers are safe. [`RunReporter::finish`] freezes the
//! accumulator into an immutable [`RunReport`].
//!
//! A report can be printed as a human-readable summary block or saved as
//! pretty JSON.

use crate::error::{RunError, SkipRecord};
use anyhow::Result;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Final status of a pipeline run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    Completed,
    Failed,
}

/// Frozen summary of a pipeline execution.
///
/// For a completed run, `records_read == records_written + records_skipped`.
/// A failed run carries the terminal [`RunError`] and the counts accumulated
/// up to the failure point; records that were buffered but never handed to
/// the sink appear in `records_read` only.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    /// Terminal reason, present iff `status == Failed`.
    pub failure: Option<RunError>,
    pub records_read: u64,
    pub records_written: u64,
    pub records_skipped: u64,
    pub chunks_committed: u64,
    pub total_millis: u64,
    pub average_chunk_millis: f64,
    pub max_chunk_millis: u64,
    /// `records_written * 1000 / total_millis`, or 0 for a zero-length run.
    pub throughput_per_second: u64,
    /// Duration of each committed chunk, in commit-completion order.
    pub chunk_millis: Vec<u64>,
    /// Every skipped record with its reason, in skip order.
    pub skips: Vec<SkipRecord>,
}

impl RunReport {
    /// Print a human-readable summary block to stdout.
    pub fn print(&self) {
        println!("\n========== Batch Run Report ==========");
        println!("Status: {:?}", self.status);
        if let Some(failure) = &self.failure {
            println!("Failure: {failure}");
        }
        println!("Records read: {}", self.records_read);
        println!("Records written: {}", self.records_written);
        println!("Records skipped: {}", self.records_skipped);
        println!("Chunks committed: {}", self.chunks_committed);
        println!("Total time: {} ms", self.total_millis);
        if self.status == RunStatus::Completed {
            println!("Throughput: {} records/second", self.throughput_per_second);
            println!("Average chunk time: {:.1} ms", self.average_chunk_millis);
            println!("Max chunk time: {} ms", self.max_chunk_millis);
        }
        println!("======================================\n");
    }

    /// Render the report as a JSON value.
    ///
    /// # Panics
    /// Panics if serialization fails, which cannot happen for this type.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("RunReport serializes infallibly")
    }

    /// Save the report to a file as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written to.
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let formatted = serde_json::to_string_pretty(&self.to_json())?;
        let mut file = File::create(path)?;
        file.write_all(formatted.as_bytes())?;
        Ok(())
    }
}

/// Thread-safe accumulator for one pipeline run.
///
/// Clones share the same underlying state, so a handle can be passed to
/// parallel chunk committers while the coordinator keeps its own.
#[derive(Clone, Default)]
pub struct RunReporter {
    inner: Arc<Mutex<ReporterInner>>,
}

#[derive(Default)]
struct ReporterInner {
    records_read: u64,
    records_written: u64,
    records_skipped: u64,
    chunks_committed: u64,
    chunk_durations: Vec<Duration>,
    skips: Vec<SkipRecord>,
    started_at: Option<Instant>,
}

impl RunReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of the run and begin the wall clock.
    pub fn on_start(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.started_at = Some(Instant::now());
        info!("batch run starting");
    }

    /// Count one record pulled from the source.
    pub fn record_read(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.records_read += 1;
    }

    /// Count one skipped record and return the updated skip total.
    ///
    /// The caller compares the returned total against the skip limit; doing
    /// the check on the returned value keeps it exact even when several
    /// committers report skips concurrently.
    pub fn record_skip(&self, skip: SkipRecord) -> u64 {
        let mut inner = self.inner.lock().unwrap();
        inner.records_skipped += 1;
        inner.skips.push(skip);
        inner.records_skipped
    }

    /// Count a whole chunk as skipped after a refused commit.
    ///
    /// All records are converted in one locked update, so the returned total
    /// reflects the entire chunk at once (all-or-nothing).
    pub fn record_chunk_skipped(&self, skips: Vec<SkipRecord>) -> u64 {
        let mut inner = self.inner.lock().unwrap();
        inner.records_skipped += skips.len() as u64;
        inner.skips.extend(skips);
        inner.records_skipped
    }

    /// Count one successfully committed chunk and its duration.
    pub fn record_chunk_committed(&self, written: usize, elapsed: Duration) {
        let mut inner = self.inner.lock().unwrap();
        inner.records_written += written as u64;
        inner.chunks_committed += 1;
        inner.chunk_durations.push(elapsed);
    }

    /// Current skip total.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn skip_count(&self) -> u64 {
        self.inner.lock().unwrap().records_skipped
    }

    /// Freeze the accumulated state into a [`RunReport`].
    ///
    /// `outcome` is the pipeline's terminal result: `Ok(())` completes the
    /// run, an error fails it and is surfaced in the report.
    #[must_use]
    pub fn finish(&self, outcome: Result<(), RunError>) -> RunReport {
        let inner = self.inner.lock().unwrap();
        let total_millis = inner
            .started_at
            .map_or(0, |s| s.elapsed().as_millis() as u64);
        let chunk_millis: Vec<u64> = inner
            .chunk_durations
            .iter()
            .map(|d| d.as_millis() as u64)
            .collect();

        let (status, failure) = match outcome {
            Ok(()) => (RunStatus::Completed, None),
            Err(e) => (RunStatus::Failed, Some(e)),
        };

        let report = RunReport {
            status,
            failure,
            records_read: inner.records_read,
            records_written: inner.records_written,
            records_skipped: inner.records_skipped,
            chunks_committed: inner.chunks_committed,
            total_millis,
            average_chunk_millis: average_millis(&chunk_millis),
            max_chunk_millis: chunk_millis.iter().copied().max().unwrap_or(0),
            throughput_per_second: throughput_per_second(inner.records_written, total_millis),
            chunk_millis,
            skips: inner.skips.clone(),
        };
        drop(inner);

        if let Some(failure) = &report.failure {
            error!(
                %failure,
                records_read = report.records_read,
                records_written = report.records_written,
                records_skipped = report.records_skipped,
                "batch run failed"
            );
        } else {
            info!(
                records_read = report.records_read,
                records_written = report.records_written,
                records_skipped = report.records_skipped,
                total_millis = report.total_millis,
                "batch run completed"
            );
        }
        report
    }
}

/// Records per second, defined as 0 for a zero-length run.
pub(crate) fn throughput_per_second(records_written: u64, total_millis: u64) -> u64 {
    if total_millis == 0 {
        0
    } else {
        records_written * 1000 / total_millis
    }
}

#[allow(clippy::cast_precision_loss)]
fn average_millis(chunk_millis: &[u64]) -> f64 {
    if chunk_millis.is_empty() {
        0.0
    } else {
        chunk_millis.iter().sum::<u64>() as f64 / chunk_millis.len() as f64
    }
}
