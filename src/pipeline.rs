//! The chunk-oriented pipeline orchestrator.
//!
//! [`ChunkPipeline::run`] drives the read → validate → batch-write loop:
//! records are pulled lazily from a [`RecordSource`], classified by
//! [`validate`], buffered into fixed-size chunks and handed to a [`Sink`] as
//! atomic commits. Rejected records and refused chunks are counted against a
//! skip budget; exhausting the budget, a source read failure, or an invalid
//! configuration fails the run, and in every case the caller gets back a
//! well-formed [`RunReport`].
//!
//! Two execution strategies share the same assembly and skip-accounting
//! loop:
//! - [`ExecMode::Sequential`] — one logical worker; commit order equals read
//!   order and metrics are exact without contention.
//! - [`ExecMode::Parallel`] — chunk assembly stays on the coordinating
//!   thread (chunk boundaries are identical to sequential mode) while full
//!   chunks are committed concurrently on a worker pool. Once the skip
//!   budget is breached the coordinator stops pulling and stops submitting;
//!   in-flight commits run to completion and their outcomes are recorded for
//!   diagnostics only.

use crate::error::{RejectReason, RunError, SkipRecord};
use crate::record::CleanRecord;
use crate::report::{RunReport, RunReporter};
use crate::sink::Sink;
use crate::source::RecordSource;
use crate::validate::validate;
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, warn};

/// Execution strategy for chunk commits.
#[derive(Clone, Copy, Debug)]
pub enum ExecMode {
    /// Pull, validate and commit on one thread, in read order.
    Sequential,
    /// Commit full chunks concurrently on a dedicated worker pool.
    ///
    /// `threads: None` sizes the pool from the machine's CPU count.
    Parallel { threads: Option<usize> },
}

/// Configuration for one pipeline run.
#[derive(Clone, Copy, Debug)]
pub struct ChunkConfig {
    /// Records per chunk; the unit of atomic commit. Must be at least 1.
    pub chunk_size: usize,
    /// Maximum tolerated skips before the run is declared failed.
    ///
    /// A run with exactly `skip_limit` skips still completes; one more fails
    /// it.
    pub skip_limit: u64,
    pub mode: ExecMode,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 20,
            skip_limit: 10,
            mode: ExecMode::Sequential,
        }
    }
}

impl ChunkConfig {
    fn validate(&self) -> Result<(), RunError> {
        if self.chunk_size == 0 {
            return Err(RunError::Config("chunk_size must be at least 1".into()));
        }
        Ok(())
    }
}

/// The orchestrator composing a source, the validator and a sink.
pub struct ChunkPipeline {
    config: ChunkConfig,
}

impl ChunkPipeline {
    #[must_use]
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion and return the frozen report.
    ///
    /// Never panics and never returns early without metrics: fatal
    /// conditions (skip-limit breach, read failure, bad configuration) are
    /// reported through the `Failed` status and the counts accumulated up to
    /// that point.
    pub fn run<S, K>(&self, source: &mut S, sink: &K) -> RunReport
    where
        S: RecordSource + ?Sized,
        K: Sink + Sync + ?Sized,
    {
        let reporter = RunReporter::new();
        reporter.on_start();
        let outcome = match self.config.validate() {
            Err(e) => Err(e),
            Ok(()) => match self.config.mode {
                ExecMode::Sequential => self.exec_seq(source, sink, &reporter),
                ExecMode::Parallel { threads } => self.exec_par(source, sink, &reporter, threads),
            },
        };
        reporter.finish(outcome)
    }

    fn exec_seq<S, K>(
        &self,
        source: &mut S,
        sink: &K,
        reporter: &RunReporter,
    ) -> Result<(), RunError>
    where
        S: RecordSource + ?Sized,
        K: Sink + Sync + ?Sized,
    {
        let config = self.config;
        drive(source, config, reporter, || false, |chunk| {
            commit_chunk(sink, chunk, reporter, config.skip_limit)
        })
    }

    fn exec_par<S, K>(
        &self,
        source: &mut S,
        sink: &K,
        reporter: &RunReporter,
        threads: Option<usize>,
    ) -> Result<(), RunError>
    where
        S: RecordSource + ?Sized,
        K: Sink + Sync + ?Sized,
    {
        let threads = threads.unwrap_or_else(|| num_cpus::get().max(2));
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| RunError::Config(format!("build worker pool: {e}")))?;

        let config = self.config;
        // First fatal condition wins; later ones are diagnostics only.
        let failure: Mutex<Option<RunError>> = Mutex::new(None);

        // in_place_scope keeps chunk assembly on the calling thread; only
        // commits run on the pool.
        let coordinator = pool.in_place_scope(|scope| {
            drive(
                source,
                config,
                reporter,
                || failure.lock().unwrap().is_some(),
                |chunk| {
                    let reporter = reporter.clone();
                    let failure = &failure;
                    scope.spawn(move |_| {
                        if let Err(e) = commit_chunk(sink, chunk, &reporter, config.skip_limit) {
                            let mut slot = failure.lock().unwrap();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                        }
                    });
                    Ok(())
                },
            )
        });
        // The scope has joined every in-flight commit by now.
        let worker_failure = failure.into_inner().unwrap();
        match coordinator {
            Err(e) => Err(e),
            Ok(()) => worker_failure.map_or(Ok(()), Err),
        }
    }
}

/// The shared assembly loop: pull, validate, buffer, submit.
///
/// Both execution modes run this on the coordinating thread, so validation
/// and skip accounting exist exactly once. `submit` either commits inline
/// (sequential) or hands the chunk to a worker (parallel); `should_stop`
/// lets the parallel mode halt the loop when a worker has already failed the
/// run.
fn drive<S>(
    source: &mut S,
    config: ChunkConfig,
    reporter: &RunReporter,
    should_stop: impl Fn() -> bool,
    mut submit: impl FnMut(Vec<CleanRecord>) -> Result<(), RunError>,
) -> Result<(), RunError>
where
    S: RecordSource + ?Sized,
{
    let mut buffer = Vec::with_capacity(config.chunk_size);
    loop {
        if should_stop() {
            // The in-flight buffer is discarded: no partial commit after a
            // fatal condition.
            return Ok(());
        }
        match source.next_record() {
            Err(e) => return Err(RunError::Read(e)),
            Ok(None) => break,
            Ok(Some(raw)) => {
                reporter.record_read();
                match validate(raw) {
                    Ok(clean) => {
                        buffer.push(clean);
                        if buffer.len() == config.chunk_size {
                            let chunk = std::mem::replace(
                                &mut buffer,
                                Vec::with_capacity(config.chunk_size),
                            );
                            submit(chunk)?;
                        }
                    }
                    Err(skip) => {
                        warn!(reason = %skip.reason, id = %skip.record.id, "skipping record");
                        let skipped = reporter.record_skip(skip);
                        if skipped > config.skip_limit {
                            return Err(RunError::SkipLimitExceeded {
                                skipped,
                                limit: config.skip_limit,
                            });
                        }
                    }
                }
            }
        }
    }
    // Final partial chunk.
    if !buffer.is_empty() && !should_stop() {
        submit(buffer)?;
    }
    Ok(())
}

/// Commit one chunk, converting a refusal into a bulk skip.
///
/// The skip-limit check applies to the whole chunk at once: either every
/// record counts as written or every record counts as skipped.
fn commit_chunk<K>(
    sink: &K,
    chunk: Vec<CleanRecord>,
    reporter: &RunReporter,
    skip_limit: u64,
) -> Result<(), RunError>
where
    K: Sink + Sync + ?Sized,
{
    let size = chunk.len();
    let started = Instant::now();
    match sink.commit(&chunk) {
        Ok(()) => {
            reporter.record_chunk_committed(size, started.elapsed());
            debug!(records = size, "chunk committed");
            Ok(())
        }
        Err(err) => {
            warn!(records = size, error = %err, "chunk refused by sink, counting as skips");
            let skips: Vec<SkipRecord> = chunk
                .into_iter()
                .map(|r| SkipRecord::new(r.into_raw(), RejectReason::SinkError))
                .collect();
            let skipped = reporter.record_chunk_skipped(skips);
            if skipped > skip_limit {
                Err(RunError::SkipLimitExceeded {
                    skipped,
                    limit: skip_limit,
                })
            } else {
                Ok(())
            }
        }
    }
}
