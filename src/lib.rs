//! # Chunkflow
//!
//! A **fault-tolerant, chunk-oriented batch loader** for Rust: read a
//! delimited flat file of fixed-schema records, validate and normalize each
//! record, and load the survivors into a pluggable batch sink in fixed-size
//! chunks, tolerating a bounded number of per-record failures without
//! aborting the whole run.
//!
//! ## Key Features
//!
//! - **Chunk-oriented execution** - records are buffered into fixed-size
//!   chunks, each committed to the sink as one atomic unit
//! - **Skip-on-error fault tolerance** - rejected records and refused chunks
//!   count against a configurable skip budget; only exhausting the budget
//!   fails the run
//! - **Pluggable edges** - [`RecordSource`] and [`Sink`] are small traits;
//!   CSV implementations ship behind the `io-csv` feature
//! - **Run reporting** - every run, completed or failed, returns a
//!   [`RunReport`] with exact counts, chunk timings and throughput
//! - **Sequential and parallel commits** - a configuration flag swaps the
//!   execution strategy without touching validation or skip accounting
//!
//! ## Quick Start
//!
//! ```
//! use chunkflow::{ChunkConfig, ChunkPipeline, MemorySink, RawRecord, RunStatus, VecSource};
//!
//! let mut source = VecSource::new(vec![
//!     RawRecord::new("1", "Ann", "Lee", "ann@x.com"),
//!     RawRecord::new("2", " Cid ", "", "cid@x.com"),
//!     RawRecord::new("0", "Bob", "Lee", "bob@x.com"), // rejected: invalid id
//! ]);
//! let sink = MemorySink::new();
//!
//! let pipeline = ChunkPipeline::new(ChunkConfig {
//!     chunk_size: 2,
//!     skip_limit: 1,
//!     ..ChunkConfig::default()
//! });
//! let report = pipeline.run(&mut source, &sink);
//!
//! assert_eq!(report.status, RunStatus::Completed);
//! assert_eq!(report.records_written, 2);
//! assert_eq!(report.records_skipped, 1);
//! assert_eq!(sink.rows()[1].first_name, "Cid");
//! ```
//!
//! ## Loading a CSV file
//!
//! With the default `io-csv` feature, [`CsvRecordSource`] reads a flat file
//! (skipping a configurable number of header lines) and [`CsvSink`] appends
//! committed chunks to an output file:
//!
//! ```ignore
//! use chunkflow::{ChunkConfig, ChunkPipeline, CsvRecordSource, CsvSink, ReadOptions};
//!
//! let mut source = CsvRecordSource::open("students.csv", ReadOptions::default())?;
//! let sink = CsvSink::create("loaded.csv")?;
//! let report = ChunkPipeline::new(ChunkConfig::default()).run(&mut source, &sink);
//! report.print();
//! report.save_to_file("report.json")?;
//! ```
//!
//! ## Fault-tolerance contract
//!
//! - A validation rejection skips one record; a sink refusal skips the whole
//!   chunk at once (all-or-nothing, never partially).
//! - A run with exactly `skip_limit` skips still completes; one more flips
//!   it to `Failed` and the pipeline stops pulling records.
//! - A source read error is fatal immediately: an errored source cannot be
//!   trusted to resume at the right position.
//! - Every fatal path still returns a well-formed [`RunReport`] with the
//!   counts accumulated up to the failure point and the terminal reason.
//!
//! ## Module Overview
//!
//! - [`record`] - raw and validated record types
//! - [`validate`] - the pure validation/normalization function
//! - [`source`] - the [`RecordSource`] trait and implementations
//! - [`sink`] - the [`Sink`] trait and implementations
//! - [`pipeline`] - the orchestrator and its execution modes
//! - [`report`] - run lifecycle reporting and the frozen report
//! - [`error`] - the rejection and failure taxonomy
//! - [`testing`] - test doubles and tempfile-backed fixtures

pub mod error;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod sink;
pub mod source;
pub mod testing;
pub mod validate;

// General re-exports
pub use error::{ReadError, RejectReason, RunError, SinkError, SkipRecord};
pub use pipeline::{ChunkConfig, ChunkPipeline, ExecMode};
pub use record::{CleanRecord, RawRecord};
pub use report::{RunReport, RunReporter, RunStatus};
pub use sink::{MemorySink, Sink};
pub use source::{RecordSource, VecSource};
pub use validate::validate;

// Gated re-exports
#[cfg(feature = "io-csv")]
pub use sink::CsvSink;

#[cfg(feature = "io-csv")]
pub use source::{CsvRecordSource, ReadOptions};
