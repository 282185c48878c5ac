//! Error taxonomy for pipeline runs.
//!
//! Rejections are values, not errors: a failed validation or a refused chunk
//! commit is absorbed and tallied by the pipeline, never thrown past it. Only
//! the fatal conditions modeled by [`RunError`] terminate a run early, and
//! even then the caller still receives a well-formed report.

use crate::record::RawRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a record was rejected and counted against the skip budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// `id` did not parse as an integer, or was not positive.
    InvalidId,
    /// `first_name` was empty after trimming.
    MissingFirstName,
    /// `email` did not contain an `@`.
    MissingEmail,
    /// The record was part of a chunk whose commit was refused by the sink.
    SinkError,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidId => "invalid id",
            Self::MissingFirstName => "missing first name",
            Self::MissingEmail => "missing email",
            Self::SinkError => "sink rejected chunk",
        };
        write!(f, "{s}")
    }
}

/// A rejected record together with the reason it was skipped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRecord {
    pub record: RawRecord,
    pub reason: RejectReason,
}

impl SkipRecord {
    pub fn new(record: RawRecord, reason: RejectReason) -> Self {
        Self { record, reason }
    }
}

impl fmt::Display for SkipRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipped record id={:?}: {}", self.record.id, self.reason)
    }
}

/// A sink refused to commit a chunk.
///
/// Recoverable per chunk: the whole chunk is converted to `SinkError` skips
/// and the run continues unless the skip budget is exhausted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkError {
    pub message: String,
}

impl SinkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sink commit failed: {}", self.message)
    }
}

impl std::error::Error for SinkError {}

/// The source failed to produce the next record.
///
/// Fatal: a source that errored cannot be trusted to resume at the right
/// position, so the run stops pulling immediately.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadError {
    pub message: String,
    /// 0-based index of the record the source was reading, when known.
    pub record: Option<u64>,
}

impl ReadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            record: None,
        }
    }

    /// Attach the record index the failure occurred at.
    #[must_use]
    pub fn at_record(mut self, record: u64) -> Self {
        self.record = Some(record);
        self
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.record {
            Some(n) => write!(f, "read failed at record #{n}: {}", self.message),
            None => write!(f, "read failed: {}", self.message),
        }
    }
}

impl std::error::Error for ReadError {}

/// Terminal reason a run ended with status `Failed`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunError {
    /// More records were skipped than the configured budget tolerates.
    SkipLimitExceeded { skipped: u64, limit: u64 },
    /// The record source failed mid-run.
    Read(ReadError),
    /// The configuration was rejected before any record was read.
    Config(String),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkipLimitExceeded { skipped, limit } => {
                write!(f, "skip limit exceeded: {skipped} skipped > limit {limit}")
            }
            Self::Read(e) => write!(f, "{e}"),
            Self::Config(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ReadError> for RunError {
    fn from(e: ReadError) -> Self {
        Self::Read(e)
    }
}
