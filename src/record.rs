//! Record types flowing through the pipeline.
//!
//! A [`RawRecord`] is a positionally mapped row straight off the input file:
//! four owned string fields with no validity guarantees. A [`CleanRecord`] is
//! the post-validation form with a typed, positive `id` and trimmed names.
//! Both are Serde-backed so they can move through typed I/O and reports.

use serde::{Deserialize, Serialize};

/// Column names of the fixed input schema, in positional order.
pub const FIELD_NAMES: [&str; 4] = ["id", "first_name", "last_name", "email"];

/// An unvalidated input row.
///
/// Fields are kept as raw strings exactly as tokenized from the source;
/// rows shorter than the schema pad the missing trailing fields with empty
/// strings so validation can reject them with a precise reason.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl RawRecord {
    /// Build a raw record from its four positional fields.
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }
}

/// A validated, normalized record.
///
/// Guarantees: `id > 0`, `first_name` is non-empty and trimmed, `last_name`
/// is trimmed (possibly empty), `email` contains an `@`. Instances are only
/// constructed by [`validate`](crate::validate::validate) and never mutated
/// afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl CleanRecord {
    /// Downgrade back to the raw representation.
    ///
    /// Used when a sink rejects a whole chunk and its records have to be
    /// re-counted as skips, which carry the raw form.
    #[must_use]
    pub fn into_raw(self) -> RawRecord {
        RawRecord {
            id: self.id.to_string(),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
        }
    }
}
