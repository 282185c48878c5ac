//! Record validation and normalization.
//!
//! [`validate`] is the single pure classification point of the pipeline: it
//! maps one [`RawRecord`] to either a normalized [`CleanRecord`] or a
//! [`SkipRecord`] carrying the first rule that failed. Rejections are
//! expected and frequent, so every outcome is a tagged result rather than a
//! panic or an opaque error.

use crate::error::{RejectReason, SkipRecord};
use crate::record::{CleanRecord, RawRecord};

/// Validate and normalize one record.
///
/// Rules are applied in order and the first failure wins:
/// 1. `id` must parse as an integer and be strictly positive
///    ([`RejectReason::InvalidId`]);
/// 2. `first_name` must be non-empty after trimming
///    ([`RejectReason::MissingFirstName`]);
/// 3. `email` must contain an `@` ([`RejectReason::MissingEmail`]).
///
/// On success the returned record has `first_name` and `last_name` trimmed of
/// surrounding whitespace; `email` is passed through unchanged. Validation is
/// idempotent: feeding a clean record's fields back in yields the same
/// record.
pub fn validate(raw: RawRecord) -> Result<CleanRecord, SkipRecord> {
    let id = match raw.id.trim().parse::<i64>() {
        Ok(id) if id > 0 => id,
        _ => return Err(SkipRecord::new(raw, RejectReason::InvalidId)),
    };

    let first_name = raw.first_name.trim();
    if first_name.is_empty() {
        return Err(SkipRecord::new(raw, RejectReason::MissingFirstName));
    }

    if !raw.email.contains('@') {
        return Err(SkipRecord::new(raw, RejectReason::MissingEmail));
    }

    Ok(CleanRecord {
        id,
        first_name: first_name.to_string(),
        last_name: raw.last_name.trim().to_string(),
        email: raw.email,
    })
}
