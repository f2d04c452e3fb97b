//! Missing-field correction state machine.
//!
//! The classifier hands back records that may still carry open defects.
//! This module serializes them one at a time: `next_defect` picks the first
//! outstanding `(record, field)` pair, `apply_fix` writes one externally
//! supplied value. There is no stored cursor; the next defect is recomputed
//! from the set contents on every call, so callers never go out of sync
//! with the data.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transaction::{canonical_amount, parse_amount, Field, FieldValue, TransactionRecord};

/// One outstanding fix: which record, which field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defect {
    pub index: usize,
    pub field: Field,
}

/// Outcome of one `apply_fix` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyResult {
    /// The field now holds a concrete value; move on to the next defect.
    Resolved,
    /// The submitted value was rejected; the same defect is still open and
    /// the caller must re-prompt for it.
    StillOpen,
}

#[derive(Debug, Error)]
pub enum CorrectionError {
    #[error("transaction index {index} out of range (set has {len} records)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// First open defect under (insertion-order index, canonical field order),
/// or None when every record is complete.
///
/// Pure: never mutates the set, and two calls without an intervening fix
/// return the same answer.
pub fn next_defect(set: &[TransactionRecord]) -> Option<Defect> {
    set.iter().enumerate().find_map(|(index, rec)| {
        rec.first_defect().map(|field| Defect { index, field })
    })
}

/// Write one externally supplied value into `set[index][field]`.
///
/// Amounts are coerced: a parseable value is stored in canonical form, an
/// unparseable one marks the field `Invalid` and reports `StillOpen` so the
/// caller re-prompts for the same defect. Other fields take any non-empty
/// input verbatim; empty input leaves the defect open.
pub fn apply_fix(
    set: &mut [TransactionRecord],
    index: usize,
    field: Field,
    raw: &str,
) -> Result<ApplyResult, CorrectionError> {
    let len = set.len();
    let rec = set
        .get_mut(index)
        .ok_or(CorrectionError::IndexOutOfRange { index, len })?;

    let trimmed = raw.trim();
    let slot = rec.field_mut(field);

    if field == Field::Amount {
        return Ok(match parse_amount(trimmed) {
            Some(v) => {
                *slot = FieldValue::Resolved(canonical_amount(v));
                ApplyResult::Resolved
            }
            None => {
                *slot = if trimmed.is_empty() {
                    FieldValue::Unresolved
                } else {
                    FieldValue::Invalid(trimmed.to_string())
                };
                ApplyResult::StillOpen
            }
        });
    }

    if trimmed.is_empty() {
        return Ok(ApplyResult::StillOpen);
    }
    *slot = FieldValue::Resolved(trimmed.to_string());
    Ok(ApplyResult::Resolved)
}

/// Where a correction session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// One defect outstanding, awaiting a fix.
    Collecting(Defect),
    /// Every record is complete; the set is ready for reporting.
    Resolved,
}

/// Process state bound to one in-flight transaction set.
///
/// Owned by whatever layer drives the interaction (the CLI here); dropping
/// it discards all in-flight correction state with nothing to clean up.
#[derive(Debug, Clone)]
pub struct CorrectionSession {
    records: Vec<TransactionRecord>,
}

impl CorrectionSession {
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self { records }
    }

    pub fn state(&self) -> SessionState {
        match next_defect(&self.records) {
            Some(d) => SessionState::Collecting(d),
            None => SessionState::Resolved,
        }
    }

    pub fn next_defect(&self) -> Option<Defect> {
        next_defect(&self.records)
    }

    pub fn apply_fix(
        &mut self,
        index: usize,
        field: Field,
        raw: &str,
    ) -> Result<ApplyResult, CorrectionError> {
        apply_fix(&mut self.records, index, field, raw)
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TransactionRecord> {
        self.records
    }
}
