//! ledgerlift-core: transaction model, field/defect state, and the
//! correction state machine shared by the classifier, report, and CLI.

pub mod correction;
pub mod transaction;

pub use correction::{
    apply_fix, next_defect, ApplyResult, CorrectionError, CorrectionSession, Defect, SessionState,
};
pub use transaction::{
    canonical_amount, parse_amount, parse_statement_date, Category, Field, FieldValue,
    TransactionRecord, TransactionSet, REFERENCE_YEAR,
};
