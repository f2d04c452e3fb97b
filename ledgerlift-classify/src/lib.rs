//! ledgerlift-classify: turns raw statement text into transaction records
//! by prompting an external extraction oracle and validating its answer.

pub mod classifier;
pub mod oracle;

pub use classifier::{Classifier, ClassifyError};
pub use oracle::{ExtractionOracle, GeminiOracle, OracleConfig};
