//! End-to-end pipeline tests: oracle response -> classification ->
//! correction -> report bytes, with a stubbed oracle.

use anyhow::Result;
use ledgerlift_classify::{Classifier, ClassifyError, ExtractionOracle};
use ledgerlift_core::{ApplyResult, CorrectionSession, Field, FieldValue};

struct StubOracle(&'static str);

impl ExtractionOracle for StubOracle {
    fn extract(&self, _prompt: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

#[test]
fn complete_statement_goes_straight_to_report() {
    let classifier = Classifier::new(StubOracle(
        r#"[{"date":"12 Jul","description":"Uber ride","amount":"650","category":"Travel"}]"#,
    ));
    let (set, any_incomplete) = classifier.classify("12 Jul Uber 650").unwrap();
    assert!(!any_incomplete);

    // No correction session needed; the set is already resolved.
    let bytes = ledgerlift_report::generate(&set).unwrap();
    assert_eq!(&bytes[..4], b"PK\x03\x04");
}

#[test]
fn missing_amount_is_corrected_then_reported() {
    let classifier = Classifier::new(StubOracle(
        r#"[{"date":"12 Jul","description":"Uber ride","amount":"Missing","category":"Travel"}]"#,
    ));
    let (set, any_incomplete) = classifier.classify("12 Jul Uber ???").unwrap();
    assert!(any_incomplete);

    let mut session = CorrectionSession::new(set);
    let defect = session.next_defect().unwrap();
    assert_eq!(defect.index, 0);
    assert_eq!(defect.field, Field::Amount);

    // A non-numeric submission leaves the same defect open.
    let res = session.apply_fix(defect.index, defect.field, "abc").unwrap();
    assert_eq!(res, ApplyResult::StillOpen);
    assert_eq!(session.next_defect(), Some(defect));

    // A numeric retry resolves it.
    let res = session.apply_fix(defect.index, defect.field, "42.5").unwrap();
    assert_eq!(res, ApplyResult::Resolved);
    assert_eq!(session.next_defect(), None);

    let set = session.into_records();
    assert_eq!(set[0].amount, FieldValue::Resolved("42.5".to_string()));

    let bytes = ledgerlift_report::generate(&set).unwrap();
    assert!(!bytes.is_empty());
}

#[test]
fn multi_record_statement_summarizes_by_category() {
    let classifier = Classifier::new(StubOracle(
        r#"[
            {"date":"12 Jul","description":"Groceries","amount":"100","category":"Food"},
            {"date":"13 Jul","description":"Train ticket","amount":"300","category":"Travel"}
        ]"#,
    ));
    let (set, any_incomplete) = classifier.classify("two lines").unwrap();
    assert!(!any_incomplete);

    let rows = ledgerlift_report::complete_rows(&set);
    let (summary, grand_total) = ledgerlift_report::summarize(&rows);
    assert_eq!(grand_total, 400.0);
    assert_eq!(summary[0].category, "Food");
    assert_eq!(summary[0].percentage, 25.0);
    assert_eq!(summary[1].category, "Travel");
    assert_eq!(summary[1].percentage, 75.0);

    assert!(!ledgerlift_report::generate(&set).unwrap().is_empty());
}

#[test]
fn prose_oracle_answer_aborts_classification() {
    let classifier = Classifier::new(StubOracle(
        "I could not find a statement in that text, sorry.",
    ));
    let err = classifier.classify("hello").unwrap_err();
    assert!(matches!(err, ClassifyError::Format(_)));
}
