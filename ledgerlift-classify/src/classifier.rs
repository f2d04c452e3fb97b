//! Statement classifier: prompt the oracle once, then validate and repair
//! its JSON answer into transaction records.
//!
//! Contract violations (non-JSON, wrong shape, empty answer) abort the
//! attempt. Per-field problems never do: a missing or unparseable field
//! becomes an open defect on the record and is handed to the correction
//! loop instead.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::oracle::ExtractionOracle;
use ledgerlift_core::{
    canonical_amount, parse_amount, Field, FieldValue, TransactionRecord, TransactionSet,
};

/// Sentinel the oracle uses for a field it could not determine.
const MISSING_SENTINEL: &str = "missing";

#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The oracle answered with nothing usable.
    #[error("oracle returned an empty response")]
    EmptyResponse,
    /// The oracle answer is not the agreed JSON list-of-objects shape.
    #[error("oracle response is not a JSON transaction list: {0}")]
    Format(String),
    /// The oracle call itself failed (network, auth, HTTP status).
    #[error(transparent)]
    Oracle(#[from] anyhow::Error),
}

/// Classifies raw statement text via an injected oracle.
pub struct Classifier<O: ExtractionOracle> {
    oracle: O,
}

impl<O: ExtractionOracle> Classifier<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    /// Extract transactions from `raw_text`.
    ///
    /// Returns the records in the order the oracle produced them, plus a
    /// flag that is true iff at least one record still carries a defect.
    /// Callers reject empty input before getting here.
    pub fn classify(&self, raw_text: &str) -> Result<(TransactionSet, bool), ClassifyError> {
        let prompt = build_prompt(raw_text);
        let response = self.oracle.extract(&prompt)?;
        debug!(len = response.len(), "oracle response received");

        let cleaned = strip_fences(&response);
        if cleaned.is_empty() {
            return Err(ClassifyError::EmptyResponse);
        }

        let records = parse_response(&cleaned)?;
        let any_incomplete = records.iter().any(|r| !r.is_complete());
        if any_incomplete {
            let open = records.iter().filter(|r| !r.is_complete()).count();
            warn!(open, total = records.len(), "classification left records incomplete");
        }
        Ok((records, any_incomplete))
    }
}

/// The extraction contract sent to the oracle, with the statement embedded.
pub fn build_prompt(raw_text: &str) -> String {
    format!(
        r#"You are a financial statement parser.
You must extract a clean list of transactions from the input text, returning a valid JSON list of dictionaries, where each dictionary contains:
- "date": (e.g., "12 Jul", "4 Mar") - if missing, use "Missing"
- "description": a short summary of the transaction (e.g., "Uber ride", "Electricity bill")
- "amount": only the numeric part, without the currency symbol
- "category": one of these categories:
  - "Food"
  - "Travel"
  - "Bills"
  - "Fuel"
  - "Health"
  - "Others"

Categories must be inferred based on the description:
- "Food" -> groceries, restaurants, snacks, cafes
- "Travel" -> taxis, Uber, buses, trains, flights, tolls
- "Bills" -> electricity, water, rent, phone, internet, DTH
- "Fuel" -> petrol, diesel, gasoline
- "Health" -> medicine, hospitals, tests, clinics
- "Others" -> everything else

### Your output format:
Only return a JSON list like this:
[
  {{
    "date": "12 Jul",
    "description": "Uber ride",
    "amount": "650",
    "category": "Travel"
  }},
  ...
]

### Rules:
- Use the exact field names: "date", "description", "amount", "category"
- No extra text before or after the JSON list
- Do not return Markdown formatting (no ```json blocks)
- If any field is missing, fill it with "Missing"
- Be very careful to produce valid JSON

### Input:
{raw_text}
"#
    )
}

/// Remove fenced-code decoration the oracle sometimes wraps around JSON.
fn strip_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

fn parse_response(cleaned: &str) -> Result<TransactionSet, ClassifyError> {
    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| ClassifyError::Format(e.to_string()))?;

    let items = value
        .as_array()
        .ok_or_else(|| ClassifyError::Format("response is not a JSON list".to_string()))?;

    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let obj = item.as_object().ok_or_else(|| {
            ClassifyError::Format(format!("element {i} is not an object"))
        })?;

        let mut rec = TransactionRecord {
            date: FieldValue::Unresolved,
            description: FieldValue::Unresolved,
            amount: FieldValue::Unresolved,
            category: FieldValue::Unresolved,
        };

        // Extra keys in the object are ignored; only the canonical four are read.
        for field in Field::ORDER {
            let raw = obj.get(field.name()).and_then(field_text);
            *rec.field_mut(field) = match raw {
                None => FieldValue::Unresolved,
                Some(s) if is_missing(&s) => FieldValue::Unresolved,
                Some(s) if field == Field::Amount => match parse_amount(&s) {
                    // Amount parse failures degrade to an open defect, never an error.
                    Some(v) => FieldValue::Resolved(canonical_amount(v)),
                    None => FieldValue::Invalid(s),
                },
                Some(s) => FieldValue::Resolved(s),
            };
        }
        records.push(rec);
    }
    Ok(records)
}

/// Render a JSON field as text. Strings pass through, numbers are
/// stringified (oracles emit bare numbers for amounts often enough);
/// null and structured values count as absent.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_missing(s: &str) -> bool {
    s.is_empty() || s.eq_ignore_ascii_case(MISSING_SENTINEL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    /// Oracle stub that returns a canned response.
    struct StubOracle(String);

    impl ExtractionOracle for StubOracle {
        fn extract(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    fn classify(response: &str) -> Result<(TransactionSet, bool), ClassifyError> {
        Classifier::new(StubOracle(response.to_string())).classify("1 Jan coffee 3.50")
    }

    #[test]
    fn test_complete_record() {
        let (set, incomplete) = classify(
            r#"[{"date":"12 Jul","description":"Uber ride","amount":"650","category":"Travel"}]"#,
        )
        .unwrap();
        assert!(!incomplete);
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].date, FieldValue::Resolved("12 Jul".to_string()));
        assert_eq!(set[0].amount, FieldValue::Resolved("650".to_string()));
        assert_eq!(set[0].category, FieldValue::Resolved("Travel".to_string()));
        assert!(set[0].is_complete());
    }

    #[test]
    fn test_fenced_response_is_stripped() {
        let (set, incomplete) = classify(
            "```json\n[{\"date\":\"4 Mar\",\"description\":\"Groceries\",\"amount\":\"45.2\",\"category\":\"Food\"}]\n```",
        )
        .unwrap();
        assert!(!incomplete);
        assert_eq!(set[0].description, FieldValue::Resolved("Groceries".to_string()));
    }

    #[test]
    fn test_missing_sentinel_marks_field_unresolved() {
        let (set, incomplete) = classify(
            r#"[{"date":"12 Jul","description":"Uber ride","amount":"Missing","category":"Travel"}]"#,
        )
        .unwrap();
        assert!(incomplete);
        assert_eq!(set[0].amount, FieldValue::Unresolved);
        assert_eq!(set[0].first_defect(), Some(Field::Amount));
    }

    #[test]
    fn test_sentinel_is_case_insensitive() {
        let (set, incomplete) = classify(
            r#"[{"date":"missing","description":"Uber ride","amount":"10","category":"Travel"}]"#,
        )
        .unwrap();
        assert!(incomplete);
        assert_eq!(set[0].date, FieldValue::Unresolved);
    }

    #[test]
    fn test_absent_and_empty_fields_are_unresolved() {
        let (set, incomplete) =
            classify(r#"[{"date":"12 Jul","description":"","amount":"10"}]"#).unwrap();
        assert!(incomplete);
        assert_eq!(set[0].description, FieldValue::Unresolved);
        assert_eq!(set[0].category, FieldValue::Unresolved);
        // Defect pointer lands on description first, per canonical order.
        assert_eq!(set[0].first_defect(), Some(Field::Description));
    }

    #[test]
    fn test_unparseable_amount_is_invalid_not_fatal() {
        let (set, incomplete) = classify(
            r#"[{"date":"12 Jul","description":"Uber ride","amount":"sixsofifty","category":"Travel"}]"#,
        )
        .unwrap();
        assert!(incomplete);
        assert_eq!(set[0].amount, FieldValue::Invalid("sixsofifty".to_string()));
        assert_eq!(set[0].first_defect(), Some(Field::Amount));
    }

    #[test]
    fn test_numeric_amount_value_is_accepted() {
        let (set, incomplete) = classify(
            r#"[{"date":"12 Jul","description":"Uber ride","amount":650,"category":"Travel"}]"#,
        )
        .unwrap();
        assert!(!incomplete);
        assert_eq!(set[0].amount, FieldValue::Resolved("650".to_string()));
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        let (set, incomplete) = classify(
            r#"[{"date":"12 Jul","description":"Uber ride","amount":"650","category":"Travel","currency":"INR"}]"#,
        )
        .unwrap();
        assert!(!incomplete);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_unknown_category_is_preserved() {
        let (set, incomplete) = classify(
            r#"[{"date":"12 Jul","description":"Uber ride","amount":"650","category":"Transport"}]"#,
        )
        .unwrap();
        assert!(!incomplete);
        assert_eq!(set[0].category, FieldValue::Resolved("Transport".to_string()));
    }

    #[test]
    fn test_order_is_preserved_and_flag_covers_all_records() {
        let (set, incomplete) = classify(
            r#"[
                {"date":"12 Jul","description":"Uber ride","amount":"650","category":"Travel"},
                {"date":"Missing","description":"Pharmacy","amount":"12","category":"Health"},
                {"date":"1 Aug","description":"Groceries","amount":"45","category":"Food"}
            ]"#,
        )
        .unwrap();
        assert!(incomplete);
        assert_eq!(set.len(), 3);
        assert!(set[0].is_complete());
        assert!(!set[1].is_complete());
        assert!(set[2].is_complete());
    }

    #[test]
    fn test_prose_response_is_a_format_error() {
        let err = classify("Sorry, I could not find any transactions.").unwrap_err();
        assert!(matches!(err, ClassifyError::Format(_)));
    }

    #[test]
    fn test_non_list_json_is_a_format_error() {
        let err = classify(r#"{"date":"12 Jul"}"#).unwrap_err();
        assert!(matches!(err, ClassifyError::Format(_)));
    }

    #[test]
    fn test_non_object_element_is_a_format_error() {
        let err = classify(r#"["12 Jul"]"#).unwrap_err();
        assert!(matches!(err, ClassifyError::Format(_)));
    }

    #[test]
    fn test_blank_response_is_empty_error() {
        let err = classify("``` ```").unwrap_err();
        assert!(matches!(err, ClassifyError::EmptyResponse));
    }

    #[test]
    fn test_prompt_embeds_statement_text() {
        let prompt = build_prompt("12 Jul Uber 650");
        assert!(prompt.contains("12 Jul Uber 650"));
        assert!(prompt.contains("\"category\""));
        assert!(prompt.contains("\"Fuel\""));
    }
}
