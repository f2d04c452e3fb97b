//! Interactive correction loop: walks the session's defects one at a time
//! on stdin until every record is complete.

use anyhow::Result;
use std::io::{self, Write};

use ledgerlift_core::{
    ApplyResult, Category, CorrectionSession, Defect, Field, FieldValue, TransactionSet,
};

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

/// What we show the user for the field's current content.
fn current_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Resolved(s) => s.clone(),
        FieldValue::Unresolved => "missing".to_string(),
        FieldValue::Invalid(raw) => format!("invalid: {raw}"),
    }
}

fn describe_defect(session: &CorrectionSession, defect: Defect) -> String {
    let rec = &session.records()[defect.index];
    let context = rec
        .description
        .as_resolved()
        .unwrap_or("N/A");
    format!(
        "Transaction {} ({}) - {} [{}]",
        defect.index + 1,
        context,
        defect.field.name(),
        current_value(rec.field(defect.field))
    )
}

/// Drive the correction session to resolution, prompting for one defect at
/// a time. Rejected amounts loop back to the same prompt.
pub fn resolve_interactively(set: TransactionSet) -> Result<TransactionSet> {
    let mut session = CorrectionSession::new(set);

    while let Some(defect) = session.next_defect() {
        println!("\n{}", describe_defect(&session, defect));
        if defect.field == Field::Category {
            let names: Vec<&str> = Category::ALL.iter().map(|c| c.name()).collect();
            println!("Categories: {}", names.join(", "));
        }

        let value = prompt(&format!("Enter a value for '{}'", defect.field.name()))?;
        match session.apply_fix(defect.index, defect.field, &value)? {
            ApplyResult::Resolved => {}
            ApplyResult::StillOpen => {
                if defect.field == Field::Amount {
                    println!("That is not a number; please enter a numeric amount.");
                } else {
                    println!("A value is required.");
                }
            }
        }
    }

    println!("\nAll transactions resolved.");
    Ok(session.into_records())
}
