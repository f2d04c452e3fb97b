//! Transaction record types: the canonical in-memory representation of one
//! extracted statement transaction and its per-field validity state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Year appended to "day month" statement dates so they can be ordered.
/// Statements carry no year; this one is never displayed.
pub const REFERENCE_YEAR: i32 = 2025;

/// The four fields every transaction must resolve, in canonical order.
/// This order decides which defect gets asked about next; it has no
/// bearing on how records are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    Date,
    Description,
    Amount,
    Category,
}

impl Field {
    /// Canonical field order: date, description, amount, category.
    pub const ORDER: [Field; 4] = [
        Field::Date,
        Field::Description,
        Field::Amount,
        Field::Category,
    ];

    /// Wire/prompt name of the field (matches the oracle contract keys)
    pub fn name(&self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Description => "description",
            Field::Amount => "amount",
            Field::Category => "category",
        }
    }
}

/// State of one field on one record.
///
/// `Unresolved` and `Invalid` are both open defects; the correction loop
/// treats them identically, but `Invalid` keeps the unparseable raw text
/// around so a prompt can show it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Resolved(String),
    Unresolved,
    Invalid(String),
}

impl FieldValue {
    /// True if this field still needs external resolution
    pub fn is_defect(&self) -> bool {
        !matches!(self, FieldValue::Resolved(_))
    }

    /// The concrete value, if resolved
    pub fn as_resolved(&self) -> Option<&str> {
        match self {
            FieldValue::Resolved(s) => Some(s),
            _ => None,
        }
    }

    /// Raw text carried by the field, resolved or not (for prompts)
    pub fn raw(&self) -> Option<&str> {
        match self {
            FieldValue::Resolved(s) | FieldValue::Invalid(s) => Some(s),
            FieldValue::Unresolved => None,
        }
    }
}

/// The closed spending category set the oracle is asked to choose from.
///
/// Oracle output is not forced into this set: a record keeps whatever
/// category string came back, and the report falls back to a neutral fill
/// for names outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Food,
    Travel,
    Bills,
    Fuel,
    Health,
    Others,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Food,
        Category::Travel,
        Category::Bills,
        Category::Fuel,
        Category::Health,
        Category::Others,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Travel => "Travel",
            Category::Bills => "Bills",
            Category::Fuel => "Fuel",
            Category::Health => "Health",
            Category::Others => "Others",
        }
    }

    /// Exact-name lookup (the oracle contract uses these spellings)
    pub fn from_name(name: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.name() == name)
    }
}

/// One extracted transaction. Any field may still be an open defect;
/// a record is complete iff all four are resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: FieldValue,
    pub description: FieldValue,
    pub amount: FieldValue,
    pub category: FieldValue,
}

/// Ordered transaction list; insertion order is the order the classifier
/// returned and is what correction indices refer to.
pub type TransactionSet = Vec<TransactionRecord>;

impl TransactionRecord {
    /// A record with every field resolved (mostly for tests and fixtures)
    pub fn complete(
        date: impl Into<String>,
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            date: FieldValue::Resolved(date.into()),
            description: FieldValue::Resolved(description.into()),
            amount: FieldValue::Resolved(canonical_amount(amount)),
            category: FieldValue::Resolved(category.into()),
        }
    }

    pub fn field(&self, field: Field) -> &FieldValue {
        match field {
            Field::Date => &self.date,
            Field::Description => &self.description,
            Field::Amount => &self.amount,
            Field::Category => &self.category,
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut FieldValue {
        match field {
            Field::Date => &mut self.date,
            Field::Description => &mut self.description,
            Field::Amount => &mut self.amount,
            Field::Category => &mut self.category,
        }
    }

    /// First open defect in canonical field order, if any
    pub fn first_defect(&self) -> Option<Field> {
        Field::ORDER
            .iter()
            .copied()
            .find(|f| self.field(*f).is_defect())
    }

    pub fn is_complete(&self) -> bool {
        self.first_defect().is_none()
    }

    /// Parsed numeric amount, if the field is resolved and canonical
    pub fn amount_value(&self) -> Option<f64> {
        self.amount.as_resolved().and_then(parse_amount)
    }
}

/// Parse a raw amount string as a finite float. Accepts an optional sign
/// and surrounding whitespace; anything else is a defect, not an error.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let v: f64 = raw.trim().parse().ok()?;
    v.is_finite().then_some(v)
}

/// Canonical stored form of a parsed amount
pub fn canonical_amount(value: f64) -> String {
    format!("{value}")
}

/// Parse a statement date like "12 Jul" against the reference year.
/// Used for ordering only; returns None for anything unparseable.
pub fn parse_statement_date(raw: &str) -> Option<NaiveDate> {
    let padded = format!("{} {}", raw.trim(), REFERENCE_YEAR);
    NaiveDate::parse_from_str(&padded, "%d %b %Y").ok()
}
