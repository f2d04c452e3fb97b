//! ledgerlift-report: renders a resolved transaction set as a styled xlsx
//! workbook (colored transaction rows plus a category totals summary) and
//! returns the serialized bytes. Where the artifact lands is the caller's
//! problem.

use chrono::NaiveDate;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, XlsxError};
use thiserror::Error;
use tracing::warn;

use ledgerlift_core::{parse_statement_date, TransactionRecord};

const SHEET_NAME: &str = "Categorized Transactions";
const TRANSACTION_HEADERS: [&str; 4] = ["Date", "Description", "Amount", "Category"];
const SUMMARY_HEADERS: [&str; 3] = ["Category", "Total", "Percentage (%)"];

/// Fixed category fills, one per known category.
const CATEGORY_FILLS: [(&str, u32); 6] = [
    ("Food", 0xFFEB9C),
    ("Travel", 0xC6EFCE),
    ("Bills", 0xFFCDD2),
    ("Fuel", 0xD9E1F2),
    ("Health", 0xFCE4D6),
    ("Others", 0xD9D2E9),
];
const DEFAULT_FILL: u32 = 0xFFFFFF;
const SUMMARY_HEADER_FILL: u32 = 0xE2EFDA;

/// Extra width added to every auto-sized column.
const COLUMN_PADDING: usize = 2;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize report workbook")]
    Serialize(#[from] XlsxError),
}

/// Fill color for a category cell; unknown names get the neutral default.
pub fn category_fill(category: &str) -> u32 {
    CATEGORY_FILLS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_FILL)
}

/// One laid-out transaction row. `amount` is None only when a record
/// slipped past correction with a non-numeric amount; the row still
/// renders but contributes nothing to the totals.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub date: String,
    pub description: String,
    pub amount: Option<f64>,
    pub category: String,
}

/// One summary line: category, rounded total, rounded share of grand total.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub percentage: f64,
}

/// Keep only complete records and project them into rows.
///
/// Incomplete records indicate an upstream contract violation (the caller
/// should have driven correction to resolution first); they are dropped
/// with a warning, never an error.
pub fn complete_rows(set: &[TransactionRecord]) -> Vec<ReportRow> {
    let mut rows = Vec::with_capacity(set.len());
    let mut dropped = 0usize;
    for rec in set {
        if !rec.is_complete() {
            dropped += 1;
            continue;
        }
        let amount = rec.amount_value();
        if amount.is_none() {
            warn!(
                raw = rec.amount.raw(),
                "amount not numeric at report time; row kept, excluded from totals"
            );
        }
        rows.push(ReportRow {
            date: rec.date.as_resolved().unwrap_or_default().to_string(),
            description: rec.description.as_resolved().unwrap_or_default().to_string(),
            amount,
            category: rec.category.as_resolved().unwrap_or_default().to_string(),
        });
    }
    if dropped > 0 {
        warn!(dropped, "dropped incomplete records before report layout");
    }
    rows
}

/// Sort rows by statement date ascending. All-or-nothing: if any date fails
/// to parse under the reference year, the original order is preserved.
pub fn sort_rows_by_date(rows: &mut [ReportRow]) {
    let keys: Option<Vec<NaiveDate>> = rows
        .iter()
        .map(|r| parse_statement_date(&r.date))
        .collect();
    match keys {
        Some(_) => rows.sort_by_key(|r| parse_statement_date(&r.date)),
        None => warn!("unparseable date in report rows; skipping date sort"),
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Accumulate per-category totals across the rows, sorted by category name.
/// Returns the summary lines and the grand total. Percentages are 0 when
/// the grand total is 0.
pub fn summarize(rows: &[ReportRow]) -> (Vec<CategoryTotal>, f64) {
    let mut totals: std::collections::BTreeMap<String, f64> = std::collections::BTreeMap::new();
    let mut grand_total = 0.0;
    for row in rows {
        let Some(amount) = row.amount else { continue };
        *totals.entry(row.category.clone()).or_insert(0.0) += amount;
        grand_total += amount;
    }

    let lines = totals
        .into_iter()
        .map(|(category, total)| {
            let percentage = if grand_total != 0.0 {
                100.0 * total / grand_total
            } else {
                0.0
            };
            CategoryTotal {
                category,
                total: round2(total),
                percentage: round2(percentage),
            }
        })
        .collect();
    (lines, grand_total)
}

/// Render the transaction set as xlsx bytes.
///
/// Layout: header row, one colored row per transaction (date-sorted when
/// every date parses), a blank row, a merged "Summary" title, the summary
/// header, and one row per category present. Every column is sized to its
/// longest rendered value plus padding.
pub fn generate(set: &[TransactionRecord]) -> Result<Vec<u8>, ReportError> {
    let mut rows = complete_rows(set);
    sort_rows_by_date(&mut rows);
    let (summary, _grand_total) = summarize(&rows);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet().set_name(SHEET_NAME)?;

    let header_format = Format::new().set_bold().set_align(FormatAlign::Center);
    let mut widths = [0usize; 4];

    for (col, title) in TRANSACTION_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header_format)?;
        widths[col] = widths[col].max(title.len());
    }

    let mut row_idx: u32 = 1;
    for row in &rows {
        let fill = Color::RGB(category_fill(&row.category));
        let cell_format = Format::new()
            .set_align(FormatAlign::Center)
            .set_background_color(fill);

        let amount_text = match row.amount {
            Some(v) => format!("{v}"),
            None => String::new(),
        };
        let cells = [
            row.date.as_str(),
            row.description.as_str(),
            amount_text.as_str(),
            row.category.as_str(),
        ];
        for (col, text) in cells.iter().enumerate() {
            widths[col] = widths[col].max(text.len());
        }

        worksheet.write_string_with_format(row_idx, 0, &row.date, &cell_format)?;
        worksheet.write_string_with_format(row_idx, 1, &row.description, &cell_format)?;
        match row.amount {
            Some(v) => {
                worksheet.write_number_with_format(row_idx, 2, v, &cell_format)?;
            }
            None => {
                worksheet.write_string_with_format(row_idx, 2, "", &cell_format)?;
            }
        }
        worksheet.write_string_with_format(row_idx, 3, &row.category, &cell_format)?;
        row_idx += 1;
    }

    // Blank separator row, then the summary block.
    row_idx += 1;

    let title_format = Format::new()
        .set_bold()
        .set_font_size(14.0)
        .set_align(FormatAlign::Center);
    worksheet.merge_range(row_idx, 0, row_idx, 2, "Summary", &title_format)?;
    widths[0] = widths[0].max("Summary".len());
    row_idx += 1;

    let summary_header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_background_color(Color::RGB(SUMMARY_HEADER_FILL));
    for (col, title) in SUMMARY_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(row_idx, col as u16, *title, &summary_header_format)?;
        widths[col] = widths[col].max(title.len());
    }
    row_idx += 1;

    let summary_format = Format::new().set_align(FormatAlign::Center);
    for line in &summary {
        worksheet.write_string_with_format(row_idx, 0, &line.category, &summary_format)?;
        worksheet.write_number_with_format(row_idx, 1, line.total, &summary_format)?;
        worksheet.write_number_with_format(row_idx, 2, line.percentage, &summary_format)?;

        widths[0] = widths[0].max(line.category.len());
        widths[1] = widths[1].max(format!("{}", line.total).len());
        widths[2] = widths[2].max(format!("{}", line.percentage).len());
        row_idx += 1;
    }

    for (col, width) in widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, (width + COLUMN_PADDING) as f64)?;
    }

    Ok(workbook.save_to_buffer()?)
}
