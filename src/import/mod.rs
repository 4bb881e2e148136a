//! Batch import of externally produced transaction rows.
//!
//! Rows arrive already extracted from whatever spreadsheet or statement the
//! operator had; this module only resolves accounts and appends postings.
//! Bad rows are counted and skipped, never fatal.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{AccountCategory, Expenditure, IncomeEntry};
use crate::ledger::Books;

/// Category that collects accounts created during imports.
pub const IMPORT_CATEGORY: &str = "Imported";

const IMPORT_DATE_FORMAT: &str = "%d/%m/%Y";

/// One imported statement row. Exactly one of `debit`/`credit` must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImportRow {
    pub account_name: String,
    /// DD/MM/YYYY.
    pub date: String,
    #[serde(default)]
    pub debit: f64,
    #[serde(default)]
    pub credit: f64,
    #[serde(default)]
    pub narration: String,
}

/// Outcome of an import batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Appends a posting per usable row, creating accounts as needed under the
/// [`IMPORT_CATEGORY`] category.
pub fn import_rows(books: &mut Books, rows: &[ImportRow]) -> ImportReport {
    let mut report = ImportReport::default();
    for row in rows {
        let Some(date) = parse_row_date(&row.date) else {
            tracing::debug!(date = %row.date, "import row skipped: bad date");
            report.skipped += 1;
            continue;
        };
        let side = match (row.debit > 0.0, row.credit > 0.0) {
            (true, false) => RowSide::Debit(row.debit),
            (false, true) => RowSide::Credit(row.credit),
            _ => {
                tracing::debug!(
                    account = %row.account_name,
                    "import row skipped: needs exactly one of debit/credit"
                );
                report.skipped += 1;
                continue;
            }
        };
        if row.account_name.trim().is_empty() {
            report.skipped += 1;
            continue;
        }
        let account_id = resolve_or_create_account(books, &row.account_name);
        let remarks = if row.narration.trim().is_empty() {
            None
        } else {
            Some(row.narration.trim().to_string())
        };
        match side {
            RowSide::Debit(amount) => {
                let mut entry = Expenditure::new(date, account_id, amount);
                entry.remarks = remarks;
                books.add_expenditure(entry);
            }
            RowSide::Credit(amount) => {
                let mut entry = IncomeEntry::new(date, account_id, amount);
                entry.remarks = remarks;
                books.add_income(entry);
            }
        }
        report.imported += 1;
    }
    tracing::info!(
        imported = report.imported,
        skipped = report.skipped,
        "import batch finished"
    );
    report
}

enum RowSide {
    Debit(f64),
    Credit(f64),
}

fn parse_row_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), IMPORT_DATE_FORMAT).ok()
}

fn resolve_or_create_account(books: &mut Books, name: &str) -> uuid::Uuid {
    if let Some(account) = books.account_by_name(name) {
        return account.id;
    }
    let category_id = match books.category_by_name(IMPORT_CATEGORY) {
        Some(category) => category.id,
        None => books.add_category(AccountCategory::new(IMPORT_CATEGORY)),
    };
    books.add_account(crate::domain::Account::new(name.trim(), category_id))
}
