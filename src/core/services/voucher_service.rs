//! Double-entry vouchers: validation, posting, and guarded removal.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{JournalEntry, LineDraft, Side, VoucherLine, VoucherType, AMOUNT_EPSILON};
use crate::errors::LedgerError;
use crate::ledger::Books;

use super::ServiceResult;

pub struct VoucherService;

impl VoucherService {
    /// Turns raw draft rows into validated voucher lines.
    ///
    /// Rows with no resolvable account or with both/neither side set are
    /// dropped before totals are taken. The survivors must number at least
    /// two and their debit and credit totals must agree within
    /// [`AMOUNT_EPSILON`], with a strictly positive total.
    pub fn resolve_lines(books: &Books, drafts: &[LineDraft]) -> ServiceResult<Vec<VoucherLine>> {
        let mut lines = Vec::new();
        for draft in drafts {
            let Some((account_id, side, amount)) = draft.resolve() else {
                continue;
            };
            if books.account(account_id).is_none() {
                continue;
            }
            lines.push(VoucherLine {
                account_id,
                side,
                amount,
            });
        }
        if lines.len() < 2 {
            return Err(LedgerError::TooFewLines);
        }
        let debit: f64 = lines
            .iter()
            .filter(|line| line.side == Side::Debit)
            .map(|line| line.amount)
            .sum();
        let credit: f64 = lines
            .iter()
            .filter(|line| line.side == Side::Credit)
            .map(|line| line.amount)
            .sum();
        if (debit - credit).abs() > AMOUNT_EPSILON || debit <= 0.0 {
            return Err(LedgerError::Unbalanced { debit, credit });
        }
        Ok(lines)
    }

    /// Validates, numbers, and appends a voucher. Nothing is stored when
    /// validation fails.
    pub fn post(
        books: &mut Books,
        voucher_type: VoucherType,
        date: NaiveDate,
        narration: impl Into<String>,
        drafts: &[LineDraft],
    ) -> ServiceResult<Uuid> {
        let lines = Self::resolve_lines(books, drafts)?;
        let number = books.next_voucher_number();
        let voucher = JournalEntry::new(date, voucher_type, number, narration, lines);
        Ok(books.add_voucher(voucher))
    }

    /// Removes a voucher unless a fee payment still depends on it; removal
    /// is an escape hatch the caller gates behind an explicit confirmation.
    pub fn remove(books: &mut Books, id: Uuid) -> ServiceResult<JournalEntry> {
        let voucher = books
            .voucher(id)
            .ok_or_else(|| LedgerError::Validation("Voucher not found".into()))?;
        if books
            .fee_payments
            .iter()
            .any(|payment| payment.voucher_id == Some(id))
        {
            return Err(LedgerError::VoucherLinked(voucher.voucher_number));
        }
        books
            .remove_voucher(id)
            .ok_or_else(|| LedgerError::Validation("Voucher not found".into()))
    }

    pub fn list(books: &Books) -> Vec<&JournalEntry> {
        books.vouchers.iter().collect()
    }
}
