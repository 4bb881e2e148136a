//! Simple-model postings: income, expenditure, fees, and opening anchors.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{
    Expenditure, FeePayment, IncomeEntry, LineDraft, OpeningBalanceOverride, Side, VoucherType,
};
use crate::errors::LedgerError;
use crate::ledger::Books;

use super::{ServiceResult, VoucherService};

pub struct EntryService;

impl EntryService {
    /// Records a dated receipt against `account_id`.
    pub fn record_income(
        books: &mut Books,
        date: NaiveDate,
        account_id: Uuid,
        amount: f64,
        remarks: Option<String>,
    ) -> ServiceResult<Uuid> {
        Self::validate_posting(books, account_id, amount)?;
        let mut entry = IncomeEntry::new(date, account_id, amount);
        entry.remarks = remarks;
        Ok(books.add_income(entry))
    }

    /// Records a dated outflow against `account_id`.
    pub fn record_expenditure(
        books: &mut Books,
        date: NaiveDate,
        account_id: Uuid,
        amount: f64,
        remarks: Option<String>,
    ) -> ServiceResult<Uuid> {
        Self::validate_posting(books, account_id, amount)?;
        let mut entry = Expenditure::new(date, account_id, amount);
        entry.remarks = remarks;
        Ok(books.add_expenditure(entry))
    }

    pub fn remove_income(books: &mut Books, id: Uuid) -> ServiceResult<IncomeEntry> {
        books
            .remove_income(id)
            .ok_or_else(|| LedgerError::Validation("Income entry not found".into()))
    }

    pub fn remove_expenditure(books: &mut Books, id: Uuid) -> ServiceResult<Expenditure> {
        books
            .remove_expenditure(id)
            .ok_or_else(|| LedgerError::Validation("Expenditure not found".into()))
    }

    /// Records a fee collected from a student account. When the books
    /// designate a cash account the matching receipt voucher is posted and
    /// linked in the same call.
    pub fn record_fee_payment(
        books: &mut Books,
        date: NaiveDate,
        account_id: Uuid,
        amount: f64,
        remarks: Option<String>,
    ) -> ServiceResult<Uuid> {
        Self::validate_posting(books, account_id, amount)?;
        let voucher_id = match books.cash_account_id {
            Some(cash) if books.account(cash).is_some() => {
                let narration = remarks.clone().unwrap_or_else(|| "Fee payment".into());
                let voucher = VoucherService::post(
                    books,
                    VoucherType::Receipt,
                    date,
                    narration,
                    &[
                        LineDraft::debit(cash, amount),
                        LineDraft::credit(account_id, amount),
                    ],
                )?;
                Some(voucher)
            }
            _ => None,
        };
        let mut payment = FeePayment::new(date, account_id, amount);
        payment.remarks = remarks;
        payment.voucher_id = voucher_id;
        Ok(books.add_fee_payment(payment))
    }

    /// Removes a fee payment and cascades to its linked voucher.
    pub fn remove_fee_payment(books: &mut Books, id: Uuid) -> ServiceResult<FeePayment> {
        let payment = books
            .remove_fee_payment(id)
            .ok_or_else(|| LedgerError::Validation("Fee payment not found".into()))?;
        if let Some(voucher_id) = payment.voucher_id {
            books.remove_voucher(voucher_id);
        }
        Ok(payment)
    }

    /// Declares the trusted opening balance for the start of `date`,
    /// replacing any previous declaration for the same date.
    pub fn set_opening_balance(
        books: &mut Books,
        date: NaiveDate,
        amount: f64,
        side: Side,
    ) -> ServiceResult<()> {
        if amount < 0.0 || !amount.is_finite() {
            return Err(LedgerError::Validation(
                "Opening balance must be zero or positive".into(),
            ));
        }
        books.set_opening_override(OpeningBalanceOverride::new(date, amount, side));
        Ok(())
    }

    pub fn clear_opening_balance(books: &mut Books, date: NaiveDate) -> ServiceResult<()> {
        if books.clear_opening_override(date) {
            Ok(())
        } else {
            Err(LedgerError::Validation(
                "No opening balance recorded for that date".into(),
            ))
        }
    }

    fn validate_posting(books: &Books, account_id: Uuid, amount: f64) -> ServiceResult<()> {
        if books.account(account_id).is_none() {
            return Err(LedgerError::UnresolvedAccount(account_id));
        }
        if amount <= 0.0 || !amount.is_finite() {
            return Err(LedgerError::Validation("Amount must be positive".into()));
        }
        Ok(())
    }
}
