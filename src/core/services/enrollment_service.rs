//! Class and student lifecycle side effects on the chart of accounts.
//!
//! Classes own a system category; students own one account in their class
//! category. Both are created, renamed, and removed here in lockstep with
//! the roster, never directly by the operator.

use uuid::Uuid;

use crate::domain::{Account, AccountCategory};
use crate::errors::LedgerError;
use crate::ledger::Books;

use super::ServiceResult;

pub struct EnrollmentService;

impl EnrollmentService {
    /// Ensures the system category for a class exists and returns its id.
    pub fn register_class(books: &mut Books, name: impl Into<String>) -> ServiceResult<Uuid> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LedgerError::Validation("Class name is empty".into()));
        }
        if let Some(existing) = books.category_by_name(&name) {
            return Ok(existing.id);
        }
        Ok(books.add_category(AccountCategory::system(name)))
    }

    /// Renames a class; its system category follows.
    pub fn rename_class(books: &mut Books, old_name: &str, new_name: &str) -> ServiceResult<()> {
        if new_name.trim().is_empty() {
            return Err(LedgerError::Validation("Class name is empty".into()));
        }
        let id = books
            .category_by_name(old_name)
            .filter(|category| category.is_system)
            .map(|category| category.id)
            .ok_or_else(|| LedgerError::Validation(format!("Class `{}` not found", old_name)))?;
        if let Some(category) = books.category_mut(id) {
            category.name = new_name.to_string();
        }
        books.touch();
        Ok(())
    }

    /// Drops the class category, but only once no account references it.
    /// Returns whether the category was actually removed.
    pub fn remove_class(books: &mut Books, name: &str) -> ServiceResult<bool> {
        let id = match books
            .category_by_name(name)
            .filter(|category| category.is_system)
        {
            Some(category) => category.id,
            None => return Ok(false),
        };
        if books.accounts.iter().any(|account| account.category_id == id) {
            return Ok(false);
        }
        books.categories.retain(|category| category.id != id);
        books.touch();
        Ok(true)
    }

    /// Creates the student's account under the class category, registering
    /// the class first when needed. Returns the new account id.
    pub fn enroll_student(
        books: &mut Books,
        student_id: Uuid,
        name: &str,
        class_name: &str,
    ) -> ServiceResult<Uuid> {
        if name.trim().is_empty() {
            return Err(LedgerError::Validation("Student name is empty".into()));
        }
        if books.student_account(student_id).is_some() {
            return Err(LedgerError::Validation(
                "Student already has an account".into(),
            ));
        }
        let category_id = Self::register_class(books, class_name)?;
        Ok(books.add_account(Account::for_student(name, category_id, student_id)))
    }

    /// Renames the student's account in lockstep with the roster.
    pub fn rename_student(books: &mut Books, student_id: Uuid, name: &str) -> ServiceResult<()> {
        if name.trim().is_empty() {
            return Err(LedgerError::Validation("Student name is empty".into()));
        }
        let account_id = books
            .student_account(student_id)
            .map(|account| account.id)
            .ok_or_else(|| LedgerError::Validation("Student account not found".into()))?;
        if let Some(account) = books.account_mut(account_id) {
            account.name = name.to_string();
        }
        books.touch();
        Ok(())
    }

    /// Removes the student's account together with every fee payment on it
    /// and their linked vouchers, as one in-memory batch.
    pub fn withdraw_student(books: &mut Books, student_id: Uuid) -> ServiceResult<()> {
        let account_id = books
            .student_account(student_id)
            .map(|account| account.id)
            .ok_or_else(|| LedgerError::Validation("Student account not found".into()))?;

        let linked_vouchers: Vec<Uuid> = books
            .fee_payments
            .iter()
            .filter(|payment| payment.account_id == account_id)
            .filter_map(|payment| payment.voucher_id)
            .collect();
        books
            .fee_payments
            .retain(|payment| payment.account_id != account_id);
        books
            .vouchers
            .retain(|voucher| !linked_vouchers.contains(&voucher.id));
        books.accounts.retain(|account| account.id != account_id);
        books.touch();
        Ok(())
    }
}
