//! Validated CRUD over ledger accounts.

use uuid::Uuid;

use crate::domain::{Account, Side};
use crate::errors::LedgerError;
use crate::ledger::Books;

use super::ServiceResult;

/// Fields an operator may change on an account.
#[derive(Debug, Clone)]
pub struct AccountChanges {
    pub name: String,
    pub category_id: Uuid,
    pub opening_balance: Option<f64>,
    pub opening_balance_type: Option<Side>,
}

/// Operator-facing account management. Student-linked accounts belong to the
/// enrollment lifecycle and are rejected here.
pub struct AccountService;

impl AccountService {
    /// Adds an account and returns its identifier.
    pub fn create(books: &mut Books, account: Account) -> ServiceResult<Uuid> {
        Self::validate_name(books, None, &account.name)?;
        if books.category(account.category_id).is_none() {
            return Err(LedgerError::Validation("Category not found".into()));
        }
        Ok(books.add_account(account))
    }

    /// Applies `changes` to the account identified by `id`.
    pub fn edit(books: &mut Books, id: Uuid, changes: AccountChanges) -> ServiceResult<()> {
        Self::validate_name(books, Some(id), &changes.name)?;
        if books.category(changes.category_id).is_none() {
            return Err(LedgerError::Validation("Category not found".into()));
        }
        let account = books
            .account_mut(id)
            .ok_or_else(|| LedgerError::Validation("Account not found".into()))?;
        if account.is_student_account {
            return Err(LedgerError::Immutable(account.name.clone()));
        }
        account.name = changes.name;
        account.category_id = changes.category_id;
        account.opening_balance = changes.opening_balance;
        account.opening_balance_type = changes.opening_balance_type;
        books.touch();
        Ok(())
    }

    /// Removes an account. Postings that still reference it become orphans
    /// and drop out of replay and reports; callers purge them separately.
    pub fn remove(books: &mut Books, id: Uuid) -> ServiceResult<Account> {
        let index = books
            .accounts
            .iter()
            .position(|account| account.id == id)
            .ok_or_else(|| LedgerError::Validation("Account not found".into()))?;
        if books.accounts[index].is_student_account {
            return Err(LedgerError::Immutable(books.accounts[index].name.clone()));
        }
        let removed = books.accounts.remove(index);
        books.touch();
        Ok(removed)
    }

    pub fn list(books: &Books) -> Vec<&Account> {
        books.accounts.iter().collect()
    }

    fn validate_name(books: &Books, exclude: Option<Uuid>, candidate: &str) -> ServiceResult<()> {
        if candidate.trim().is_empty() {
            return Err(LedgerError::Validation("Account name is empty".into()));
        }
        let normalized = candidate.trim().to_ascii_lowercase();
        let duplicate = books.accounts.iter().any(|account| {
            let name = account.name.trim().to_ascii_lowercase();
            name == normalized && exclude.map_or(true, |id| account.id != id)
        });
        if duplicate {
            Err(LedgerError::Validation(format!(
                "Account `{}` already exists",
                candidate
            )))
        } else {
            Ok(())
        }
    }
}
