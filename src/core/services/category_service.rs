//! Validated CRUD over account categories.

use uuid::Uuid;

use crate::domain::AccountCategory;
use crate::errors::LedgerError;
use crate::ledger::Books;

use super::ServiceResult;

/// Operator-facing category management. Class-derived system categories are
/// managed by the enrollment lifecycle and rejected here.
pub struct CategoryService;

impl CategoryService {
    /// Adds an operator-created category and returns its identifier.
    pub fn create(books: &mut Books, name: impl Into<String>) -> ServiceResult<Uuid> {
        let name = name.into();
        Self::validate_name(books, None, &name)?;
        Ok(books.add_category(AccountCategory::new(name)))
    }

    /// Renames a category; system categories only move with their class.
    pub fn rename(books: &mut Books, id: Uuid, name: impl Into<String>) -> ServiceResult<()> {
        let name = name.into();
        Self::validate_name(books, Some(id), &name)?;
        let category = books
            .category_mut(id)
            .ok_or_else(|| LedgerError::Validation("Category not found".into()))?;
        if category.is_system {
            return Err(LedgerError::Immutable(category.name.clone()));
        }
        category.name = name;
        books.touch();
        Ok(())
    }

    /// Removes a category once nothing references it.
    pub fn remove(books: &mut Books, id: Uuid) -> ServiceResult<()> {
        let category = books
            .category(id)
            .ok_or_else(|| LedgerError::Validation("Category not found".into()))?;
        if category.is_system {
            return Err(LedgerError::Immutable(category.name.clone()));
        }
        if books.accounts.iter().any(|account| account.category_id == id) {
            return Err(LedgerError::CategoryInUse(category.name.clone()));
        }
        books.categories.retain(|category| category.id != id);
        books.touch();
        Ok(())
    }

    pub fn list(books: &Books) -> Vec<&AccountCategory> {
        books.categories.iter().collect()
    }

    fn validate_name(books: &Books, exclude: Option<Uuid>, candidate: &str) -> ServiceResult<()> {
        if candidate.trim().is_empty() {
            return Err(LedgerError::Validation("Category name is empty".into()));
        }
        let normalized = candidate.trim().to_ascii_lowercase();
        let duplicate = books.categories.iter().any(|category| {
            let name = category.name.trim().to_ascii_lowercase();
            name == normalized && exclude.map_or(true, |id| category.id != id)
        });
        if duplicate {
            Err(LedgerError::Validation(format!(
                "Category `{}` already exists",
                candidate
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Account;

    #[test]
    fn duplicate_names_are_rejected() {
        let mut books = Books::new("Categories");
        CategoryService::create(&mut books, "Library").unwrap();
        let err = CategoryService::create(&mut books, "  library ").unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn system_categories_refuse_manual_rename_and_delete() {
        let mut books = Books::new("Categories");
        let id = books.add_category(AccountCategory::system("Grade 5"));
        assert!(matches!(
            CategoryService::rename(&mut books, id, "Grade 6"),
            Err(LedgerError::Immutable(_))
        ));
        assert!(matches!(
            CategoryService::remove(&mut books, id),
            Err(LedgerError::Immutable(_))
        ));
    }

    #[test]
    fn remove_fails_while_accounts_reference_the_category() {
        let mut books = Books::new("Categories");
        let id = CategoryService::create(&mut books, "Transport").unwrap();
        books.add_account(Account::new("Bus fund", id));
        assert!(matches!(
            CategoryService::remove(&mut books, id),
            Err(LedgerError::CategoryInUse(_))
        ));
        books.accounts.clear();
        CategoryService::remove(&mut books, id).unwrap();
        assert!(books.category(id).is_none());
    }
}
