pub mod json_backend;

use std::path::{Path, PathBuf};

use crate::{errors::LedgerError, ledger::Books};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Abstraction over persistence backends capable of storing one tenant's
/// books and their backup snapshots. The tenant key is always explicit;
/// nothing here relies on ambient state.
pub trait StorageBackend: Send + Sync {
    fn save(&self, books: &Books, tenant: &str) -> Result<()>;
    fn load(&self, tenant: &str) -> Result<Books>;
    fn list_tenants(&self) -> Result<Vec<String>>;
    fn backup(&self, books: &Books, tenant: &str, note: Option<&str>) -> Result<PathBuf>;
    fn list_backups(&self, tenant: &str) -> Result<Vec<String>>;
    fn restore(&self, tenant: &str, backup_name: &str) -> Result<Books>;
    fn last_tenant(&self) -> Result<Option<String>>;
    fn record_last_tenant(&self, tenant: Option<&str>) -> Result<()>;

    /// Ad-hoc export/import of the whole books as one JSON document.
    /// Default implementations forward to the JSON codec.
    fn export_to_path(&self, books: &Books, path: &Path) -> Result<()> {
        json_backend::export_books_to_path(books, path)
    }

    fn import_from_path(&self, path: &Path) -> Result<Books> {
        json_backend::import_books_from_path(path)
    }
}

pub use json_backend::{books_warnings, JsonStorage};
