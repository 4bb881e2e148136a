//! Facade that coordinates the in-memory books with the persistence layer.

use std::path::{Path, PathBuf};

use crate::errors::LedgerError;
use crate::ledger::{Books, CURRENT_SCHEMA_VERSION};
use crate::storage::{books_warnings, StorageBackend};

/// Metadata describing the outcome of a load or restore.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub tenant: String,
    pub warnings: Vec<String>,
    pub schema_version: u8,
}

/// Holds the currently open books and routes every storage call through an
/// explicit tenant key. Mutations are committed to memory only after the
/// store confirms them, so a failed write leaves prior state intact.
pub struct BooksManager {
    pub current: Option<Books>,
    current_tenant: Option<String>,
    storage: Box<dyn StorageBackend>,
}

impl BooksManager {
    pub fn new(storage: Box<dyn StorageBackend>) -> Self {
        Self {
            current: None,
            current_tenant: None,
            storage,
        }
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    /// Loads a tenant's books and makes them current.
    pub fn load(&mut self, tenant: &str) -> Result<LoadReport, LedgerError> {
        let books = self.storage.load(tenant)?;
        Self::ensure_schema_support(books.schema_version)?;
        let report = LoadReport {
            tenant: tenant.to_string(),
            warnings: books_warnings(&books),
            schema_version: books.schema_version,
        };
        if !report.warnings.is_empty() {
            tracing::warn!(
                tenant,
                count = report.warnings.len(),
                "books loaded with integrity warnings"
            );
        }
        self.current = Some(books);
        self.current_tenant = Some(tenant.to_string());
        Ok(report)
    }

    /// Persists the current books under their tenant key.
    pub fn save(&self) -> Result<(), LedgerError> {
        let books = self
            .current
            .as_ref()
            .ok_or_else(|| LedgerError::Persistence("no books loaded".into()))?;
        let tenant = self
            .current_tenant
            .as_deref()
            .ok_or_else(|| LedgerError::Persistence("current books have no tenant".into()))?;
        self.storage.save(books, tenant)
    }

    /// Persists the current books under a new tenant key and adopts it.
    pub fn save_as(&mut self, tenant: &str) -> Result<(), LedgerError> {
        let books = self
            .current
            .as_ref()
            .ok_or_else(|| LedgerError::Persistence("no books loaded".into()))?;
        self.storage.save(books, tenant)?;
        self.current_tenant = Some(tenant.to_string());
        Ok(())
    }

    pub fn backup(&self, note: Option<&str>) -> Result<PathBuf, LedgerError> {
        let books = self
            .current
            .as_ref()
            .ok_or_else(|| LedgerError::Persistence("no books loaded".into()))?;
        let tenant = self
            .current_tenant
            .as_deref()
            .ok_or_else(|| LedgerError::Persistence("current books have no tenant".into()))?;
        self.storage.backup(books, tenant, note)
    }

    pub fn list_backups(&self, tenant: &str) -> Result<Vec<String>, LedgerError> {
        self.storage.list_backups(tenant)
    }

    /// Replaces the tenant's stored and in-memory state with a snapshot.
    /// Destructive: the caller must have collected an explicit confirmation
    /// before calling.
    pub fn restore(&mut self, tenant: &str, backup_name: &str) -> Result<LoadReport, LedgerError> {
        let books = self.storage.restore(tenant, backup_name)?;
        Self::ensure_schema_support(books.schema_version)?;
        let report = LoadReport {
            tenant: tenant.to_string(),
            warnings: books_warnings(&books),
            schema_version: books.schema_version,
        };
        self.current = Some(books);
        self.current_tenant = Some(tenant.to_string());
        Ok(report)
    }

    /// Exports the current books as one JSON document.
    pub fn export_to_path(&self, path: &Path) -> Result<(), LedgerError> {
        let books = self
            .current
            .as_ref()
            .ok_or_else(|| LedgerError::Persistence("no books loaded".into()))?;
        self.storage.export_to_path(books, path)
    }

    /// Imports a whole-books document and adopts it as the tenant's state,
    /// replacing whatever was stored. Destructive like [`Self::restore`];
    /// the caller confirms first.
    pub fn import_from_path(
        &mut self,
        path: &Path,
        tenant: &str,
    ) -> Result<LoadReport, LedgerError> {
        let books = self.storage.import_from_path(path)?;
        Self::ensure_schema_support(books.schema_version)?;
        self.storage.save(&books, tenant)?;
        let report = LoadReport {
            tenant: tenant.to_string(),
            warnings: books_warnings(&books),
            schema_version: books.schema_version,
        };
        self.current = Some(books);
        self.current_tenant = Some(tenant.to_string());
        Ok(report)
    }

    pub fn last_opened(&self) -> Result<Option<String>, LedgerError> {
        self.storage.last_tenant()
    }

    pub fn record_last_opened(&self, tenant: Option<&str>) -> Result<(), LedgerError> {
        self.storage.record_last_tenant(tenant)
    }

    pub fn current_tenant(&self) -> Option<&str> {
        self.current_tenant.as_deref()
    }

    pub fn set_current(&mut self, books: Books, tenant: Option<String>) {
        self.current = Some(books);
        self.current_tenant = tenant;
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.current_tenant = None;
    }

    fn ensure_schema_support(schema_version: u8) -> Result<(), LedgerError> {
        if schema_version > CURRENT_SCHEMA_VERSION {
            return Err(LedgerError::Persistence(format!(
                "books schema v{} is newer than supported v{}",
                schema_version, CURRENT_SCHEMA_VERSION
            )));
        }
        Ok(())
    }
}
