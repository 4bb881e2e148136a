use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    collections::HashSet,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use uuid::Uuid;

use crate::{
    core::utils::{self, ensure_dir},
    errors::LedgerError,
    ledger::Books,
};

use super::{Result, StorageBackend};

const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

const META_FILE: &str = "meta.json";
const CATEGORIES_FILE: &str = "categories.json";
const ACCOUNTS_FILE: &str = "accounts.json";
const OVERRIDES_FILE: &str = "opening_overrides.json";
const INCOMES_FILE: &str = "incomes.json";
const EXPENDITURES_FILE: &str = "expenditures.json";
const FEE_PAYMENTS_FILE: &str = "fee_payments.json";
const VOUCHERS_FILE: &str = "vouchers.json";

/// Identity and bookkeeping fields stored alongside the collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BooksMeta {
    id: Uuid,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cash_account_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default = "Books::schema_version_default")]
    schema_version: u8,
}

impl BooksMeta {
    fn of(books: &Books) -> Self {
        Self {
            id: books.id,
            name: books.name.clone(),
            cash_account_id: books.cash_account_id,
            created_at: books.created_at,
            updated_at: books.updated_at,
            schema_version: books.schema_version,
        }
    }
}

/// Stores each entity collection of a tenant as its own JSON array under
/// `<root>/tenants/<tenant>/`, so every collection reads and writes whole.
#[derive(Clone)]
pub struct JsonStorage {
    tenants_dir: PathBuf,
    backups_dir: PathBuf,
    state_file: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let base = utils::resolve_base(root);
        ensure_dir(&base)?;
        let tenants_dir = utils::tenants_dir_in(&base);
        let backups_dir = utils::backups_dir_in(&base);
        ensure_dir(&tenants_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            tenants_dir,
            backups_dir,
            state_file: utils::state_file_in(&base),
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn tenant_dir(&self, tenant: &str) -> PathBuf {
        self.tenants_dir.join(canonical_name(tenant))
    }

    fn backup_dir(&self, tenant: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(tenant))
    }

    pub fn backup_path(&self, tenant: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(tenant).join(backup_name)
    }

    fn read_state(&self) -> Result<StoreState> {
        if self.state_file.exists() {
            let data = fs::read_to_string(&self.state_file)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(StoreState::default())
        }
    }

    fn prune_backups(&self, tenant: &str) -> Result<()> {
        let backups = self.list_backups(tenant)?;
        if backups.len() <= self.retention {
            return Ok(());
        }
        for entry in backups.iter().skip(self.retention) {
            let path = self.backup_path(tenant, entry);
            let _ = fs::remove_file(path);
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, books: &Books, tenant: &str) -> Result<()> {
        let dir = self.tenant_dir(tenant);
        ensure_dir(&dir)?;
        write_collection(&dir.join(META_FILE), &BooksMeta::of(books))?;
        write_collection(&dir.join(CATEGORIES_FILE), &books.categories)?;
        write_collection(&dir.join(ACCOUNTS_FILE), &books.accounts)?;
        write_collection(&dir.join(OVERRIDES_FILE), &books.opening_overrides)?;
        write_collection(&dir.join(INCOMES_FILE), &books.incomes)?;
        write_collection(&dir.join(EXPENDITURES_FILE), &books.expenditures)?;
        write_collection(&dir.join(FEE_PAYMENTS_FILE), &books.fee_payments)?;
        write_collection(&dir.join(VOUCHERS_FILE), &books.vouchers)?;
        tracing::debug!(tenant, "books saved");
        Ok(())
    }

    fn load(&self, tenant: &str) -> Result<Books> {
        let dir = self.tenant_dir(tenant);
        if !dir.exists() {
            return Err(LedgerError::Persistence(format!(
                "tenant `{}` not found",
                tenant
            )));
        }
        let meta: BooksMeta = read_document(&dir.join(META_FILE))?;
        Ok(Books {
            id: meta.id,
            name: meta.name,
            categories: read_collection(&dir.join(CATEGORIES_FILE))?,
            accounts: read_collection(&dir.join(ACCOUNTS_FILE))?,
            opening_overrides: read_collection(&dir.join(OVERRIDES_FILE))?,
            incomes: read_collection(&dir.join(INCOMES_FILE))?,
            expenditures: read_collection(&dir.join(EXPENDITURES_FILE))?,
            fee_payments: read_collection(&dir.join(FEE_PAYMENTS_FILE))?,
            vouchers: read_collection(&dir.join(VOUCHERS_FILE))?,
            cash_account_id: meta.cash_account_id,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
            schema_version: meta.schema_version,
        })
    }

    fn list_tenants(&self) -> Result<Vec<String>> {
        if !self.tenants_dir.exists() {
            return Ok(Vec::new());
        }
        let mut tenants = Vec::new();
        for entry in fs::read_dir(&self.tenants_dir)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                tenants.push(name.to_string());
            }
        }
        tenants.sort();
        Ok(tenants)
    }

    fn backup(&self, books: &Books, tenant: &str, note: Option<&str>) -> Result<PathBuf> {
        let dir = self.backup_dir(tenant);
        ensure_dir(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut file_stem = format!("{}_{}", canonical_name(tenant), timestamp);
        if let Some(label) = sanitize_backup_note(note) {
            file_stem.push('_');
            file_stem.push_str(&label);
        }
        let path = dir.join(format!("{}.{}", file_stem, BACKUP_EXTENSION));
        export_books_to_path(books, &path)?;
        self.prune_backups(tenant)?;
        tracing::info!(tenant, path = %path.display(), "backup written");
        Ok(path)
    }

    fn list_backups(&self, tenant: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(tenant);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            let file_name = match path.file_name().and_then(|stem| stem.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            entries.push(file_name);
        }
        entries.sort_by(|a, b| parse_backup_timestamp(b).cmp(&parse_backup_timestamp(a)));
        Ok(entries)
    }

    /// Restores a snapshot over the tenant's current collections. This is a
    /// full replace; the caller is expected to have confirmed the loss of
    /// whatever is currently stored.
    fn restore(&self, tenant: &str, backup_name: &str) -> Result<Books> {
        let backup_path = self.backup_path(tenant, backup_name);
        if !backup_path.exists() {
            return Err(LedgerError::Persistence(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        let books = import_books_from_path(&backup_path)?;
        self.save(&books, tenant)?;
        tracing::info!(tenant, backup = backup_name, "backup restored");
        Ok(books)
    }

    fn last_tenant(&self) -> Result<Option<String>> {
        let state = self.read_state()?;
        Ok(state.last_tenant)
    }

    fn record_last_tenant(&self, tenant: Option<&str>) -> Result<()> {
        let mut state = self.read_state()?;
        state.last_tenant = tenant.map(canonical_name);
        let data = serde_json::to_string_pretty(&state)?;
        write_atomic(&self.state_file, &data)?;
        Ok(())
    }
}

/// Serializes the whole books as one JSON document.
pub fn export_books_to_path(books: &Books, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(books)?;
    write_atomic(path, &json)?;
    Ok(())
}

/// Parses a whole-books JSON document.
pub fn import_books_from_path(path: &Path) -> Result<Books> {
    let data = fs::read_to_string(path)?;
    let books: Books = serde_json::from_str(&data)?;
    Ok(books)
}

/// Non-fatal integrity warnings surfaced after a load.
pub fn books_warnings(books: &Books) -> Vec<String> {
    let account_ids: HashSet<_> = books.accounts.iter().map(|a| a.id).collect();
    let category_ids: HashSet<_> = books.categories.iter().map(|c| c.id).collect();
    let voucher_ids: HashSet<_> = books.vouchers.iter().map(|v| v.id).collect();
    let mut warnings = Vec::new();

    for account in &books.accounts {
        if !category_ids.contains(&account.category_id) {
            warnings.push(format!(
                "account {} references unknown category {}",
                account.id, account.category_id
            ));
        }
    }
    for entry in &books.incomes {
        if !account_ids.contains(&entry.account_id) {
            warnings.push(format!(
                "income entry {} references unknown account {}",
                entry.id, entry.account_id
            ));
        }
    }
    for entry in &books.expenditures {
        if !account_ids.contains(&entry.account_id) {
            warnings.push(format!(
                "expenditure {} references unknown account {}",
                entry.id, entry.account_id
            ));
        }
    }
    for payment in &books.fee_payments {
        if !account_ids.contains(&payment.account_id) {
            warnings.push(format!(
                "fee payment {} references unknown account {}",
                payment.id, payment.account_id
            ));
        }
        if let Some(voucher_id) = payment.voucher_id {
            if !voucher_ids.contains(&voucher_id) {
                warnings.push(format!(
                    "fee payment {} references missing voucher {}",
                    payment.id, voucher_id
                ));
            }
        }
    }
    for voucher in &books.vouchers {
        for line in &voucher.lines {
            if !account_ids.contains(&line.account_id) {
                warnings.push(format!(
                    "voucher #{} references unknown account {}",
                    voucher.voucher_number, line.account_id
                ));
            }
        }
    }
    warnings
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreState {
    last_tenant: Option<String>,
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "tenant".into()
    } else {
        sanitized
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if ch.is_whitespace() || matches!(ch, '-' | '.') {
            if !sanitized.is_empty() && !last_dash {
                sanitized.push('-');
                last_dash = true;
            }
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = name.split('_').collect();
    if parts.len() < 3 {
        return None;
    }
    let date_part = parts.get(parts.len() - 2)?;
    let time_part = parts.last()?;
    if !is_digits(date_part, 8) || !time_part.ends_with(".json") {
        return None;
    }
    let time_digits = &time_part[..time_part.len() - 5];
    if !is_digits(time_digits, 4) {
        return None;
    }
    let raw = format!("{}{}", date_part, time_digits);
    NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_collection<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_atomic(path, &json)
}

fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(LedgerError::Persistence(format!(
            "collection file `{}` missing",
            path.display()
        )));
    }
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::EntryService;
    use crate::domain::{Account, AccountCategory};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn storage_with_temp_dir() -> (JsonStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage =
            JsonStorage::new(Some(temp.path().to_path_buf()), Some(3)).expect("json storage");
        (storage, temp)
    }

    fn sample_books() -> Books {
        let mut books = Books::new("St. Mary's");
        let category = books.add_category(AccountCategory::new("Office"));
        let account = books.add_account(Account::new("Cash", category));
        EntryService::record_income(
            &mut books,
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            account,
            120.0,
            None,
        )
        .unwrap();
        books
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (storage, _guard) = storage_with_temp_dir();
        let books = sample_books();
        storage.save(&books, "st-marys").expect("save books");
        let loaded = storage.load("st-marys").expect("load books");
        assert_eq!(loaded.name, "St. Mary's");
        assert_eq!(loaded.accounts.len(), 1);
        assert_eq!(loaded.incomes.len(), 1);
        assert_eq!(loaded.id, books.id);
    }

    #[test]
    fn collections_are_stored_one_file_per_entity_type() {
        let (storage, _guard) = storage_with_temp_dir();
        storage.save(&sample_books(), "st-marys").unwrap();
        let dir = storage.tenant_dir("st-marys");
        for file in [META_FILE, CATEGORIES_FILE, ACCOUNTS_FILE, INCOMES_FILE, VOUCHERS_FILE] {
            assert!(dir.join(file).exists(), "expected {} to exist", file);
        }
    }

    #[test]
    fn loading_an_unknown_tenant_fails() {
        let (storage, _guard) = storage_with_temp_dir();
        let err = storage.load("nobody").unwrap_err();
        assert!(matches!(err, LedgerError::Persistence(_)));
    }

    #[test]
    fn backup_and_restore_replace_current_state() {
        let (storage, _guard) = storage_with_temp_dir();
        let books = sample_books();
        storage.save(&books, "school").unwrap();
        storage.backup(&books, "school", Some("term close")).unwrap();

        let mut altered = books.clone();
        altered.incomes.clear();
        storage.save(&altered, "school").unwrap();
        assert!(storage.load("school").unwrap().incomes.is_empty());

        let backups = storage.list_backups("school").unwrap();
        assert!(!backups.is_empty());
        let restored = storage.restore("school", &backups[0]).unwrap();
        assert_eq!(restored.incomes.len(), 1);
        assert_eq!(storage.load("school").unwrap().incomes.len(), 1);
    }

    #[test]
    fn warnings_flag_dangling_references() {
        let mut books = sample_books();
        books.accounts.clear();
        let warnings = books_warnings(&books);
        assert!(warnings
            .iter()
            .any(|warning| warning.contains("unknown account")));
    }

    #[test]
    fn last_tenant_roundtrips_through_the_state_file() {
        let (storage, _guard) = storage_with_temp_dir();
        assert_eq!(storage.last_tenant().unwrap(), None);
        storage.record_last_tenant(Some("Green Valley")).unwrap();
        assert_eq!(storage.last_tenant().unwrap().as_deref(), Some("green_valley"));
    }
}
