//! Filesystem layout for the application data directory.

use dirs::home_dir;
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

const DEFAULT_DIR_NAME: &str = ".bursar_core";
const TENANTS_DIR: &str = "tenants";
const BACKUP_DIR: &str = "backups";
const CONFIG_FILE: &str = "config.json";
const CONFIG_BACKUP_DIR: &str = "config_backups";
const STATE_FILE: &str = "state.json";

/// Returns the application data directory, defaulting to `~/.bursar_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("BURSAR_CORE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Uses `custom` when given, the default data directory otherwise.
pub fn resolve_base(custom: Option<PathBuf>) -> PathBuf {
    custom.unwrap_or_else(app_data_dir)
}

/// Directory holding one subdirectory of collections per tenant.
pub fn tenants_dir_in(base: &Path) -> PathBuf {
    base.join(TENANTS_DIR)
}

/// Base directory for backup snapshots.
pub fn backups_dir_in(base: &Path) -> PathBuf {
    base.join(BACKUP_DIR)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

pub fn config_backups_dir_in(base: &Path) -> PathBuf {
    base.join(CONFIG_BACKUP_DIR)
}

/// Path to the shared state file (tracking the last opened tenant).
pub fn state_file_in(base: &Path) -> PathBuf {
    base.join(STATE_FILE)
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}
