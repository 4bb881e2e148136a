use std::sync::Mutex;

use bursar_core::{
    config::ConfigManager, core::books_manager::BooksManager, storage::JsonStorage,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates isolated managers backed by unique directories for each test.
pub fn setup_test_env() -> (BooksManager, ConfigManager) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let storage = JsonStorage::new(Some(base.join("books")), Some(3))
        .expect("create json storage backend");
    let books_manager = BooksManager::new(Box::new(storage));
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");

    (books_manager, config_manager)
}
