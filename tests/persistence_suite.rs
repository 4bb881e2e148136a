mod common;

use bursar_core::{
    core::services::{EntryService, ReportService, VoucherService},
    domain::{Account, AccountCategory, LineDraft, Side, VoucherType},
    ledger::Books,
};
use chrono::NaiveDate;
use common::setup_test_env;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, day).unwrap()
}

fn books_with_vouchers() -> Books {
    let mut books = Books::new("Hillside");
    let category = books.add_category(AccountCategory::new("Office"));
    let cash = books.add_account(Account::new("Cash", category));
    let fees = books.add_account(Account::new("Fees", category));
    books.cash_account_id = Some(cash);
    for (day, amount) in [(1, 210.0), (2, 95.5), (4, 430.25)] {
        VoucherService::post(
            &mut books,
            VoucherType::Receipt,
            date(day),
            "term fees",
            &[
                LineDraft::debit(cash, amount),
                LineDraft::credit(fees, amount),
            ],
        )
        .unwrap();
    }
    books
}

#[test]
fn vouchers_stay_balanced_after_store_and_reload() {
    let (mut manager, _config) = setup_test_env();
    manager.set_current(books_with_vouchers(), None);
    manager.save_as("hillside").unwrap();

    manager.clear();
    manager.load("hillside").unwrap();
    let books = manager.current.as_ref().unwrap();
    assert_eq!(books.vouchers.len(), 3);
    for voucher in &books.vouchers {
        assert!((voucher.total_debit() - voucher.total_credit()).abs() <= 0.01);
    }
    ReportService::trial_balance(books).verify().unwrap();
}

#[test]
fn balances_rederive_identically_after_reload() {
    let (mut manager, _config) = setup_test_env();
    let mut books = books_with_vouchers();
    EntryService::set_opening_balance(&mut books, date(1), 500.0, Side::Credit).unwrap();
    let before = bursar_core::core::balance::opening_balance(&books, date(5));

    manager.set_current(books, None);
    manager.save_as("hillside").unwrap();
    manager.clear();
    manager.load("hillside").unwrap();

    let after =
        bursar_core::core::balance::opening_balance(manager.current.as_ref().unwrap(), date(5));
    assert_eq!(before, after);
}

#[test]
fn restore_fully_replaces_the_tenant_state() {
    let (mut manager, _config) = setup_test_env();
    manager.set_current(books_with_vouchers(), None);
    manager.save_as("hillside").unwrap();
    manager.backup(Some("quarter close")).unwrap();

    // Mutate and persist, then roll back to the snapshot.
    let books = manager.current.as_mut().unwrap();
    let cash = books.cash_account_id.unwrap();
    let fees = books.account_by_name("Fees").unwrap().id;
    VoucherService::post(
        books,
        VoucherType::Receipt,
        date(10),
        "late fees",
        &[LineDraft::debit(cash, 60.0), LineDraft::credit(fees, 60.0)],
    )
    .unwrap();
    manager.save().unwrap();
    assert_eq!(manager.current.as_ref().unwrap().vouchers.len(), 4);

    let backups = manager.list_backups("hillside").unwrap();
    manager.restore("hillside", &backups[0]).unwrap();
    assert_eq!(manager.current.as_ref().unwrap().vouchers.len(), 3);
    manager.clear();
    manager.load("hillside").unwrap();
    assert_eq!(manager.current.as_ref().unwrap().vouchers.len(), 3);
}

#[test]
fn export_writes_one_document_with_every_collection() {
    let (mut manager, _config) = setup_test_env();
    manager.set_current(books_with_vouchers(), None);
    manager.save_as("hillside").unwrap();

    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("export.json");
    manager.export_to_path(&path).unwrap();

    let exported = bursar_core::storage::json_backend::import_books_from_path(&path).unwrap();
    assert_eq!(exported.vouchers.len(), 3);
    assert_eq!(exported.accounts.len(), 2);
    assert_eq!(exported.name, "Hillside");
}

#[test]
fn config_tracks_the_last_opened_tenant() {
    let (manager, config_manager) = setup_test_env();
    let mut config = config_manager.load().unwrap();
    config.last_opened_tenant = Some("hillside".into());
    config_manager.save(&config).unwrap();
    assert_eq!(
        config_manager.load().unwrap().last_opened_tenant.as_deref(),
        Some("hillside")
    );

    manager.record_last_opened(Some("hillside")).unwrap();
    assert_eq!(manager.last_opened().unwrap().as_deref(), Some("hillside"));
}
