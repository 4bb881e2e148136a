use bursar_core::{
    core::balance,
    core::services::{EntryService, ReportService, VoucherService},
    domain::{Account, AccountCategory, LineDraft, Side, VoucherType},
    ledger::Books,
};
use chrono::NaiveDate;
use uuid::Uuid;

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

fn books_with(accounts: &[&str]) -> (Books, Vec<Uuid>) {
    let mut books = Books::new("Reports");
    let category = books.add_category(AccountCategory::new("General"));
    let ids = accounts
        .iter()
        .map(|name| books.add_account(Account::new(*name, category)))
        .collect();
    (books, ids)
}

#[test]
fn ledger_statement_matches_the_worked_example() {
    let (mut books, ids) = books_with(&["Cash"]);
    let cash = ids[0];
    let category = books.categories[0].id;
    let account = books
        .add_account(Account::new("Development fund", category).with_opening_balance(1000.0, Side::Credit));

    VoucherService::post(
        &mut books,
        VoucherType::Payment,
        date(1, 5),
        "hall repairs",
        &[
            LineDraft::debit(account, 500.0),
            LineDraft::credit(cash, 500.0),
        ],
    )
    .unwrap();
    VoucherService::post(
        &mut books,
        VoucherType::Receipt,
        date(1, 10),
        "donation",
        &[
            LineDraft::debit(cash, 200.0),
            LineDraft::credit(account, 200.0),
        ],
    )
    .unwrap();

    let statement =
        ReportService::account_ledger(&books, account, date(1, 1), date(1, 31)).unwrap();
    assert_eq!(statement.opening, 1000.0);
    let rows: Vec<(NaiveDate, f64, f64)> = statement
        .rows
        .iter()
        .map(|row| (row.date, row.amount, row.balance))
        .collect();
    assert_eq!(
        rows,
        vec![
            (date(1, 5), -500.0, 500.0),
            (date(1, 10), 200.0, 700.0),
        ]
    );
}

#[test]
fn statement_range_filters_and_orders_postings() {
    let (mut books, ids) = books_with(&["Cash", "Library"]);
    let (cash, library) = (ids[0], ids[1]);
    let lines = |amount: f64| {
        [
            LineDraft::debit(cash, amount),
            LineDraft::credit(library, amount),
        ]
    };
    VoucherService::post(&mut books, VoucherType::Receipt, date(2, 20), "late", &lines(30.0))
        .unwrap();
    VoucherService::post(&mut books, VoucherType::Receipt, date(2, 5), "early", &lines(10.0))
        .unwrap();
    VoucherService::post(&mut books, VoucherType::Receipt, date(3, 1), "outside", &lines(99.0))
        .unwrap();

    let statement =
        ReportService::account_ledger(&books, library, date(2, 1), date(2, 28)).unwrap();
    assert_eq!(statement.rows.len(), 2);
    assert_eq!(statement.rows[0].date, date(2, 5));
    assert_eq!(statement.rows[1].date, date(2, 20));
    assert_eq!(statement.closing, 40.0);
}

#[test]
fn day_book_groups_simple_postings_by_side() {
    let (mut books, ids) = books_with(&["Fees", "Maintenance"]);
    let (fees, maintenance) = (ids[0], ids[1]);
    EntryService::record_income(&mut books, date(4, 2), fees, 300.0, Some("term".into()))
        .unwrap();
    EntryService::record_income(&mut books, date(4, 2), fees, 120.0, None).unwrap();
    EntryService::record_expenditure(&mut books, date(4, 2), maintenance, 75.0, None).unwrap();
    EntryService::record_income(&mut books, date(4, 3), fees, 999.0, None).unwrap();

    let day = ReportService::day_book(&books, date(4, 2));
    assert_eq!(day.income.len(), 2);
    assert_eq!(day.expenditure.len(), 1);
    assert_eq!(day.income_total, 420.0);
    assert_eq!(day.expenditure_total, 75.0);
    assert_eq!(day.closing.signed(), 345.0);
    assert_eq!(
        day.closing.signed(),
        balance::opening_balance(&books, date(4, 3)).signed()
    );
}

#[test]
fn trial_balance_carries_fixed_opening_balances() {
    let (mut books, _ids) = books_with(&[]);
    let category = books.categories[0].id;
    // Openings that balance each other: one debit, one credit.
    books.add_account(
        Account::new("Receivables", category).with_opening_balance(400.0, Side::Debit),
    );
    books.add_account(Account::new("Reserve", category).with_opening_balance(400.0, Side::Credit));

    let report = ReportService::trial_balance(&books);
    assert_eq!(report.total_debits, 400.0);
    assert_eq!(report.total_credits, 400.0);
    report.verify().unwrap();

    // An opening with no counterweight shows up as an integrity fault.
    books.add_account(Account::new("Stray", category).with_opening_balance(50.0, Side::Debit));
    assert!(ReportService::trial_balance(&books).verify().is_err());
}
