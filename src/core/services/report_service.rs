//! Shapes balance-engine output into the day book, per-account statements,
//! and the trial balance.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::balance::{self, Balance};
use crate::domain::{Side, AMOUNT_EPSILON};
use crate::errors::LedgerError;
use crate::ledger::Books;

use super::ServiceResult;

/// One posting as it appears in the day book.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayBookLine {
    pub account_id: Uuid,
    pub account_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher_number: Option<u32>,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// Cash movements for a single date, bracketed by opening and closing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayBook {
    pub date: NaiveDate,
    pub opening: Balance,
    pub income: Vec<DayBookLine>,
    pub expenditure: Vec<DayBookLine>,
    pub income_total: f64,
    pub expenditure_total: f64,
    pub closing: Balance,
}

/// One movement on an account's statement, with the balance after it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatementRow {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher_number: Option<u32>,
    pub particulars: String,
    pub amount: f64,
    pub balance: f64,
}

/// An account's ledger over a date range, from its own fixed opening.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountStatement {
    pub account_id: Uuid,
    pub account_name: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub opening: f64,
    pub rows: Vec<StatementRow>,
    pub closing: f64,
}

/// Per-account net position in trial-balance column terms (debit positive).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrialBalanceRow {
    pub account_id: Uuid,
    pub account_name: String,
    pub balance: f64,
}

impl TrialBalanceRow {
    pub fn debit(&self) -> f64 {
        self.balance.max(0.0)
    }

    pub fn credit(&self) -> f64 {
        (-self.balance).max(0.0)
    }
}

/// The trial balance as of now: every account, no date filter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrialBalance {
    pub rows: Vec<TrialBalanceRow>,
    pub total_debits: f64,
    pub total_credits: f64,
}

impl TrialBalance {
    pub fn difference(&self) -> f64 {
        self.total_debits - self.total_credits
    }

    /// A well-formed ledger balances; a mismatch is reported, never ignored.
    pub fn verify(&self) -> ServiceResult<()> {
        if self.difference().abs() > AMOUNT_EPSILON {
            Err(LedgerError::IntegrityFault {
                debits: self.total_debits,
                credits: self.total_credits,
            })
        } else {
            Ok(())
        }
    }
}

pub struct ReportService;

impl ReportService {
    /// Every cash movement on `date`, grouped income/expenditure, with the
    /// derived opening and closing balances around them.
    pub fn day_book(books: &Books, date: NaiveDate) -> DayBook {
        let opening = balance::opening_balance(books, date);
        let cash = books
            .cash_account_id
            .filter(|id| books.account(*id).is_some());

        let mut income = Vec::new();
        let mut expenditure = Vec::new();

        for entry in books.incomes.iter().filter(|entry| entry.date == date) {
            let Some(account) = books.account(entry.account_id) else {
                continue;
            };
            income.push(DayBookLine {
                account_id: account.id,
                account_name: account.name.clone(),
                voucher_number: None,
                amount: entry.amount,
                remarks: entry.remarks.clone(),
            });
        }
        for payment in books.fee_payments.iter().filter(|p| p.date == date) {
            let Some(account) = books.account(payment.account_id) else {
                continue;
            };
            if cash.is_some() && payment.voucher_id.is_some() {
                continue;
            }
            income.push(DayBookLine {
                account_id: account.id,
                account_name: account.name.clone(),
                voucher_number: None,
                amount: payment.amount,
                remarks: payment.remarks.clone(),
            });
        }
        for entry in books.expenditures.iter().filter(|entry| entry.date == date) {
            let Some(account) = books.account(entry.account_id) else {
                continue;
            };
            expenditure.push(DayBookLine {
                account_id: account.id,
                account_name: account.name.clone(),
                voucher_number: None,
                amount: entry.amount,
                remarks: entry.remarks.clone(),
            });
        }
        if let Some(cash) = cash {
            let cash_name = books
                .account(cash)
                .map(|account| account.name.clone())
                .unwrap_or_default();
            for voucher in books.vouchers.iter().filter(|v| v.date == date) {
                for line in voucher.lines_for(cash) {
                    let row = DayBookLine {
                        account_id: cash,
                        account_name: cash_name.clone(),
                        voucher_number: Some(voucher.voucher_number),
                        amount: line.amount,
                        remarks: Some(voucher.narration.clone()),
                    };
                    match line.side {
                        Side::Debit => income.push(row),
                        Side::Credit => expenditure.push(row),
                    }
                }
            }
        }

        let income_total: f64 = income.iter().map(|line| line.amount).sum();
        let expenditure_total: f64 = expenditure.iter().map(|line| line.amount).sum();
        let closing = Balance::from_signed(opening.signed() + income_total - expenditure_total);
        DayBook {
            date,
            opening,
            income,
            expenditure,
            income_total,
            expenditure_total,
            closing,
        }
    }

    /// Walks every posting touching `account_id` within `[from, to]`,
    /// accumulating a running balance from the account's fixed opening.
    ///
    /// Income entries carry their implicit contra side here (the cash book
    /// gets the credit, the named account the debit), expenditures the
    /// reverse; fee payments and voucher lines credit or debit the account
    /// exactly as recorded. Same-date vouchers order by voucher number.
    pub fn account_ledger(
        books: &Books,
        account_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ServiceResult<AccountStatement> {
        if to < from {
            return Err(LedgerError::Validation(
                "Statement range end precedes start".into(),
            ));
        }
        let account = books
            .account(account_id)
            .ok_or(LedgerError::UnresolvedAccount(account_id))?;

        let in_range = |date: NaiveDate| date >= from && date <= to;
        let mut rows: Vec<StatementRow> = Vec::new();

        for entry in &books.incomes {
            if entry.account_id == account_id && in_range(entry.date) {
                rows.push(StatementRow {
                    date: entry.date,
                    voucher_number: None,
                    particulars: entry.remarks.clone().unwrap_or_else(|| "Income".into()),
                    amount: -entry.amount,
                    balance: 0.0,
                });
            }
        }
        for entry in &books.expenditures {
            if entry.account_id == account_id && in_range(entry.date) {
                rows.push(StatementRow {
                    date: entry.date,
                    voucher_number: None,
                    particulars: entry.remarks.clone().unwrap_or_else(|| "Expenditure".into()),
                    amount: entry.amount,
                    balance: 0.0,
                });
            }
        }
        for payment in &books.fee_payments {
            if payment.account_id == account_id
                && in_range(payment.date)
                && payment.voucher_id.is_none()
            {
                rows.push(StatementRow {
                    date: payment.date,
                    voucher_number: None,
                    particulars: payment
                        .remarks
                        .clone()
                        .unwrap_or_else(|| "Fee payment".into()),
                    amount: payment.amount,
                    balance: 0.0,
                });
            }
        }
        for voucher in &books.vouchers {
            if !in_range(voucher.date) {
                continue;
            }
            for line in voucher.lines_for(account_id) {
                rows.push(StatementRow {
                    date: voucher.date,
                    voucher_number: Some(voucher.voucher_number),
                    particulars: voucher.narration.clone(),
                    amount: line.side.signed(line.amount),
                    balance: 0.0,
                });
            }
        }

        rows.sort_by_key(|row| (row.date, row.voucher_number.unwrap_or(0)));

        let opening = account.signed_opening();
        let mut running = opening;
        for row in &mut rows {
            running += row.amount;
            row.balance = running;
        }
        Ok(AccountStatement {
            account_id,
            account_name: account.name.clone(),
            from,
            to,
            opening,
            rows,
            closing: running,
        })
    }

    /// Net position of every account from its fixed opening plus all voucher
    /// lines, no date filter. Zero-balance accounts are left off the report.
    pub fn trial_balance(books: &Books) -> TrialBalance {
        let mut rows = Vec::new();
        for account in &books.accounts {
            let mut signed = match (account.opening_balance, account.opening_balance_type) {
                (Some(amount), Some(Side::Debit)) => amount,
                (Some(amount), _) => -amount,
                _ => 0.0,
            };
            for voucher in &books.vouchers {
                for line in voucher.lines_for(account.id) {
                    signed += match line.side {
                        Side::Debit => line.amount,
                        Side::Credit => -line.amount,
                    };
                }
            }
            if signed.abs() > f64::EPSILON {
                rows.push(TrialBalanceRow {
                    account_id: account.id,
                    account_name: account.name.clone(),
                    balance: signed,
                });
            }
        }
        let total_debits: f64 = rows.iter().map(TrialBalanceRow::debit).sum();
        let total_credits: f64 = rows.iter().map(TrialBalanceRow::credit).sum();
        TrialBalance {
            rows,
            total_debits,
            total_credits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::{EntryService, VoucherService};
    use crate::domain::{Account, AccountCategory, LineDraft, VoucherLine, VoucherType};
    use crate::ledger::Books;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn school_books() -> (Books, Uuid, Uuid) {
        let mut books = Books::new("Reports");
        let category = books.add_category(AccountCategory::new("Office"));
        let cash = books.add_account(Account::new("Cash", category));
        let fees = books.add_account(Account::new("Tuition", category));
        (books, cash, fees)
    }

    #[test]
    fn statement_runs_from_the_fixed_opening_balance() {
        let (mut books, cash, _) = school_books();
        let category = books.categories[0].id;
        let account = books.add_account(
            Account::new("Building fund", category).with_opening_balance(1000.0, Side::Credit),
        );

        books.add_voucher(crate::domain::JournalEntry::new(
            date(1, 5),
            VoucherType::Payment,
            1,
            "repairs",
            vec![
                VoucherLine::debit(account, 500.0),
                VoucherLine::credit(cash, 500.0),
            ],
        ));
        books.add_voucher(crate::domain::JournalEntry::new(
            date(1, 10),
            VoucherType::Receipt,
            2,
            "grant",
            vec![
                VoucherLine::debit(cash, 200.0),
                VoucherLine::credit(account, 200.0),
            ],
        ));

        let statement =
            ReportService::account_ledger(&books, account, date(1, 1), date(1, 31)).unwrap();
        assert_eq!(statement.opening, 1000.0);
        assert_eq!(statement.rows.len(), 2);
        assert_eq!(statement.rows[0].amount, -500.0);
        assert_eq!(statement.rows[0].balance, 500.0);
        assert_eq!(statement.rows[1].amount, 200.0);
        assert_eq!(statement.rows[1].balance, 700.0);
        assert_eq!(statement.closing, 700.0);
    }

    #[test]
    fn same_date_vouchers_order_by_number() {
        let (mut books, cash, fees) = school_books();
        let lines = [LineDraft::debit(cash, 10.0), LineDraft::credit(fees, 10.0)];
        VoucherService::post(&mut books, VoucherType::Receipt, date(2, 1), "a", &lines).unwrap();
        VoucherService::post(&mut books, VoucherType::Receipt, date(2, 1), "b", &lines).unwrap();

        let statement =
            ReportService::account_ledger(&books, fees, date(2, 1), date(2, 1)).unwrap();
        let numbers: Vec<Option<u32>> = statement
            .rows
            .iter()
            .map(|row| row.voucher_number)
            .collect();
        assert_eq!(numbers, vec![Some(1), Some(2)]);
    }

    #[test]
    fn day_book_closing_matches_the_balance_engine() {
        let (mut books, _, fees) = school_books();
        EntryService::set_opening_balance(&mut books, date(3, 1), 1000.0, Side::Credit).unwrap();
        EntryService::record_income(&mut books, date(3, 2), fees, 300.0, None).unwrap();
        EntryService::record_expenditure(
            &mut books,
            date(3, 2),
            fees,
            100.0,
            Some("chalk".into()),
        )
        .unwrap();

        let day = ReportService::day_book(&books, date(3, 2));
        assert_eq!(day.opening.amount, 1000.0);
        assert_eq!(day.income.len(), 1);
        assert_eq!(day.expenditure.len(), 1);
        assert_eq!(day.income_total, 300.0);
        assert_eq!(day.expenditure_total, 100.0);
        assert_eq!(day.closing.amount, 1200.0);
        assert_eq!(
            day.closing.signed(),
            balance::closing_balance(&books, date(3, 2)).signed()
        );
        assert_eq!(
            day.closing.signed(),
            balance::opening_balance(&books, date(3, 3)).signed()
        );
    }

    #[test]
    fn trial_balance_balances_for_balanced_vouchers() {
        let (mut books, cash, fees) = school_books();
        for (day, amount) in [(1, 150.0), (2, 90.0)] {
            VoucherService::post(
                &mut books,
                VoucherType::Receipt,
                date(4, day),
                "fees",
                &[
                    LineDraft::debit(cash, amount),
                    LineDraft::credit(fees, amount),
                ],
            )
            .unwrap();
        }

        let report = ReportService::trial_balance(&books);
        assert_eq!(report.total_debits, 240.0);
        assert_eq!(report.total_credits, 240.0);
        report.verify().unwrap();
    }

    #[test]
    fn an_unbalanced_manual_edit_is_detected() {
        let (mut books, cash, fees) = school_books();
        VoucherService::post(
            &mut books,
            VoucherType::Receipt,
            date(5, 1),
            "fees",
            &[
                LineDraft::debit(cash, 150.0),
                LineDraft::credit(fees, 150.0),
            ],
        )
        .unwrap();
        // A raw edit bypassing the validator leaves the ledger lopsided.
        books.vouchers[0].lines[0].amount = 175.0;

        let err = ReportService::trial_balance(&books).verify().unwrap_err();
        assert!(matches!(err, LedgerError::IntegrityFault { .. }));
    }
}
