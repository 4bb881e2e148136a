use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Account, AccountCategory, Expenditure, FeePayment, IncomeEntry, JournalEntry,
    OpeningBalanceOverride,
};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// The whole set of account books for one tenant.
///
/// Owns every persisted collection; services mutate it, the balance engine
/// only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Books {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub categories: Vec<AccountCategory>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub opening_overrides: Vec<OpeningBalanceOverride>,
    #[serde(default)]
    pub incomes: Vec<IncomeEntry>,
    #[serde(default)]
    pub expenditures: Vec<Expenditure>,
    #[serde(default)]
    pub fee_payments: Vec<FeePayment>,
    #[serde(default)]
    pub vouchers: Vec<JournalEntry>,
    /// Account treated as the cash box when vouchers feed the day book.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_account_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Books::schema_version_default")]
    pub schema_version: u8,
}

impl Books {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            categories: Vec::new(),
            accounts: Vec::new(),
            opening_overrides: Vec::new(),
            incomes: Vec::new(),
            expenditures: Vec::new(),
            fee_payments: Vec::new(),
            vouchers: Vec::new(),
            cash_account_id: None,
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_category(&mut self, category: AccountCategory) -> Uuid {
        let id = category.id;
        self.categories.push(category);
        self.touch();
        id
    }

    pub fn add_account(&mut self, account: Account) -> Uuid {
        let id = account.id;
        self.accounts.push(account);
        self.touch();
        id
    }

    pub fn add_income(&mut self, entry: IncomeEntry) -> Uuid {
        let id = entry.id;
        self.incomes.push(entry);
        self.touch();
        id
    }

    pub fn add_expenditure(&mut self, entry: Expenditure) -> Uuid {
        let id = entry.id;
        self.expenditures.push(entry);
        self.touch();
        id
    }

    pub fn add_fee_payment(&mut self, payment: FeePayment) -> Uuid {
        let id = payment.id;
        self.fee_payments.push(payment);
        self.touch();
        id
    }

    pub fn add_voucher(&mut self, voucher: JournalEntry) -> Uuid {
        let id = voucher.id;
        self.vouchers.push(voucher);
        self.touch();
        id
    }

    pub fn category(&self, id: Uuid) -> Option<&AccountCategory> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn category_mut(&mut self, id: Uuid) -> Option<&mut AccountCategory> {
        self.categories.iter_mut().find(|category| category.id == id)
    }

    pub fn category_by_name(&self, name: &str) -> Option<&AccountCategory> {
        let normalized = name.trim().to_ascii_lowercase();
        self.categories
            .iter()
            .find(|category| category.name.trim().to_ascii_lowercase() == normalized)
    }

    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn account_mut(&mut self, id: Uuid) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|account| account.id == id)
    }

    pub fn account_by_name(&self, name: &str) -> Option<&Account> {
        let normalized = name.trim().to_ascii_lowercase();
        self.accounts
            .iter()
            .find(|account| account.name.trim().to_ascii_lowercase() == normalized)
    }

    pub fn student_account(&self, student_id: Uuid) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|account| account.student_id == Some(student_id))
    }

    pub fn income(&self, id: Uuid) -> Option<&IncomeEntry> {
        self.incomes.iter().find(|entry| entry.id == id)
    }

    pub fn expenditure(&self, id: Uuid) -> Option<&Expenditure> {
        self.expenditures.iter().find(|entry| entry.id == id)
    }

    pub fn fee_payment(&self, id: Uuid) -> Option<&FeePayment> {
        self.fee_payments.iter().find(|payment| payment.id == id)
    }

    pub fn voucher(&self, id: Uuid) -> Option<&JournalEntry> {
        self.vouchers.iter().find(|voucher| voucher.id == id)
    }

    pub fn remove_income(&mut self, id: Uuid) -> Option<IncomeEntry> {
        let index = self.incomes.iter().position(|entry| entry.id == id)?;
        let removed = self.incomes.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn remove_expenditure(&mut self, id: Uuid) -> Option<Expenditure> {
        let index = self.expenditures.iter().position(|entry| entry.id == id)?;
        let removed = self.expenditures.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn remove_fee_payment(&mut self, id: Uuid) -> Option<FeePayment> {
        let index = self.fee_payments.iter().position(|payment| payment.id == id)?;
        let removed = self.fee_payments.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn remove_voucher(&mut self, id: Uuid) -> Option<JournalEntry> {
        let index = self.vouchers.iter().position(|voucher| voucher.id == id)?;
        let removed = self.vouchers.remove(index);
        self.touch();
        Some(removed)
    }

    /// Next sequential voucher number across the whole ledger.
    pub fn next_voucher_number(&self) -> u32 {
        1 + self
            .vouchers
            .iter()
            .map(|voucher| voucher.voucher_number)
            .max()
            .unwrap_or(0)
    }

    pub fn opening_override(&self, date: NaiveDate) -> Option<&OpeningBalanceOverride> {
        self.opening_overrides
            .iter()
            .find(|anchor| anchor.date == date)
    }

    /// Inserts or replaces the override for its date.
    pub fn set_opening_override(&mut self, anchor: OpeningBalanceOverride) {
        match self
            .opening_overrides
            .iter_mut()
            .find(|existing| existing.date == anchor.date)
        {
            Some(existing) => *existing = anchor,
            None => self.opening_overrides.push(anchor),
        }
        self.touch();
    }

    pub fn clear_opening_override(&mut self, date: NaiveDate) -> bool {
        let before = self.opening_overrides.len();
        self.opening_overrides.retain(|anchor| anchor.date != date);
        let removed = self.opening_overrides.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Side, VoucherLine, VoucherType};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn voucher_numbers_are_one_plus_max() {
        let mut books = Books::new("Numbering");
        assert_eq!(books.next_voucher_number(), 1);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        books.add_voucher(JournalEntry::new(
            date(2),
            VoucherType::Journal,
            7,
            "migrated",
            vec![VoucherLine::debit(a, 10.0), VoucherLine::credit(b, 10.0)],
        ));
        assert_eq!(books.next_voucher_number(), 8);
    }

    #[test]
    fn voucher_numbers_do_not_reuse_gaps_left_by_deletes() {
        let mut books = Books::new("Numbering");
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let first = books.add_voucher(JournalEntry::new(
            date(2),
            VoucherType::Journal,
            1,
            "one",
            vec![VoucherLine::debit(a, 10.0), VoucherLine::credit(b, 10.0)],
        ));
        books.add_voucher(JournalEntry::new(
            date(3),
            VoucherType::Journal,
            2,
            "two",
            vec![VoucherLine::debit(a, 5.0), VoucherLine::credit(b, 5.0)],
        ));
        books.remove_voucher(first);
        assert_eq!(books.next_voucher_number(), 3);
    }

    #[test]
    fn opening_override_upserts_by_date() {
        let mut books = Books::new("Anchors");
        books.set_opening_override(OpeningBalanceOverride::new(date(5), 100.0, Side::Credit));
        books.set_opening_override(OpeningBalanceOverride::new(date(5), 250.0, Side::Debit));
        assert_eq!(books.opening_overrides.len(), 1);
        let anchor = books.opening_override(date(5)).unwrap();
        assert_eq!(anchor.amount, 250.0);
        assert_eq!(anchor.side, Side::Debit);
        assert!(books.clear_opening_override(date(5)));
        assert!(!books.clear_opening_override(date(5)));
    }
}
