//! Double-entry vouchers and their line items.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// The bookkeeping class of a voucher.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VoucherType {
    Payment,
    Receipt,
    Journal,
    Contra,
}

impl fmt::Display for VoucherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VoucherType::Payment => "Payment",
            VoucherType::Receipt => "Receipt",
            VoucherType::Journal => "Journal",
            VoucherType::Contra => "Contra",
        };
        f.write_str(label)
    }
}

/// One debit or credit movement inside a voucher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoucherLine {
    pub account_id: Uuid,
    pub side: Side,
    pub amount: f64,
}

impl VoucherLine {
    pub fn debit(account_id: Uuid, amount: f64) -> Self {
        Self {
            account_id,
            side: Side::Debit,
            amount,
        }
    }

    pub fn credit(account_id: Uuid, amount: f64) -> Self {
        Self {
            account_id,
            side: Side::Credit,
            amount,
        }
    }
}

/// A balanced set of debit/credit lines recorded under one sequential number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub voucher_type: VoucherType,
    pub voucher_number: u32,
    pub narration: String,
    pub lines: Vec<VoucherLine>,
}

impl JournalEntry {
    pub fn new(
        date: NaiveDate,
        voucher_type: VoucherType,
        voucher_number: u32,
        narration: impl Into<String>,
        lines: Vec<VoucherLine>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            voucher_type,
            voucher_number,
            narration: narration.into(),
            lines,
        }
    }

    pub fn total_debit(&self) -> f64 {
        self.lines
            .iter()
            .filter(|line| line.side == Side::Debit)
            .map(|line| line.amount)
            .sum()
    }

    pub fn total_credit(&self) -> f64 {
        self.lines
            .iter()
            .filter(|line| line.side == Side::Credit)
            .map(|line| line.amount)
            .sum()
    }

    /// Lines touching `account_id`.
    pub fn lines_for(&self, account_id: Uuid) -> impl Iterator<Item = &VoucherLine> {
        self.lines
            .iter()
            .filter(move |line| line.account_id == account_id)
    }
}

impl Identifiable for JournalEntry {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for JournalEntry {
    fn display_label(&self) -> String {
        format!("{} #{}", self.voucher_type, self.voucher_number)
    }
}

/// Raw voucher input as captured from the operator, one row per line.
///
/// A row may carry a debit amount or a credit amount; a row with both or
/// neither set is unusable and dropped before totals are taken.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LineDraft {
    pub account_id: Option<Uuid>,
    #[serde(default)]
    pub debit: f64,
    #[serde(default)]
    pub credit: f64,
}

impl LineDraft {
    pub fn debit(account_id: Uuid, amount: f64) -> Self {
        Self {
            account_id: Some(account_id),
            debit: amount,
            credit: 0.0,
        }
    }

    pub fn credit(account_id: Uuid, amount: f64) -> Self {
        Self {
            account_id: Some(account_id),
            debit: 0.0,
            credit: amount,
        }
    }

    /// The single side this row expresses, or `None` when the row is
    /// unusable (no account, both sides set, or neither).
    pub fn resolve(&self) -> Option<(Uuid, Side, f64)> {
        let account_id = self.account_id?;
        match (self.debit > 0.0, self.credit > 0.0) {
            (true, false) => Some((account_id, Side::Debit, self.debit)),
            (false, true) => Some((account_id, Side::Credit, self.credit)),
            _ => None,
        }
    }
}
