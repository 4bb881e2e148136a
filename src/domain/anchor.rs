//! Operator-declared opening balances that pin the cash book to a date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::Side;

/// A trusted opening balance for the start of a specific day.
///
/// The date doubles as the identity: at most one override exists per date,
/// and it beats whatever the replay would otherwise derive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OpeningBalanceOverride {
    pub date: NaiveDate,
    pub amount: f64,
    pub side: Side,
}

impl OpeningBalanceOverride {
    pub fn new(date: NaiveDate, amount: f64, side: Side) -> Self {
        Self { date, amount, side }
    }

    pub fn signed(&self) -> f64 {
        self.side.signed(self.amount)
    }
}
