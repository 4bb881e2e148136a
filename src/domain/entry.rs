//! Simple-model postings: dated income, expenditure, and fee payments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// A dated receipt of money against an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomeEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub account_id: Uuid,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl IncomeEntry {
    pub fn new(date: NaiveDate, account_id: Uuid, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            account_id,
            amount,
            remarks: None,
        }
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }
}

/// A dated outflow of money against an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expenditure {
    pub id: Uuid,
    pub date: NaiveDate,
    pub account_id: Uuid,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl Expenditure {
    pub fn new(date: NaiveDate, account_id: Uuid, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            account_id,
            amount,
            remarks: None,
        }
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }
}

/// A fee collected from a student, counted as income in the cash book.
///
/// When the books designate a cash account, posting a fee also posts the
/// matching receipt voucher; `voucher_id` keeps the two in lockstep so the
/// voucher cannot outlive the payment or be removed on its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeePayment {
    pub id: Uuid,
    pub date: NaiveDate,
    pub account_id: Uuid,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher_id: Option<Uuid>,
}

impl FeePayment {
    pub fn new(date: NaiveDate, account_id: Uuid, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            account_id,
            amount,
            remarks: None,
            voucher_id: None,
        }
    }
}

impl Identifiable for IncomeEntry {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Identifiable for Expenditure {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Identifiable for FeePayment {
    fn id(&self) -> Uuid {
        self.id
    }
}
