//! Ledger accounts, both operator-created and student-linked.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Represents a financial account tracked within the books.
///
/// Student-linked accounts are owned by the enrollment lifecycle and cannot
/// be edited or removed independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    #[serde(default)]
    pub is_student_account: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_balance_type: Option<Side>,
}

impl Account {
    pub fn new(name: impl Into<String>, category_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category_id,
            is_student_account: false,
            student_id: None,
            opening_balance: None,
            opening_balance_type: None,
        }
    }

    /// Creates the account that mirrors an enrolled student.
    pub fn for_student(name: impl Into<String>, category_id: Uuid, student_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category_id,
            is_student_account: true,
            student_id: Some(student_id),
            opening_balance: None,
            opening_balance_type: None,
        }
    }

    pub fn with_opening_balance(mut self, amount: f64, side: Side) -> Self {
        self.opening_balance = Some(amount);
        self.opening_balance_type = Some(side);
        self
    }

    /// The account's fixed opening balance under the cash-book sign
    /// convention; zero when none was recorded.
    pub fn signed_opening(&self) -> f64 {
        match (self.opening_balance, self.opening_balance_type) {
            (Some(amount), Some(side)) => side.signed(amount),
            (Some(amount), None) => amount,
            _ => 0.0,
        }
    }
}

impl Identifiable for Account {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Account {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Account {
    fn display_label(&self) -> String {
        if self.is_student_account {
            format!("{} (student)", self.name)
        } else {
            self.name.clone()
        }
    }
}
