//! Shared traits and primitives for ledger entities.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tolerance for comparing currency amounts held as `f64`.
pub const AMOUNT_EPSILON: f64 = 0.01;

/// Exposes a stable identifier for entities stored in the books.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// The side of the books a monetary amount falls on.
///
/// Cash-book convention: credit balances are held funds (positive), debit
/// balances are owed funds (negative).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Side {
    Debit,
    Credit,
}

impl Side {
    /// Applies the cash-book sign convention to `amount`.
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            Side::Credit => amount,
            Side::Debit => -amount,
        }
    }

    /// Side of a signed value under the same convention.
    pub fn of_signed(value: f64) -> Side {
        if value >= 0.0 {
            Side::Credit
        } else {
            Side::Debit
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Debit => Side::Credit,
            Side::Credit => Side::Debit,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Side::Debit => "Debit",
            Side::Credit => "Credit",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_follows_cash_book_convention() {
        assert_eq!(Side::Credit.signed(40.0), 40.0);
        assert_eq!(Side::Debit.signed(40.0), -40.0);
    }

    #[test]
    fn of_signed_treats_zero_as_credit() {
        assert_eq!(Side::of_signed(0.0), Side::Credit);
        assert_eq!(Side::of_signed(-0.5), Side::Debit);
    }
}
