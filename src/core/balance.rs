//! Derives cash-book balances from opening anchors plus replayed postings.
//!
//! Everything here is a pure function over [`Books`]: balances are re-derived
//! from current store contents on every call, so postings inserted, edited,
//! or removed for past days are always reflected.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Side;
use crate::ledger::Books;

/// A cash-book balance: credit balances are held funds, debit balances owed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Balance {
    pub amount: f64,
    pub side: Side,
}

impl Balance {
    pub fn new(amount: f64, side: Side) -> Self {
        Self { amount, side }
    }

    pub fn zero() -> Self {
        Self {
            amount: 0.0,
            side: Side::Credit,
        }
    }

    pub fn from_signed(value: f64) -> Self {
        Self {
            amount: value.abs(),
            side: Side::of_signed(value),
        }
    }

    pub fn signed(&self) -> f64 {
        self.side.signed(self.amount)
    }
}

/// Money moved through the cash book on a single day.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DayFlow {
    pub inflow: f64,
    pub outflow: f64,
}

impl DayFlow {
    pub fn net(&self) -> f64 {
        self.inflow - self.outflow
    }
}

/// Buckets every posting into per-day cash flows in one pass.
///
/// Income and fee payments count as inflow, expenditure as outflow. When a
/// cash account is designated, voucher lines on it count too (debit side in,
/// credit side out); fee payments already represented by a linked voucher are
/// skipped so the movement is not counted twice. Postings whose account no
/// longer resolves are orphans and stay out of the books.
pub fn day_flows(books: &Books) -> BTreeMap<NaiveDate, DayFlow> {
    let known: HashSet<Uuid> = books.accounts.iter().map(|account| account.id).collect();
    let cash = books
        .cash_account_id
        .filter(|id| known.contains(id));

    let mut flows: BTreeMap<NaiveDate, DayFlow> = BTreeMap::new();
    for entry in &books.incomes {
        if !known.contains(&entry.account_id) {
            continue;
        }
        flows.entry(entry.date).or_default().inflow += entry.amount;
    }
    for payment in &books.fee_payments {
        if !known.contains(&payment.account_id) {
            continue;
        }
        if cash.is_some() && payment.voucher_id.is_some() {
            continue;
        }
        flows.entry(payment.date).or_default().inflow += payment.amount;
    }
    for entry in &books.expenditures {
        if !known.contains(&entry.account_id) {
            continue;
        }
        flows.entry(entry.date).or_default().outflow += entry.amount;
    }
    if let Some(cash) = cash {
        for voucher in &books.vouchers {
            for line in voucher.lines_for(cash) {
                let flow = flows.entry(voucher.date).or_default();
                match line.side {
                    Side::Debit => flow.inflow += line.amount,
                    Side::Credit => flow.outflow += line.amount,
                }
            }
        }
    }
    flows
}

/// Cash flow for a single date.
pub fn day_flow(books: &Books, date: NaiveDate) -> DayFlow {
    day_flows(books).get(&date).copied().unwrap_or_default()
}

/// Balance in force at the start of `date`.
///
/// An override dated exactly `date` is returned verbatim. Otherwise the
/// nearest earlier override anchors the replay; it subsumes all history
/// before its day, so the walk starts there. With no override at all the
/// anchor is a zero balance at the earliest posting date. An anchor states
/// the balance at the start of its day, so that day's own postings roll
/// forward into later openings and `closing(d)` always equals
/// `opening(d + 1)`.
pub fn opening_balance(books: &Books, date: NaiveDate) -> Balance {
    if let Some(anchor) = books.opening_override(date) {
        return Balance::new(anchor.amount, anchor.side);
    }

    let flows = day_flows(books);
    let anchor = books
        .opening_overrides
        .iter()
        .filter(|anchor| anchor.date < date)
        .max_by_key(|anchor| anchor.date);

    let (start, seed) = match anchor {
        Some(anchor) => (anchor.date, anchor.signed()),
        None => match flows.keys().next().copied() {
            Some(earliest) if earliest < date => (earliest, 0.0),
            _ => return Balance::zero(),
        },
    };

    let running = flows
        .range(start..date)
        .fold(seed, |acc, (_, flow)| acc + flow.net());
    Balance::from_signed(running)
}

/// Balance at the end of `date`: the opening plus that day's net flow.
pub fn closing_balance(books: &Books, date: NaiveDate) -> Balance {
    let opening = opening_balance(books, date);
    Balance::from_signed(opening.signed() + day_flow(books, date).net())
}
