use thiserror::Error;
use uuid::Uuid;

/// Error type that captures ledger validation and persistence failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Voucher is unbalanced: debit {debit:.2} vs credit {credit:.2}")]
    Unbalanced { debit: f64, credit: f64 },
    #[error("Voucher needs at least two usable lines")]
    TooFewLines,
    #[error("Category is still in use: {0}")]
    CategoryInUse(String),
    #[error("Cannot modify system-managed record: {0}")]
    Immutable(String),
    #[error("Voucher #{0} is linked to a fee payment")]
    VoucherLinked(u32),
    #[error("Posting references unknown account {0}")]
    UnresolvedAccount(Uuid),
    #[error("Trial balance out of balance: debits {debits:.2} vs credits {credits:.2}")]
    IntegrityFault { debits: f64, credits: f64 },
    #[error("Validation failed: {0}")]
    Validation(String),
}
