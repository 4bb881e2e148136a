pub mod account;
pub mod anchor;
pub mod category;
pub mod common;
pub mod entry;
pub mod voucher;

pub use account::Account;
pub use anchor::OpeningBalanceOverride;
pub use category::AccountCategory;
pub use common::{Displayable, Identifiable, NamedEntity, Side, AMOUNT_EPSILON};
pub use entry::{Expenditure, FeePayment, IncomeEntry};
pub use voucher::{JournalEntry, LineDraft, VoucherLine, VoucherType};
