pub mod account_service;
pub mod category_service;
pub mod enrollment_service;
pub mod entry_service;
pub mod report_service;
pub mod voucher_service;

pub use account_service::AccountService;
pub use category_service::CategoryService;
pub use enrollment_service::EnrollmentService;
pub use entry_service::EntryService;
pub use report_service::ReportService;
pub use voucher_service::VoucherService;

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, LedgerError>;
