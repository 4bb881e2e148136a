//! The books aggregate: every persisted collection under one roof.

pub mod books;

pub use books::{Books, CURRENT_SCHEMA_VERSION};
