//! Business operations spanning several repositories
//!
//! Pure planning/validation functions sit next to the async operations that
//! run them, so the rules are testable without a database.

pub mod backfill;
pub mod diagnostics;
pub mod import;
pub mod notify;
pub mod sale;
pub mod work_order;
