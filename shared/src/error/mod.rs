//! Unified error system for MotoCare
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain (code range)
//! - [`ErrorKind`]: The small fixed set the client reacts to
//!   (`validation`, `backend`, `network`)
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: Tagged `{ ok, data | error }` response envelope
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::with_message(ErrorCode::InsufficientStock, "Only 2 left")
//!     .with_detail("part_id", 42);
//!
//! let response = ApiResponse::<()>::failure(&err);
//! assert!(!response.ok);
//! ```

mod category;
mod codes;
mod types;

pub use category::{ErrorCategory, ErrorKind};
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult, ErrorBody};
