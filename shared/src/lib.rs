//! Shared types for MotoCare
//!
//! Domain models, the unified error system, money arithmetic and reporting
//! helpers used by the server and its admin tooling.

pub mod error;
pub mod models;
pub mod money;
pub mod report;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
