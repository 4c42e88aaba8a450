//! motocare-server: branch POS, inventory and service-ticket backend
//!
//! - Parts catalogue with per-branch stock and cost
//! - Counter sales through the `sale_create_atomic` procedure
//! - Work orders (service tickets) with deposits recorded in the cash book
//! - Daily revenue reports and CSV export
//! - Live notifications over WebSocket
//!
//! The `motocare-admin` binary reuses the same repositories for one-off jobs.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod live;
pub mod logger;
pub mod services;
pub mod state;
pub mod util;

pub use config::Config;
pub use state::AppState;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
