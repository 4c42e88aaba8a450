//! Application state

use sqlx::PgPool;

use crate::BoxError;
use crate::auth::rate_limit::RateLimiter;
use crate::config::Config;
use crate::live::NotificationHub;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// JWT secret for staff authentication
    pub jwt_secret: String,
    /// Rate limiter for the login route
    pub rate_limiter: RateLimiter,
    /// Live notification fan-out
    pub hub: NotificationHub,
    /// Fixed offset used to cut report days
    pub report_utc_offset_minutes: i32,
    /// Emit low-stock notifications after sales
    pub low_stock_notify: bool,
}

impl AppState {
    /// Connect, migrate and build the state
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = crate::db::connect(config).await?;
        crate::db::migrate(&pool).await?;
        Ok(Self::with_pool(pool, config))
    }

    /// Build the state around an existing pool
    pub fn with_pool(pool: PgPool, config: &Config) -> Self {
        Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            rate_limiter: RateLimiter::new(),
            hub: NotificationHub::new(),
            report_utc_offset_minutes: config.report_utc_offset_minutes,
            low_stock_notify: config.low_stock_notify,
        }
    }
}
