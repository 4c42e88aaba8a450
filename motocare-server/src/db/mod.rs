//! Database access layer
//!
//! Free async functions over `&PgPool`, one module per table.

pub mod branches;
pub mod cash_transactions;
pub mod categories;
pub mod customers;
pub mod notifications;
pub mod parts;
pub mod profiles;
pub mod sales;
pub mod scope;
pub mod work_orders;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;

pub type BoxError = crate::BoxError;

/// Embedded schema migrations
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Default page size for list endpoints
pub const DEFAULT_LIMIT: i64 = 50;
/// Upper bound for page sizes
pub const MAX_LIMIT: i64 = 500;

/// Clamp a requested page size
pub fn page_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Open the connection pool
pub async fn connect(config: &Config) -> Result<PgPool, BoxError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

/// Apply pending migrations
pub async fn migrate(pool: &PgPool) -> Result<(), BoxError> {
    MIGRATOR.run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// `%term%` pattern for ILIKE searches, with LIKE wildcards escaped
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_clamped() {
        assert_eq!(page_limit(None), DEFAULT_LIMIT);
        assert_eq!(page_limit(Some(0)), 1);
        assert_eq!(page_limit(Some(10_000)), MAX_LIMIT);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" brake "), "%brake%");
        assert_eq!(like_pattern("10%_off"), "%10\\%\\_off%");
    }
}
