//! Category operations
//!
//! Categories are the distinct `parts.category` values; renaming or
//! deleting one is a single conditional UPDATE over the parts.

use serde::Serialize;
use sqlx::PgPool;

use super::BoxError;

// ── Read types ──

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategorySummary {
    pub name: String,
    pub part_count: i64,
}

// ── Read ──

pub async fn list(pool: &PgPool) -> Result<Vec<CategorySummary>, BoxError> {
    let rows = sqlx::query_as::<_, CategorySummary>(
        "SELECT category AS name, COUNT(*) AS part_count
         FROM parts
         WHERE category IS NOT NULL
         GROUP BY category
         ORDER BY category",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ── Write ──

/// Move every part of `old_name` to `new_name`; returns the updated count
pub async fn rename_category(
    pool: &PgPool,
    old_name: &str,
    new_name: &str,
    now: i64,
) -> Result<u64, BoxError> {
    let result = sqlx::query(
        "UPDATE parts SET category = $2, updated_at = $3
         WHERE category = $1 AND category IS DISTINCT FROM $2",
    )
    .bind(old_name)
    .bind(new_name)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Clear the category on its parts (the parts stay); returns the updated count
pub async fn delete_category(pool: &PgPool, name: &str, now: i64) -> Result<u64, BoxError> {
    let result =
        sqlx::query("UPDATE parts SET category = NULL, updated_at = $2 WHERE category = $1")
            .bind(name)
            .bind(now)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}
