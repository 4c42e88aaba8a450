//! Branch database operations

use shared::models::{Branch, BranchCreate};
use sqlx::PgPool;

use super::BoxError;

pub async fn list(pool: &PgPool) -> Result<Vec<Branch>, BoxError> {
    let rows = sqlx::query_as::<_, Branch>("SELECT * FROM branches ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn get(pool: &PgPool, id: &str) -> Result<Option<Branch>, BoxError> {
    let row = sqlx::query_as::<_, Branch>("SELECT * FROM branches WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &PgPool, data: &BranchCreate, now: i64) -> Result<Branch, BoxError> {
    let row = sqlx::query_as::<_, Branch>(
        "INSERT INTO branches (id, name, address, phone, is_active, created_at)
         VALUES ($1, $2, $3, $4, TRUE, $5)
         RETURNING *",
    )
    .bind(data.id.trim())
    .bind(data.name.trim())
    .bind(&data.address)
    .bind(&data.phone)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row)
}
