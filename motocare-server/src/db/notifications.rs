//! Notification database operations

use shared::models::{Notification, NotificationCreate};
use sqlx::PgPool;

use super::BoxError;

// ── Read ──

/// Notifications visible to `user_id` working in `branch_id`, newest first
pub async fn list_for(
    pool: &PgPool,
    user_id: i64,
    branch_id: &str,
    unread_only: bool,
    limit: Option<i64>,
) -> Result<Vec<Notification>, BoxError> {
    let rows = sqlx::query_as::<_, Notification>(
        "SELECT * FROM notifications
         WHERE (branch_id IS NULL OR branch_id = $2)
           AND (recipient_id IS NULL OR recipient_id = $1)
           AND (NOT $3 OR NOT is_read)
         ORDER BY created_at DESC
         LIMIT $4",
    )
    .bind(user_id)
    .bind(branch_id)
    .bind(unread_only)
    .bind(super::page_limit(limit))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ── Write ──

pub async fn create(
    pool: &PgPool,
    id: i64,
    data: &NotificationCreate,
    now: i64,
) -> Result<Notification, BoxError> {
    let row = sqlx::query_as::<_, Notification>(
        "INSERT INTO notifications (id, branch_id, recipient_id, kind, title, message, is_read, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7)
         RETURNING *",
    )
    .bind(id)
    .bind(&data.branch_id)
    .bind(data.recipient_id)
    .bind(data.kind.as_str())
    .bind(&data.title)
    .bind(&data.message)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Mark one notification read if the user can see it
pub async fn mark_read(
    pool: &PgPool,
    id: i64,
    user_id: i64,
    branch_id: &str,
) -> Result<bool, BoxError> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = TRUE
         WHERE id = $1
           AND (branch_id IS NULL OR branch_id = $3)
           AND (recipient_id IS NULL OR recipient_id = $2)",
    )
    .bind(id)
    .bind(user_id)
    .bind(branch_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Mark everything visible to the user read; returns the updated count
pub async fn mark_all_read(pool: &PgPool, user_id: i64, branch_id: &str) -> Result<u64, BoxError> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = TRUE
         WHERE NOT is_read
           AND (branch_id IS NULL OR branch_id = $2)
           AND (recipient_id IS NULL OR recipient_id = $1)",
    )
    .bind(user_id)
    .bind(branch_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
