//! Cash book database operations

use serde::Deserialize;
use shared::models::{CashKind, CashSummary, CashTransaction};
use sqlx::{PgExecutor, PgPool};

use super::BoxError;

// ── Read types ──

/// Period filter, epoch millis (`from` inclusive, `to` exclusive)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CashQuery {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub kind: Option<CashKind>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ── Read ──

pub async fn list(
    pool: &PgPool,
    branch_id: &str,
    query: &CashQuery,
) -> Result<Vec<CashTransaction>, BoxError> {
    let rows = sqlx::query_as::<_, CashTransaction>(
        "SELECT * FROM cash_transactions
         WHERE branch_id = $1
           AND ($2::BIGINT IS NULL OR occurred_at >= $2)
           AND ($3::BIGINT IS NULL OR occurred_at < $3)
           AND ($4::TEXT IS NULL OR kind = $4)
         ORDER BY occurred_at DESC, id DESC
         LIMIT $5 OFFSET $6",
    )
    .bind(branch_id)
    .bind(query.from)
    .bind(query.to)
    .bind(query.kind.map(|k| k.as_str()))
    .bind(super::page_limit(query.limit))
    .bind(query.offset.unwrap_or(0).max(0))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Every entry of a branch in `[from, to)` (no paging)
pub async fn list_range(
    pool: &PgPool,
    branch_id: &str,
    from: Option<i64>,
    to: Option<i64>,
) -> Result<Vec<CashTransaction>, BoxError> {
    let rows = sqlx::query_as::<_, CashTransaction>(
        "SELECT * FROM cash_transactions
         WHERE branch_id = $1
           AND ($2::BIGINT IS NULL OR occurred_at >= $2)
           AND ($3::BIGINT IS NULL OR occurred_at < $3)
         ORDER BY occurred_at",
    )
    .bind(branch_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Income/expense/balance per payment method over a period
pub async fn summary(
    pool: &PgPool,
    branch_id: &str,
    from: Option<i64>,
    to: Option<i64>,
) -> Result<CashSummary, BoxError> {
    let rows = list_range(pool, branch_id, from, to).await?;
    Ok(CashSummary::from_transactions(&rows))
}

/// References matching any of the LIKE `patterns`, across all branches
pub async fn list_references(pool: &PgPool, patterns: &[&str]) -> Result<Vec<String>, BoxError> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT DISTINCT reference FROM cash_transactions
         WHERE reference LIKE ANY($1)",
    )
    .bind(patterns)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(r,)| r).collect())
}

// ── CRUD ──

/// Insert a cash entry on any executor (pool or open transaction)
pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    cash: &CashTransaction,
) -> Result<(), BoxError> {
    sqlx::query(
        "INSERT INTO cash_transactions (
            id, branch_id, kind, category, amount, payment_method,
            reference, description, recorded_by, occurred_at, created_at
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(cash.id)
    .bind(&cash.branch_id)
    .bind(cash.kind.as_str())
    .bind(&cash.category)
    .bind(cash.amount)
    .bind(cash.payment_method.as_str())
    .bind(&cash.reference)
    .bind(&cash.description)
    .bind(cash.recorded_by)
    .bind(cash.occurred_at)
    .bind(cash.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn create(pool: &PgPool, cash: &CashTransaction) -> Result<CashTransaction, BoxError> {
    insert(pool, cash).await?;
    Ok(cash.clone())
}

pub async fn delete(pool: &PgPool, id: i64, branch_id: &str) -> Result<bool, BoxError> {
    let result = sqlx::query("DELETE FROM cash_transactions WHERE id = $1 AND branch_id = $2")
        .bind(id)
        .bind(branch_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
