//! Sale database operations
//!
//! Writes go through the `sale_create_atomic` / `sale_delete_atomic`
//! procedures inside a caller-scoped transaction.

use serde::Deserialize;
use shared::models::{Sale, SaleCreated, StockLevel};
use sqlx::PgPool;
use sqlx::types::Json;

use super::BoxError;
use super::scope::{Actor, begin_scoped};

const SELECT_SALE: &str = "SELECT s.*, p.full_name AS created_by_name
     FROM sales s
     LEFT JOIN profiles p ON p.id = s.created_by";

// ── Read types ──

/// Date-range filter, epoch millis (`from` inclusive, `to` exclusive)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleQuery {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CreateResult {
    sale_id: i64,
    #[serde(default)]
    stock: Vec<StockLevel>,
}

/// Result of `sale_delete_atomic`
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct SaleDeleted {
    pub sale_id: i64,
    #[serde(default)]
    pub restored: Vec<RestoredStock>,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct RestoredStock {
    pub part_id: i64,
    pub quantity: i64,
}

// ── Read ──

pub async fn list(pool: &PgPool, branch_id: &str, query: &SaleQuery) -> Result<Vec<Sale>, BoxError> {
    let sql = format!(
        "{SELECT_SALE}
         WHERE s.branch_id = $1
           AND ($2::BIGINT IS NULL OR s.created_at >= $2)
           AND ($3::BIGINT IS NULL OR s.created_at < $3)
         ORDER BY s.created_at DESC
         LIMIT $4 OFFSET $5"
    );
    let rows = sqlx::query_as::<_, Sale>(&sql)
        .bind(branch_id)
        .bind(query.from)
        .bind(query.to)
        .bind(super::page_limit(query.limit))
        .bind(query.offset.unwrap_or(0).max(0))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Every sale of a branch in `[from, to)`, oldest first (reports, export)
pub async fn list_range(
    pool: &PgPool,
    branch_id: &str,
    from: i64,
    to: i64,
) -> Result<Vec<Sale>, BoxError> {
    let sql = format!(
        "{SELECT_SALE}
         WHERE s.branch_id = $1 AND s.created_at >= $2 AND s.created_at < $3
         ORDER BY s.created_at"
    );
    let rows = sqlx::query_as::<_, Sale>(&sql)
        .bind(branch_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn get(pool: &PgPool, id: i64, branch_id: &str) -> Result<Option<Sale>, BoxError> {
    let sql = format!("{SELECT_SALE} WHERE s.id = $1 AND s.branch_id = $2");
    let row = sqlx::query_as::<_, Sale>(&sql)
        .bind(id)
        .bind(branch_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

// ── Write ──

/// Run `sale_create_atomic` for the actor and return the stored sale.
///
/// `payload` is the procedure's JSON argument; its `branch_id` must be the
/// actor's branch or the procedure refuses it.
pub async fn create_atomic(
    pool: &PgPool,
    actor: &Actor<'_>,
    payload: &serde_json::Value,
) -> Result<SaleCreated, BoxError> {
    let mut tx = begin_scoped(pool, actor).await?;

    let (Json(result),): (Json<CreateResult>,) =
        sqlx::query_as("SELECT sale_create_atomic($1)")
            .bind(Json(payload))
            .fetch_one(&mut *tx)
            .await?;

    let sql = format!("{SELECT_SALE} WHERE s.id = $1");
    let sale = sqlx::query_as::<_, Sale>(&sql)
        .bind(result.sale_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(SaleCreated {
        sale,
        stock: result.stock,
    })
}

/// Run `sale_delete_atomic`: restores stock and drops the linked cash entry
pub async fn delete(pool: &PgPool, actor: &Actor<'_>, id: i64) -> Result<SaleDeleted, BoxError> {
    let mut tx = begin_scoped(pool, actor).await?;
    let (Json(result),): (Json<SaleDeleted>,) = sqlx::query_as("SELECT sale_delete_atomic($1)")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}
