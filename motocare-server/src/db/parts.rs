//! Part (inventory) database operations
//!
//! `stock` and `cost_price` are JSONB maps keyed by branch id.

use serde::Deserialize;
use shared::models::{BranchMap, NewPart, Part, PartUpdate};
use sqlx::PgPool;
use sqlx::types::Json;

use super::BoxError;

// ── Read types ──

/// List filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartQuery {
    /// Matches name or SKU
    pub search: Option<String>,
    pub category: Option<String>,
    /// Only parts at or below `min_stock` in the viewing branch
    #[serde(default)]
    pub low_stock_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Branch entries an import writes over an existing part.
///
/// Kept apart from the insert defaults so a re-import without stock figures
/// does not zero the branch's quantity.
#[derive(Debug, Clone, Default)]
pub struct BranchMerge {
    pub cost_price: BranchMap<f64>,
    pub stock: BranchMap<i64>,
}

/// Outcome of a manual stock correction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAdjustment {
    /// New quantity at the branch
    Adjusted(i64),
    NotFound,
    /// The correction would leave the branch with this many
    BelowZero(i64),
    /// The new quantity does not fit in an i64
    OutOfRange,
}

impl StockAdjustment {
    /// Outcome of adding `delta` to `current`, before anything is written
    pub fn compute(current: i64, delta: i64) -> Self {
        match current.checked_add(delta) {
            Some(next) if next < 0 => Self::BelowZero(next),
            Some(next) => Self::Adjusted(next),
            None => Self::OutOfRange,
        }
    }
}

// ── Read ──

pub async fn list(pool: &PgPool, branch_id: &str, query: &PartQuery) -> Result<Vec<Part>, BoxError> {
    let search = query.search.as_deref().map(super::like_pattern);
    let rows = sqlx::query_as::<_, Part>(
        "SELECT * FROM parts
         WHERE ($2::TEXT IS NULL OR name ILIKE $2 OR sku ILIKE $2)
           AND ($3::TEXT IS NULL OR category = $3)
           AND (NOT $4 OR COALESCE((stock->>$1)::BIGINT, 0) <= min_stock)
         ORDER BY name, id
         LIMIT $5 OFFSET $6",
    )
    .bind(branch_id)
    .bind(search)
    .bind(query.category.as_deref())
    .bind(query.low_stock_only)
    .bind(super::page_limit(query.limit))
    .bind(query.offset.unwrap_or(0).max(0))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Part>, BoxError> {
    let row = sqlx::query_as::<_, Part>("SELECT * FROM parts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_sku(pool: &PgPool, sku: &str) -> Result<Option<Part>, BoxError> {
    let row = sqlx::query_as::<_, Part>("SELECT * FROM parts WHERE sku = $1")
        .bind(sku.trim())
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

// ── CRUD ──

pub async fn create(pool: &PgPool, id: i64, part: &NewPart, now: i64) -> Result<Part, BoxError> {
    let row = sqlx::query_as::<_, Part>(
        "INSERT INTO parts (
            id, sku, name, category, unit, retail_price, wholesale_price,
            cost_price, stock, min_stock, description, created_at, updated_at
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
         RETURNING *",
    )
    .bind(id)
    .bind(&part.sku)
    .bind(&part.name)
    .bind(&part.category)
    .bind(&part.unit)
    .bind(part.retail_price)
    .bind(part.wholesale_price)
    .bind(Json(&part.cost_price))
    .bind(Json(&part.stock))
    .bind(part.min_stock)
    .bind(&part.description)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Partial update; `cost_price` entries are merged per branch
pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &PartUpdate,
    now: i64,
) -> Result<Option<Part>, BoxError> {
    let category = data
        .category
        .as_deref()
        .map(|c| shared::util::normalize_category(c).unwrap_or_default());
    let row = sqlx::query_as::<_, Part>(
        "UPDATE parts SET
            sku = COALESCE($2, sku),
            name = COALESCE($3, name),
            category = CASE WHEN $4::TEXT IS NULL THEN category ELSE NULLIF($4, '') END,
            unit = COALESCE($5, unit),
            retail_price = COALESCE($6, retail_price),
            wholesale_price = COALESCE($7, wholesale_price),
            cost_price = cost_price || COALESCE($8, '{}'::JSONB),
            min_stock = COALESCE($9, min_stock),
            description = COALESCE($10, description),
            updated_at = $11
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(data.sku.as_deref().map(str::trim))
    .bind(data.name.as_deref().map(str::trim))
    .bind(category)
    .bind(data.unit.as_deref())
    .bind(data.retail_price)
    .bind(data.wholesale_price)
    .bind(data.cost_price.as_ref().map(Json))
    .bind(data.min_stock)
    .bind(data.description.as_deref())
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, BoxError> {
    let result = sqlx::query("DELETE FROM parts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Add `delta` to the branch's stock; refuses to go below zero
pub async fn adjust_stock(
    pool: &PgPool,
    id: i64,
    branch_id: &str,
    delta: i64,
    now: i64,
) -> Result<StockAdjustment, BoxError> {
    let mut tx = pool.begin().await?;

    let current: Option<(Json<BranchMap<i64>>,)> =
        sqlx::query_as("SELECT stock FROM parts WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some((Json(stock),)) = current else {
        return Ok(StockAdjustment::NotFound);
    };

    let current = stock.get(branch_id).copied().unwrap_or(0);
    let next = match StockAdjustment::compute(current, delta) {
        StockAdjustment::Adjusted(next) => next,
        refused => return Ok(refused),
    };

    sqlx::query(
        "UPDATE parts
         SET stock = jsonb_set(stock, ARRAY[$2], to_jsonb($3::BIGINT), true), updated_at = $4
         WHERE id = $1",
    )
    .bind(id)
    .bind(branch_id)
    .bind(next)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(StockAdjustment::Adjusted(next))
}

/// Insert a part or refresh the existing one with the same SKU.
///
/// On conflict only the entries in `merge` are written into the branch maps,
/// so other branches keep theirs. Returns `true` when a new row was created.
pub async fn upsert_by_sku(
    pool: &PgPool,
    id: i64,
    part: &NewPart,
    merge: &BranchMerge,
    now: i64,
) -> Result<bool, BoxError> {
    let (inserted,): (bool,) = sqlx::query_as(
        "INSERT INTO parts (
            id, sku, name, category, unit, retail_price, wholesale_price,
            cost_price, stock, min_stock, description, created_at, updated_at
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
         ON CONFLICT (sku) DO UPDATE SET
            name = EXCLUDED.name,
            category = COALESCE(EXCLUDED.category, parts.category),
            unit = EXCLUDED.unit,
            retail_price = EXCLUDED.retail_price,
            wholesale_price = COALESCE(EXCLUDED.wholesale_price, parts.wholesale_price),
            cost_price = parts.cost_price || $13,
            stock = parts.stock || $14,
            min_stock = EXCLUDED.min_stock,
            description = COALESCE(EXCLUDED.description, parts.description),
            updated_at = EXCLUDED.updated_at
         RETURNING (xmax = 0)",
    )
    .bind(id)
    .bind(&part.sku)
    .bind(&part.name)
    .bind(&part.category)
    .bind(&part.unit)
    .bind(part.retail_price)
    .bind(part.wholesale_price)
    .bind(Json(&part.cost_price))
    .bind(Json(&part.stock))
    .bind(part.min_stock)
    .bind(&part.description)
    .bind(now)
    .bind(Json(&merge.cost_price))
    .bind(Json(&merge.stock))
    .fetch_one(pool)
    .await?;
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_arithmetic() {
        assert_eq!(StockAdjustment::compute(5, -2), StockAdjustment::Adjusted(3));
        assert_eq!(StockAdjustment::compute(5, -5), StockAdjustment::Adjusted(0));
        assert_eq!(StockAdjustment::compute(5, -7), StockAdjustment::BelowZero(-2));
        assert_eq!(StockAdjustment::compute(5, i64::MAX), StockAdjustment::OutOfRange);
        assert_eq!(StockAdjustment::compute(-1, i64::MIN), StockAdjustment::OutOfRange);
    }
}
