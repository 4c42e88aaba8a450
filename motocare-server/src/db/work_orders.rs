//! Work order (service ticket) database operations

use serde::Deserialize;
use shared::models::{CashTransaction, WorkOrder, WorkOrderStatus};
use sqlx::PgPool;
use sqlx::types::Json;

use super::BoxError;

// ── Read types ──

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkOrderQuery {
    pub status: Option<WorkOrderStatus>,
    /// Matches code, customer name, phone or licence plate
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ── Read ──

pub async fn list(
    pool: &PgPool,
    branch_id: &str,
    query: &WorkOrderQuery,
) -> Result<Vec<WorkOrder>, BoxError> {
    let search = query.search.as_deref().map(super::like_pattern);
    let rows = sqlx::query_as::<_, WorkOrder>(
        "SELECT * FROM work_orders
         WHERE branch_id = $1
           AND ($2::TEXT IS NULL OR status = $2)
           AND ($3::TEXT IS NULL
                OR code ILIKE $3 OR customer_name ILIKE $3
                OR customer_phone ILIKE $3 OR license_plate ILIKE $3)
         ORDER BY created_at DESC
         LIMIT $4 OFFSET $5",
    )
    .bind(branch_id)
    .bind(query.status.map(|s| s.as_str()))
    .bind(search)
    .bind(super::page_limit(query.limit))
    .bind(query.offset.unwrap_or(0).max(0))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get(pool: &PgPool, id: i64, branch_id: &str) -> Result<Option<WorkOrder>, BoxError> {
    let row =
        sqlx::query_as::<_, WorkOrder>("SELECT * FROM work_orders WHERE id = $1 AND branch_id = $2")
            .bind(id)
            .bind(branch_id)
            .fetch_optional(pool)
            .await?;
    Ok(row)
}

/// Every work order that carries a deposit, across all branches
pub async fn list_with_deposit(pool: &PgPool) -> Result<Vec<WorkOrder>, BoxError> {
    let rows = sqlx::query_as::<_, WorkOrder>(
        "SELECT * FROM work_orders WHERE deposit_amount > 0 ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ── CRUD ──

/// Insert a work order and, when given, its deposit cash entry in one transaction
pub async fn create(
    pool: &PgPool,
    order: &WorkOrder,
    deposit: Option<&CashTransaction>,
) -> Result<(), BoxError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO work_orders (
            id, code, branch_id, customer_id, customer_name, customer_phone,
            vehicle_model, license_plate, issue_description, technician_name,
            status, parts_used, labor_cost, discount, deposit_amount, deposit_paid_at,
            total, paid_amount, payment_status, note, created_by, created_at, updated_at
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                 $17, $18, $19, $20, $21, $22, $23)",
    )
    .bind(order.id)
    .bind(&order.code)
    .bind(&order.branch_id)
    .bind(order.customer_id)
    .bind(&order.customer_name)
    .bind(&order.customer_phone)
    .bind(&order.vehicle_model)
    .bind(&order.license_plate)
    .bind(&order.issue_description)
    .bind(&order.technician_name)
    .bind(order.status.as_str())
    .bind(Json(&order.parts_used))
    .bind(order.labor_cost)
    .bind(order.discount)
    .bind(order.deposit_amount)
    .bind(order.deposit_paid_at)
    .bind(order.total)
    .bind(order.paid_amount)
    .bind(order.payment_status.as_str())
    .bind(&order.note)
    .bind(order.created_by)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *tx)
    .await?;

    if let Some(cash) = deposit {
        super::cash_transactions::insert(&mut *tx, cash).await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Persist the mutable fields of an already-validated work order
pub async fn save(pool: &PgPool, order: &WorkOrder) -> Result<Option<WorkOrder>, BoxError> {
    let row = sqlx::query_as::<_, WorkOrder>(
        "UPDATE work_orders SET
            customer_name = $3,
            customer_phone = $4,
            vehicle_model = $5,
            license_plate = $6,
            issue_description = $7,
            technician_name = $8,
            status = $9,
            parts_used = $10,
            labor_cost = $11,
            discount = $12,
            total = $13,
            paid_amount = $14,
            payment_status = $15,
            note = $16,
            updated_at = $17
         WHERE id = $1 AND branch_id = $2
         RETURNING *",
    )
    .bind(order.id)
    .bind(&order.branch_id)
    .bind(&order.customer_name)
    .bind(&order.customer_phone)
    .bind(&order.vehicle_model)
    .bind(&order.license_plate)
    .bind(&order.issue_description)
    .bind(&order.technician_name)
    .bind(order.status.as_str())
    .bind(Json(&order.parts_used))
    .bind(order.labor_cost)
    .bind(order.discount)
    .bind(order.total)
    .bind(order.paid_amount)
    .bind(order.payment_status.as_str())
    .bind(&order.note)
    .bind(order.updated_at)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn delete(pool: &PgPool, id: i64, branch_id: &str) -> Result<bool, BoxError> {
    let result = sqlx::query("DELETE FROM work_orders WHERE id = $1 AND branch_id = $2")
        .bind(id)
        .bind(branch_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
