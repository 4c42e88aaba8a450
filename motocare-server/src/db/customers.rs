//! Customer database operations

use shared::models::{Customer, CustomerCreate, CustomerUpdate, normalize_phone, normalize_plate};
use sqlx::PgPool;

use super::BoxError;

// ── Read ──

/// Search by name, phone or licence plate
pub async fn list(
    pool: &PgPool,
    search: Option<&str>,
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<Vec<Customer>, BoxError> {
    let pattern = search.map(super::like_pattern);
    let rows = sqlx::query_as::<_, Customer>(
        "SELECT * FROM customers
         WHERE ($1::TEXT IS NULL
                OR name ILIKE $1 OR phone ILIKE $1 OR license_plate ILIKE $1)
         ORDER BY name, id
         LIMIT $2 OFFSET $3",
    )
    .bind(pattern)
    .bind(super::page_limit(limit))
    .bind(offset.unwrap_or(0).max(0))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Customer>, BoxError> {
    let row = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

// ── CRUD ──

/// `data` must already be normalised (`CustomerCreate::normalized`)
pub async fn create(
    pool: &PgPool,
    id: i64,
    data: &CustomerCreate,
    now: i64,
) -> Result<Customer, BoxError> {
    let row = sqlx::query_as::<_, Customer>(
        "INSERT INTO customers (
            id, name, phone, email, address, license_plate, vehicle_model, notes,
            created_at, updated_at
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
         RETURNING *",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.phone)
    .bind(&data.email)
    .bind(&data.address)
    .bind(&data.license_plate)
    .bind(&data.vehicle_model)
    .bind(&data.notes)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &CustomerUpdate,
    now: i64,
) -> Result<Option<Customer>, BoxError> {
    let row = sqlx::query_as::<_, Customer>(
        "UPDATE customers SET
            name = COALESCE($2, name),
            phone = COALESCE($3, phone),
            email = COALESCE($4, email),
            address = COALESCE($5, address),
            license_plate = COALESCE($6, license_plate),
            vehicle_model = COALESCE($7, vehicle_model),
            notes = COALESCE($8, notes),
            updated_at = $9
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.phone.as_deref().and_then(normalize_phone))
    .bind(data.email.as_deref())
    .bind(data.address.as_deref())
    .bind(data.license_plate.as_deref().and_then(normalize_plate))
    .bind(data.vehicle_model.as_deref())
    .bind(data.notes.as_deref())
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, BoxError> {
    let result = sqlx::query("DELETE FROM customers WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
