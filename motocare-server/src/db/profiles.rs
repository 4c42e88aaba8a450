//! Staff profile database operations

use shared::models::{Profile, ProfileCreate, ProfileUpdate};
use sqlx::PgPool;

use super::BoxError;

// ── Read ──

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Profile>, BoxError> {
    let row = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Case-insensitive lookup, used by login diagnostics to spot
/// addresses stored before normalisation
pub async fn find_by_email_loose(pool: &PgPool, email: &str) -> Result<Vec<Profile>, BoxError> {
    let rows = sqlx::query_as::<_, Profile>(
        "SELECT * FROM profiles WHERE lower(trim(email)) = lower(trim($1)) ORDER BY created_at",
    )
    .bind(email)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Profile>, BoxError> {
    let row = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// All profiles, or those of one branch
pub async fn list(pool: &PgPool, branch_id: Option<&str>) -> Result<Vec<Profile>, BoxError> {
    let rows = sqlx::query_as::<_, Profile>(
        "SELECT * FROM profiles
         WHERE ($1::TEXT IS NULL OR branch_id = $1)
         ORDER BY full_name",
    )
    .bind(branch_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ── CRUD ──

pub async fn create(
    pool: &PgPool,
    id: i64,
    data: &ProfileCreate,
    hashed_password: &str,
    now: i64,
) -> Result<Profile, BoxError> {
    let row = sqlx::query_as::<_, Profile>(
        "INSERT INTO profiles (
            id, email, full_name, role, branch_id, is_active,
            hashed_password, created_at, updated_at
         )
         VALUES ($1, $2, $3, $4, $5, TRUE, $6, $7, $7)
         RETURNING *",
    )
    .bind(id)
    .bind(shared::util::normalize_email(&data.email))
    .bind(data.full_name.trim())
    .bind(data.role.as_str())
    .bind(data.branch_id.trim())
    .bind(hashed_password)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Partial update; `hashed_password` replaces the password when given
pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &ProfileUpdate,
    hashed_password: Option<&str>,
    now: i64,
) -> Result<Option<Profile>, BoxError> {
    let row = sqlx::query_as::<_, Profile>(
        "UPDATE profiles SET
            full_name = COALESCE($2, full_name),
            role = COALESCE($3, role),
            branch_id = COALESCE($4, branch_id),
            is_active = COALESCE($5, is_active),
            hashed_password = COALESCE($6, hashed_password),
            updated_at = $7
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(data.full_name.as_deref().map(str::trim))
    .bind(data.role.map(|r| r.as_str()))
    .bind(data.branch_id.as_deref().map(str::trim))
    .bind(data.is_active)
    .bind(hashed_password)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn set_password(
    pool: &PgPool,
    id: i64,
    hashed_password: &str,
    now: i64,
) -> Result<bool, BoxError> {
    let result =
        sqlx::query("UPDATE profiles SET hashed_password = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(hashed_password)
            .bind(now)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}
