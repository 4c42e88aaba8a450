//! Customer endpoints

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use shared::ApiResponse;
use shared::error::{AppError, ErrorCode};
use shared::models::{Customer, CustomerCreate, CustomerUpdate};

use super::ApiResult;
use crate::auth::{CurrentUser, require_manager_or_owner};
use crate::error::internal;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(list).post(create))
        .route(
            "/api/customers/{id}",
            get(get_by_id).patch(update).delete(delete),
        )
}

#[derive(Debug, Deserialize)]
pub struct CustomerQuery {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::CustomerNotFound).with_detail("customer_id", id)
}

/// GET /api/customers
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<Vec<Customer>> {
    let customers = crate::db::customers::list(
        &state.pool,
        query.search.as_deref().filter(|s| !s.trim().is_empty()),
        query.limit,
        query.offset,
    )
    .await
    .map_err(internal)?;
    Ok(ApiResponse::success(customers))
}

/// GET /api/customers/{id}
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Customer> {
    let customer = crate::db::customers::get(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::success(customer))
}

/// POST /api/customers
pub async fn create(
    State(state): State<AppState>,
    Json(data): Json<CustomerCreate>,
) -> ApiResult<Customer> {
    data.validate().map_err(AppError::validation)?;
    let customer = crate::db::customers::create(
        &state.pool,
        shared::util::snowflake_id(),
        &data.normalized(),
        shared::util::now_millis(),
    )
    .await
    .map_err(internal)?;
    Ok(ApiResponse::success(customer))
}

/// PATCH /api/customers/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<CustomerUpdate>,
) -> ApiResult<Customer> {
    if data.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "customer name is required",
        ));
    }
    let customer = crate::db::customers::update(&state.pool, id, &data, shared::util::now_millis())
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::success(customer))
}

/// DELETE /api/customers/{id} (manager or owner)
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    require_manager_or_owner(&user)?;
    if !crate::db::customers::delete(&state.pool, id)
        .await
        .map_err(internal)?
    {
        return Err(not_found(id));
    }
    Ok(ApiResponse::success(()))
}
