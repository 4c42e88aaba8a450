//! Sale endpoints

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use shared::ApiResponse;
use shared::error::{AppError, ErrorCode};
use shared::models::{Sale, SaleCreate, SaleCreated};

use super::ApiResult;
use crate::auth::BranchScope;
use crate::db::sales::{SaleDeleted, SaleQuery};
use crate::error::internal;
use crate::services::sale::{create_sale, delete_sale};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sales", get(list).post(create))
        .route("/api/sales/{id}", get(get_by_id).delete(delete))
}

/// GET /api/sales
pub async fn list(
    State(state): State<AppState>,
    scope: BranchScope,
    Query(query): Query<SaleQuery>,
) -> ApiResult<Vec<Sale>> {
    let sales = crate::db::sales::list(&state.pool, &scope.branch_id, &query)
        .await
        .map_err(internal)?;
    Ok(ApiResponse::success(sales))
}

/// GET /api/sales/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    scope: BranchScope,
    Path(id): Path<i64>,
) -> ApiResult<Sale> {
    let sale = crate::db::sales::get(&state.pool, id, &scope.branch_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::SaleNotFound).with_detail("sale_id", id))?;
    Ok(ApiResponse::success(sale))
}

/// POST /api/sales: items, stock and the cash entry commit together
pub async fn create(
    State(state): State<AppState>,
    scope: BranchScope,
    Json(data): Json<SaleCreate>,
) -> ApiResult<SaleCreated> {
    let created = create_sale(&state, &scope, data).await?;
    Ok(ApiResponse::success(created))
}

/// DELETE /api/sales/{id} (manager or owner)
pub async fn delete(
    State(state): State<AppState>,
    scope: BranchScope,
    Path(id): Path<i64>,
) -> ApiResult<SaleDeleted> {
    let deleted = delete_sale(&state, &scope, id).await?;
    Ok(ApiResponse::success(deleted))
}
