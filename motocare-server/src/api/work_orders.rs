//! Work order (service ticket) endpoints

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use shared::ApiResponse;
use shared::error::{AppError, ErrorCode};
use shared::models::{WorkOrder, WorkOrderCreate, WorkOrderUpdate};

use super::ApiResult;
use crate::auth::{BranchScope, require_manager_or_owner};
use crate::db::work_orders::WorkOrderQuery;
use crate::error::internal;
use crate::services::work_order::{create_work_order, update_work_order};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/work-orders", get(list).post(create))
        .route(
            "/api/work-orders/{id}",
            get(get_by_id).patch(update).delete(delete),
        )
}

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::WorkOrderNotFound).with_detail("work_order_id", id)
}

/// GET /api/work-orders
pub async fn list(
    State(state): State<AppState>,
    scope: BranchScope,
    Query(query): Query<WorkOrderQuery>,
) -> ApiResult<Vec<WorkOrder>> {
    let orders = crate::db::work_orders::list(&state.pool, &scope.branch_id, &query)
        .await
        .map_err(internal)?;
    Ok(ApiResponse::success(orders))
}

/// GET /api/work-orders/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    scope: BranchScope,
    Path(id): Path<i64>,
) -> ApiResult<WorkOrder> {
    let order = crate::db::work_orders::get(&state.pool, id, &scope.branch_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::success(order))
}

/// POST /api/work-orders
pub async fn create(
    State(state): State<AppState>,
    scope: BranchScope,
    Json(data): Json<WorkOrderCreate>,
) -> ApiResult<WorkOrder> {
    let order = create_work_order(&state, &scope, data).await?;
    Ok(ApiResponse::success(order))
}

/// PATCH /api/work-orders/{id}
pub async fn update(
    State(state): State<AppState>,
    scope: BranchScope,
    Path(id): Path<i64>,
    Json(data): Json<WorkOrderUpdate>,
) -> ApiResult<WorkOrder> {
    let order = update_work_order(&state, &scope, id, data).await?;
    Ok(ApiResponse::success(order))
}

/// DELETE /api/work-orders/{id} (manager or owner)
pub async fn delete(
    State(state): State<AppState>,
    scope: BranchScope,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    require_manager_or_owner(&scope.user)?;
    if !crate::db::work_orders::delete(&state.pool, id, &scope.branch_id)
        .await
        .map_err(internal)?
    {
        return Err(not_found(id));
    }
    tracing::info!(work_order_id = id, branch_id = %scope.branch_id, "Work order deleted");
    Ok(ApiResponse::success(()))
}
