//! Part (inventory) endpoints
//!
//! Reads are open to all staff; catalog writes need a manager or owner.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use shared::ApiResponse;
use shared::error::{AppError, ErrorCode};
use shared::models::{Part, PartCreate, PartUpdate, StockAdjust};

use super::ApiResult;
use crate::auth::{BranchScope, require_manager_or_owner};
use crate::db::parts::{PartQuery, StockAdjustment};
use crate::error::internal;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/parts", get(list).post(create))
        .route("/api/parts/{id}", get(get_by_id).patch(update).delete(delete))
        .route("/api/parts/{id}/stock", post(adjust_stock))
}

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::PartNotFound).with_detail("part_id", id)
}

/// GET /api/parts
pub async fn list(
    State(state): State<AppState>,
    scope: BranchScope,
    Query(query): Query<PartQuery>,
) -> ApiResult<Vec<Part>> {
    let parts = crate::db::parts::list(&state.pool, &scope.branch_id, &query)
        .await
        .map_err(internal)?;
    Ok(ApiResponse::success(parts))
}

/// GET /api/parts/{id}
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Part> {
    let part = crate::db::parts::get(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::success(part))
}

/// POST /api/parts
pub async fn create(
    State(state): State<AppState>,
    scope: BranchScope,
    Json(data): Json<PartCreate>,
) -> ApiResult<Part> {
    require_manager_or_owner(&scope.user)?;
    data.validate().map_err(AppError::validation)?;

    let new_part = data.into_new_part(&scope.branch_id);
    let part = crate::db::parts::create(
        &state.pool,
        shared::util::snowflake_id(),
        &new_part,
        shared::util::now_millis(),
    )
    .await
    .map_err(internal)?;
    tracing::info!(part_id = part.id, sku = %part.sku, branch_id = %scope.branch_id, "Part created");
    Ok(ApiResponse::success(part))
}

/// PATCH /api/parts/{id}
pub async fn update(
    State(state): State<AppState>,
    scope: BranchScope,
    Path(id): Path<i64>,
    Json(data): Json<PartUpdate>,
) -> ApiResult<Part> {
    require_manager_or_owner(&scope.user)?;
    if data.retail_price.is_some_and(|p| !p.is_finite() || p < 0.0)
        || data.wholesale_price.is_some_and(|p| !p.is_finite() || p < 0.0)
        || data.min_stock.is_some_and(|m| m < 0)
    {
        return Err(AppError::with_message(
            ErrorCode::InvalidAmount,
            "prices and min_stock must be non-negative",
        ));
    }

    let part = crate::db::parts::update(&state.pool, id, &data, shared::util::now_millis())
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::success(part))
}

/// DELETE /api/parts/{id}
pub async fn delete(
    State(state): State<AppState>,
    scope: BranchScope,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    require_manager_or_owner(&scope.user)?;
    if !crate::db::parts::delete(&state.pool, id)
        .await
        .map_err(internal)?
    {
        return Err(not_found(id));
    }
    tracing::info!(part_id = id, user_id = scope.user.id, "Part deleted");
    Ok(ApiResponse::success(()))
}

#[derive(Serialize)]
pub struct StockAdjusted {
    pub part_id: i64,
    pub branch_id: String,
    pub stock: i64,
}

/// POST /api/parts/{id}/stock: manual correction at the scoped branch
pub async fn adjust_stock(
    State(state): State<AppState>,
    scope: BranchScope,
    Path(id): Path<i64>,
    Json(data): Json<StockAdjust>,
) -> ApiResult<StockAdjusted> {
    require_manager_or_owner(&scope.user)?;
    data.validate()
        .map_err(|msg| AppError::with_message(ErrorCode::InvalidQuantity, msg))?;

    let outcome = crate::db::parts::adjust_stock(
        &state.pool,
        id,
        &scope.branch_id,
        data.delta,
        shared::util::now_millis(),
    )
    .await
    .map_err(internal)?;

    match outcome {
        StockAdjustment::Adjusted(stock) => {
            tracing::info!(
                part_id = id,
                branch_id = %scope.branch_id,
                delta = data.delta,
                stock,
                reason = data.reason.as_deref().unwrap_or(""),
                "Stock adjusted"
            );
            Ok(ApiResponse::success(StockAdjusted {
                part_id: id,
                branch_id: scope.branch_id,
                stock,
            }))
        }
        StockAdjustment::NotFound => Err(not_found(id)),
        StockAdjustment::BelowZero(would_be) => Err(AppError::new(ErrorCode::StockBelowZero)
            .with_detail("part_id", id)
            .with_detail("would_be", would_be)),
        StockAdjustment::OutOfRange => Err(AppError::with_message(
            ErrorCode::InvalidQuantity,
            "stock would exceed the supported range",
        )),
    }
}
