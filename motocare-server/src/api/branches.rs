//! Branch endpoints

use axum::extract::State;
use axum::routing::get;
use axum::{Extension, Json, Router};
use shared::ApiResponse;
use shared::error::AppError;
use shared::models::{Branch, BranchCreate};

use super::ApiResult;
use crate::auth::{CurrentUser, require_owner};
use crate::error::internal;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/branches", get(list).post(create))
}

/// GET /api/branches
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Branch>> {
    let branches = crate::db::branches::list(&state.pool)
        .await
        .map_err(internal)?;
    Ok(ApiResponse::success(branches))
}

/// POST /api/branches (owner)
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(data): Json<BranchCreate>,
) -> ApiResult<Branch> {
    require_owner(&user)?;
    data.validate().map_err(AppError::validation)?;

    let branch = crate::db::branches::create(&state.pool, &data, shared::util::now_millis())
        .await
        .map_err(internal)?;
    tracing::info!(branch_id = %branch.id, user_id = user.id, "Branch created");
    Ok(ApiResponse::success(branch))
}
