//! Category endpoints
//!
//! A category exists while some part carries it; rename and delete rewrite
//! the parts and answer with how many changed.

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use shared::ApiResponse;
use shared::error::{AppError, ErrorCode};

use super::ApiResult;
use crate::auth::{CurrentUser, require_manager_or_owner};
use crate::db::categories::CategorySummary;
use crate::error::internal;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list))
        .route("/api/categories/{name}", put(rename).delete(delete))
}

#[derive(Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Updated {
    pub updated: u64,
}

/// GET /api/categories
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<CategorySummary>> {
    let categories = crate::db::categories::list(&state.pool)
        .await
        .map_err(internal)?;
    Ok(ApiResponse::success(categories))
}

/// PUT /api/categories/{name}
pub async fn rename(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(name): Path<String>,
    Json(req): Json<RenameRequest>,
) -> ApiResult<Updated> {
    require_manager_or_owner(&user)?;
    let new_name = shared::util::normalize_category(&req.name).ok_or_else(|| {
        AppError::with_message(ErrorCode::RequiredField, "category name is required")
    })?;

    let updated = crate::db::categories::rename_category(
        &state.pool,
        &name,
        &new_name,
        shared::util::now_millis(),
    )
    .await
    .map_err(internal)?;
    tracing::info!(from = %name, to = %new_name, updated, "Category renamed");
    Ok(ApiResponse::success(Updated { updated }))
}

/// DELETE /api/categories/{name}
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(name): Path<String>,
) -> ApiResult<Updated> {
    require_manager_or_owner(&user)?;
    let updated =
        crate::db::categories::delete_category(&state.pool, &name, shared::util::now_millis())
            .await
            .map_err(internal)?;
    tracing::info!(category = %name, updated, "Category cleared");
    Ok(ApiResponse::success(Updated { updated }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updated_count_body() {
        let json = serde_json::to_value(ApiResponse::success(Updated { updated: 3 })).unwrap();
        assert_eq!(json, serde_json::json!({ "ok": true, "data": { "updated": 3 } }));

        let none = serde_json::to_value(Updated { updated: 0 }).unwrap();
        assert_eq!(none, serde_json::json!({ "updated": 0 }));
    }
}
