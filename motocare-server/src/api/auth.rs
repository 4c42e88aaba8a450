//! Staff login and identity

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use shared::ApiResponse;
use shared::error::{AppError, ErrorCode};
use shared::models::Profile;

use super::ApiResult;
use crate::auth::CurrentUser;
use crate::error::internal;
use crate::state::AppState;
use crate::util::verify_password;

/// Public: `POST /api/auth/login` (rate limited)
pub fn login_router() -> Router<AppState> {
    Router::new().route("/api/auth/login", post(login))
}

/// Authenticated routes
pub fn router() -> Router<AppState> {
    Router::new().route("/api/auth/me", get(me))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub profile: Profile,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let email = shared::util::normalize_email(&req.email);
    let profile = crate::db::profiles::find_by_email(&state.pool, &email)
        .await
        .map_err(internal)?
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(&req.password, &profile.hashed_password) {
        tracing::info!(user_id = profile.id, "Login rejected: wrong password");
        return Err(AppError::invalid_credentials());
    }
    if !profile.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let branch = crate::db::branches::get(&state.pool, &profile.branch_id)
        .await
        .map_err(internal)?;
    if !branch.is_some_and(|b| b.is_active) {
        return Err(AppError::new(ErrorCode::BranchInactive)
            .with_detail("branch_id", profile.branch_id.as_str()));
    }

    let token = crate::auth::jwt::create_token(&profile, &state.jwt_secret).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    tracing::info!(user_id = profile.id, branch_id = %profile.branch_id, "Staff logged in");
    Ok(ApiResponse::success(LoginResponse { token, profile }))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Profile> {
    let profile = crate::db::profiles::get(&state.pool, user.id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound))?;
    Ok(ApiResponse::success(profile))
}
