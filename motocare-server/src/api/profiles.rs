//! Staff profile endpoints
//!
//! Managers read their branch's staff; only owners create or change profiles.

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use shared::ApiResponse;
use shared::error::{AppError, ErrorCode};
use shared::models::{MIN_PASSWORD_LEN, Profile, ProfileCreate, ProfileUpdate, Role};

use super::ApiResult;
use crate::auth::{CurrentUser, require_manager_or_owner, require_owner, resolve_branch};
use crate::error::internal;
use crate::state::AppState;
use crate::util::hash_password;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/profiles", get(list).post(create))
        .route("/api/profiles/{id}", patch(update))
}

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub branch_id: Option<String>,
}

fn check_password(password: &str) -> Result<String, AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort));
    }
    hash_password(password).map_err(|e| {
        tracing::error!("Password hashing failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })
}

/// GET /api/profiles (manager or owner)
///
/// Owners see every branch unless they filter by `branch_id`.
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ProfileQuery>,
) -> ApiResult<Vec<Profile>> {
    require_manager_or_owner(&user)?;
    let branch = match (user.role, query.branch_id.as_deref()) {
        (Role::Owner, None) => None,
        (_, requested) => Some(resolve_branch(&user, requested)?),
    };
    let profiles = crate::db::profiles::list(&state.pool, branch.as_deref())
        .await
        .map_err(internal)?;
    Ok(ApiResponse::success(profiles))
}

/// POST /api/profiles (owner)
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(data): Json<ProfileCreate>,
) -> ApiResult<Profile> {
    require_owner(&user)?;
    if data.email.trim().is_empty() || !data.email.contains('@') {
        return Err(AppError::with_message(
            ErrorCode::InvalidFormat,
            "a valid email is required",
        ));
    }
    if data.full_name.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "full_name is required",
        ));
    }
    let hashed = check_password(&data.password)?;

    let profile = crate::db::profiles::create(
        &state.pool,
        shared::util::snowflake_id(),
        &data,
        &hashed,
        shared::util::now_millis(),
    )
    .await
    .map_err(internal)?;
    tracing::info!(
        profile_id = profile.id,
        role = %profile.role,
        branch_id = %profile.branch_id,
        "Profile created"
    );
    Ok(ApiResponse::success(profile))
}

/// PATCH /api/profiles/{id} (owner)
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(data): Json<ProfileUpdate>,
) -> ApiResult<Profile> {
    require_owner(&user)?;
    if id == user.id && data.touches_own_access() {
        return Err(AppError::new(ErrorCode::CannotModifySelf));
    }
    let hashed = data.password.as_deref().map(check_password).transpose()?;

    let profile = crate::db::profiles::update(
        &state.pool,
        id,
        &data,
        hashed.as_deref(),
        shared::util::now_millis(),
    )
    .await
    .map_err(internal)?
    .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound))?;
    tracing::info!(profile_id = id, user_id = user.id, "Profile updated");
    Ok(ApiResponse::success(profile))
}
