//! Health check endpoint

use axum::Router;
use axum::routing::get;
use serde::Serialize;
use shared::ApiResponse;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    git_hash: &'static str,
}

pub async fn health_check() -> ApiResponse<HealthResponse> {
    ApiResponse::success(HealthResponse {
        status: "ok",
        service: "motocare-server",
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("GIT_HASH").unwrap_or("dev"),
    })
}
