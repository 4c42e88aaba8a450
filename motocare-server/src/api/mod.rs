//! HTTP API
//!
//! One module per resource, each exposing `router()`. Every body is the
//! `ApiResponse` envelope.

pub mod auth;
pub mod branches;
pub mod cash;
pub mod categories;
pub mod customers;
pub mod health;
pub mod notifications;
pub mod parts;
pub mod profiles;
pub mod reports;
pub mod sales;
pub mod work_orders;

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use http::{HeaderName, HeaderValue};
use shared::error::AppError;
use shared::ApiResponse;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::rate_limit::login_rate_limit;
use crate::auth::require_auth;
use crate::state::AppState;

pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

const REQUEST_ID_HEADER: &str = "x-request-id";
/// Import payloads and sale bodies stay well under this
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_IN_FLIGHT: usize = 256;

/// Request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// All routes with their auth layers, no outer middleware
pub fn build_router(state: &AppState) -> Router<AppState> {
    let login = auth::login_router().route_layer(from_fn_with_state(state.clone(), login_rate_limit));

    let protected = Router::new()
        .merge(auth::router())
        .merge(branches::router())
        .merge(profiles::router())
        .merge(parts::router())
        .merge(categories::router())
        .merge(customers::router())
        .merge(sales::router())
        .merge(work_orders::router())
        .merge(cash::router())
        .merge(notifications::router())
        .merge(reports::router())
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(health::router())
        .merge(login)
        // authenticates through ?token=
        .merge(notifications::ws_router())
        .merge(protected)
}

/// The full application: routes, tower-http middleware and state
pub fn build_app(state: AppState, cors_allow_origin: Option<&str>) -> Router {
    let cors = match cors_allow_origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        Some(origin) => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(origin))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
        None => CorsLayer::permissive(),
    };

    build_router(&state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TimeoutLayer::with_status_code(
            http::StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(ConcurrencyLimitLayer::new(MAX_IN_FLIGHT))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::postgres::PgPoolOptions;

    use crate::config::Config;
    use crate::state::AppState;

    pub const SECRET: &str = "test-secret";

    /// State around a lazy pool; routes that never reach the database work
    pub fn state() -> AppState {
        let config = Config::from_lookup(|name| match name {
            "DATABASE_URL" => Some("postgres://motocare@127.0.0.1:1/motocare".to_string()),
            "JWT_SECRET" => Some(SECRET.to_string()),
            _ => None,
        })
        .unwrap();
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy(&config.database_url)
            .unwrap();
        AppState::with_pool(pool, &config)
    }
}
