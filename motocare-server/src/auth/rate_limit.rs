//! Fixed-window throttling for unauthenticated routes

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use dashmap::DashMap;
use shared::error::{AppError, ErrorCode};
use tokio::time::Instant;

use crate::state::AppState;

/// How many hits a key may make per window
#[derive(Debug, Clone, Copy)]
pub struct Limit {
    pub max_hits: u32,
    pub window: Duration,
}

/// 5 sign-in attempts per client per minute
pub const LOGIN_LIMIT: Limit = Limit {
    max_hits: 5,
    window: Duration::from_secs(60),
};

/// Windows idle this long are dropped by [`RateLimiter::cleanup`]
const IDLE_AFTER: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy)]
struct Window {
    opened: Instant,
    hits: u32,
}

/// Hit counters keyed by route and client address
#[derive(Clone, Default)]
pub struct RateLimiter {
    windows: Arc<DashMap<(&'static str, String), Window>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one hit; `false` once the key is over its limit for this window.
    pub fn hit(&self, route: &'static str, client: &str, limit: Limit) -> bool {
        let now = Instant::now();
        let mut window = self
            .windows
            .entry((route, client.to_owned()))
            .or_insert(Window { opened: now, hits: 0 });
        if now.duration_since(window.opened) >= limit.window {
            *window = Window { opened: now, hits: 0 };
        }
        window.hits = window.hits.saturating_add(1);
        window.hits <= limit.max_hits
    }

    pub fn cleanup(&self) {
        let now = Instant::now();
        self.windows
            .retain(|_, window| now.duration_since(window.opened) < IDLE_AFTER);
    }

    pub fn tracked(&self) -> usize {
        self.windows.len()
    }
}

/// First X-Forwarded-For hop when behind a proxy, else the socket peer
fn client_addr(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|hop| hop.parse::<IpAddr>().is_ok());
    if let Some(hop) = forwarded {
        return hop.to_owned();
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_owned(), |info| info.0.ip().to_string())
}

pub async fn login_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = client_addr(&request);
    if !state.rate_limiter.hit("login", &client, LOGIN_LIMIT) {
        tracing::warn!(client = %client, "Login attempts throttled");
        return Err(AppError::new(ErrorCode::TooManyRequests)
            .with_detail("retry_after_secs", LOGIN_LIMIT.window.as_secs()));
    }
    Ok(next.run(request).await)
}
