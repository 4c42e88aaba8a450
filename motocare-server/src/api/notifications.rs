//! Notification endpoints and the live WebSocket feed
//!
//! GET /api/notifications/ws?token=<JWT>[&branch_id=]
//! Browsers cannot set headers on a WebSocket handshake, so the token rides
//! in the query string and this route sits outside `require_auth`.
//!
//! Server → client: `LiveMessage` (Ready with the cached backlog, then one
//! Notification per event). Client messages are ignored apart from Close.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use shared::ApiResponse;
use shared::error::{AppError, ErrorCode};
use shared::models::Notification;
use tokio::sync::broadcast;
use tokio::time::Duration;

use super::ApiResult;
use crate::auth::{BranchScope, CurrentUser, jwt, resolve_branch};
use crate::error::internal;
use crate::state::AppState;

const PING_INTERVAL: Duration = Duration::from_secs(30);

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", get(list))
        .route("/api/notifications/read-all", post(mark_all_read))
        .route("/api/notifications/{id}/read", post(mark_read))
}

/// Token-authenticated WebSocket route
pub fn ws_router() -> Router<AppState> {
    Router::new().route("/api/notifications/ws", get(handle_ws))
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub updated: u64,
}

/// GET /api/notifications
pub async fn list(
    State(state): State<AppState>,
    scope: BranchScope,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<Vec<Notification>> {
    let rows = crate::db::notifications::list_for(
        &state.pool,
        scope.user.id,
        &scope.branch_id,
        query.unread_only,
        query.limit,
    )
    .await
    .map_err(internal)?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    scope: BranchScope,
    Path(id): Path<i64>,
) -> ApiResult<MarkedRead> {
    let found =
        crate::db::notifications::mark_read(&state.pool, id, scope.user.id, &scope.branch_id)
            .await
            .map_err(internal)?;
    if !found {
        return Err(
            AppError::new(ErrorCode::NotificationNotFound).with_detail("notification_id", id)
        );
    }
    state.hub.mark_read(&scope.branch_id, Some(id));
    Ok(ApiResponse::success(MarkedRead { updated: 1 }))
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    scope: BranchScope,
) -> ApiResult<MarkedRead> {
    let updated =
        crate::db::notifications::mark_all_read(&state.pool, scope.user.id, &scope.branch_id)
            .await
            .map_err(internal)?;
    state.hub.mark_read(&scope.branch_id, None);
    Ok(ApiResponse::success(MarkedRead { updated }))
}

// ── WebSocket ──

#[derive(Deserialize)]
pub struct WsAuthQuery {
    token: String,
    branch_id: Option<String>,
}

/// Frames pushed to a live client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMessage {
    /// Sent once on connect: cached notifications the user can see
    Ready { notifications: Vec<Notification> },
    Notification { notification: Notification },
}

/// Recent notifications of a branch filtered to what `user` may see
pub fn backlog_for(recent: Vec<Notification>, user: &CurrentUser, branch_id: &str) -> Vec<Notification> {
    recent
        .into_iter()
        .filter(|n| n.is_visible_to(user.id, branch_id))
        .collect()
}

/// GET /api/notifications/ws?token=<JWT>
pub async fn handle_ws(
    State(state): State<AppState>,
    Query(query): Query<WsAuthQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let user = jwt::verify_token(&query.token, &state.jwt_secret)
        .inspect_err(|e| tracing::debug!("Notification WS token rejected: {e}"))?;
    let branch_id = resolve_branch(&user, query.branch_id.as_deref())?;

    Ok(ws.on_upgrade(move |socket| ws_session(socket, state, user, branch_id)))
}

async fn ws_session(socket: WebSocket, state: AppState, user: CurrentUser, branch_id: String) {
    let (mut sink, mut stream) = socket.split();
    tracing::info!(user_id = user.id, branch_id = %branch_id, "Notification WS connected");

    // Subscribe before reading the backlog so nothing slips between them
    let mut hub_rx = state.hub.subscribe(&branch_id);
    let ready = LiveMessage::Ready {
        notifications: backlog_for(state.hub.recent(&branch_id), &user, &branch_id),
    };
    if send_message(&mut sink, &ready).await.is_err() {
        return;
    }

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await;

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            event = hub_rx.recv() => {
                match event {
                    Ok(notification) => {
                        if notification.is_visible_to(user.id, &branch_id) {
                            let msg = LiveMessage::Notification { notification };
                            if send_message(&mut sink, &msg).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(user_id = user.id, branch_id = %branch_id, lagged = n, "Notification subscriber lagged, resending backlog");
                        hub_rx = state.hub.subscribe(&branch_id);
                        let msg = LiveMessage::Ready {
                            notifications: backlog_for(state.hub.recent(&branch_id), &user, &branch_id),
                        };
                        if send_message(&mut sink, &msg).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    tracing::info!(user_id = user.id, branch_id = %branch_id, "Notification WS disconnected");
}

async fn send_message<S>(sink: &mut S, msg: &LiveMessage) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|e| {
        tracing::error!("Failed to serialize live message: {e}");
    })?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
