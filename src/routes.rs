//! HTTP surface
//!
//! - `POST /login`: register a display name, get an identity back
//! - `GET /ws`: WebSocket upgrade into the pairing protocol
//! - anything else: static browser client, when a directory is configured

use std::net::SocketAddr;
use std::path::Path;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::{mpsc, oneshot};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::error::AppError;
use crate::handler::handle_connection;
use crate::message::{LoginRequest, LoginResponse};
use crate::server::ServerCommand;

/// Shared state handed to every route
#[derive(Clone)]
pub struct AppState {
    /// ChatServer actor command channel
    pub commands: mpsc::Sender<ServerCommand>,
}

/// Build the router
///
/// Must be served with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut router = Router::new()
        .route("/login", post(login))
        .route("/ws", get(ws_upgrade));

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// POST /login
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (reply, response) = oneshot::channel();
    state
        .commands
        .send(ServerCommand::Login {
            username: request.username,
            reply,
        })
        .await
        .map_err(|_| AppError::ChannelSend)?;

    let response = response.await.map_err(|_| AppError::ChannelSend)??;
    Ok(Json(response))
}

/// GET /ws
async fn ws_upgrade(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = handle_connection(socket, state.commands, addr.to_string()).await {
            error!("Connection handler error: {}", e);
        }
    })
}
