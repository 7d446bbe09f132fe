use crate::config::ServerConfig;
use crate::room::SignalingHub;
use crate::signaling::{SignalingService, ws_handler};
use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use meshroom_core::RoomId;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Spawns the hub task and returns the service the HTTP layer talks to.
pub fn start_hub(config: &ServerConfig) -> SignalingService {
    let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer);
    let service = SignalingService::new(cmd_tx, config.ice_servers.clone());

    let hub = SignalingHub::new(cmd_rx, Arc::new(service.clone()));
    tokio::spawn(hub.run());

    service
}

pub fn router(service: SignalingService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .route("/rooms/{room_id}", get(room_members))
        .layer(cors)
        .with_state(service)
}

pub async fn serve(config: ServerConfig) -> Result<()> {
    let addr = config.addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    serve_with_listener(listener, config).await
}

pub async fn serve_with_listener(listener: TcpListener, config: ServerConfig) -> Result<()> {
    let service = start_hub(&config);
    let app = router(service);

    info!(
        "Signaling server listening on http://{}",
        listener.local_addr().context("Listener has no local address")?
    );

    axum::serve(listener, app)
        .await
        .context("Signaling server stopped")
}

async fn health() -> &'static str {
    "ok"
}

async fn room_members(
    Path(room_id): Path<String>,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    let participants = service
        .room_snapshot(RoomId::from(room_id.clone()))
        .await
        .unwrap_or_default();

    Json(json!({
        "room": room_id,
        "participants": participants,
    }))
}
