use crate::{RoomCommand, SignalingService};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use meshroom_core::{ClientMessage, PeerId};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service))
}

async fn handle_socket(socket: WebSocket, service: SignalingService) {
    let peer_id = PeerId::new();
    info!("New WebSocket connection: {}", peer_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.add_peer(peer_id.clone(), tx);
    service.greet(&peer_id);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();
        let peer_id = peer_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(signal) => {
                            let cmd = RoomCommand::from_client(peer_id.clone(), signal);
                            if let Err(e) = service.room_cmd_tx.send(cmd).await {
                                error!("Signaling hub died: {}", e);
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid ClientMessage from {}: {:?}", peer_id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.remove_peer(&peer_id);
    let _ = service
        .room_cmd_tx
        .send(RoomCommand::Disconnect {
            peer_id: peer_id.clone(),
        })
        .await;
    info!("WebSocket disconnected: {}", peer_id);
}
