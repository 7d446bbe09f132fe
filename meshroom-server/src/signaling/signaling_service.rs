use crate::room::RoomCommand;
use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use meshroom_core::{IceServerConfig, PeerId, RoomId, ServerMessage};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::error;

struct SignalingInner {
    peers: DashMap<PeerId, mpsc::UnboundedSender<Message>>,
    ice_servers: Vec<IceServerConfig>,
}

/// Connection table shared by every WebSocket task and the hub.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
    pub(crate) room_cmd_tx: mpsc::Sender<RoomCommand>,
}

impl SignalingService {
    pub fn new(room_cmd_tx: mpsc::Sender<RoomCommand>, ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                ice_servers,
            }),
            room_cmd_tx,
        }
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn add_peer(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(peer_id, tx);
    }

    pub fn remove_peer(&self, peer_id: &PeerId) {
        self.inner.peers.remove(peer_id);
    }

    pub fn peer_count(&self) -> usize {
        self.inner.peers.len()
    }

    /// Greets a freshly registered connection with its id and the ICE setup.
    pub fn greet(&self, peer_id: &PeerId) {
        self.push(
            peer_id,
            &ServerMessage::Welcome {
                id: peer_id.clone(),
            },
        );
        self.push(
            peer_id,
            &ServerMessage::IceConfig {
                ice_servers: self.get_ice_servers(),
            },
        );
    }

    /// Asks the hub for the current members of `room`.
    pub async fn room_snapshot(&self, room: RoomId) -> Option<Vec<PeerId>> {
        let (reply, rx) = oneshot::channel();
        self.room_cmd_tx
            .send(RoomCommand::Snapshot { room, reply })
            .await
            .ok()?;
        rx.await.ok()
    }

    fn push(&self, peer_id: &PeerId, msg: &ServerMessage) -> bool {
        let Some(peer) = self.inner.peers.get(peer_id) else {
            return false;
        };

        match serde_json::to_string(msg) {
            Ok(json) => {
                if let Err(e) = peer.send(Message::Text(json.into())) {
                    error!("Failed to send WS message to {}: {:?}", peer_id, e);
                    return false;
                }
                true
            }
            Err(e) => {
                error!("Failed to serialize signal message: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send_signal(&self, peer_id: &PeerId, msg: ServerMessage) -> bool {
        self.push(peer_id, &msg)
    }
}
