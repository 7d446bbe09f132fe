use async_trait::async_trait;
use dashmap::DashSet;
use meshroom_core::{PeerId, ServerMessage};
use meshroom_server::SignalingOutput;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Mock SignalingOutput that captures every frame the hub delivers.
///
/// Only peers registered through [`MockSignalingOutput::connect`] are
/// reachable; frames for anyone else are dropped like a real routing miss.
#[derive(Clone)]
pub struct MockSignalingOutput {
    tx: mpsc::UnboundedSender<(PeerId, ServerMessage)>,
    connected: Arc<DashSet<PeerId>>,
    signals: Arc<Mutex<Vec<(PeerId, ServerMessage)>>>,
}

impl MockSignalingOutput {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(PeerId, ServerMessage)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let signaling = Self {
            tx,
            connected: Arc::new(DashSet::new()),
            signals: Arc::new(Mutex::new(Vec::new())),
        };
        (signaling, rx)
    }

    pub fn connect(&self, peer_id: &PeerId) {
        self.connected.insert(peer_id.clone());
    }

    pub fn disconnect(&self, peer_id: &PeerId) {
        self.connected.remove(peer_id);
    }

    /// Everything delivered to `peer_id`, in delivery order.
    pub async fn signals_for(&self, peer_id: &PeerId) -> Vec<ServerMessage> {
        self.signals
            .lock()
            .await
            .iter()
            .filter(|(id, _)| id == peer_id)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    pub async fn all_signals(&self) -> Vec<(PeerId, ServerMessage)> {
        self.signals.lock().await.clone()
    }
}

#[async_trait]
impl SignalingOutput for MockSignalingOutput {
    async fn send_signal(&self, peer_id: &PeerId, msg: ServerMessage) -> bool {
        if !self.connected.contains(peer_id) {
            tracing::debug!("[MockSignaling] drop for unknown peer {}", peer_id);
            return false;
        }

        tracing::debug!("[MockSignaling] send_signal to {}: {:?}", peer_id, msg);
        self.signals
            .lock()
            .await
            .push((peer_id.clone(), msg.clone()));
        let _ = self.tx.send((peer_id.clone(), msg));
        true
    }
}
