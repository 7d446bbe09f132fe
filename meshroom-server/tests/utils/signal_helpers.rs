use anyhow::{Context, Result};
use meshroom_core::{PeerId, RoomId, Signal};
use meshroom_server::RoomCommand;
use serde_json::json;
use tokio::sync::{mpsc, oneshot};

/// Timeout for waiting on a single server frame (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 5000;

/// Opaque payload that looks roughly like what a browser would send.
pub fn fake_signal(kind: &str) -> Signal {
    Signal(json!({ "type": kind, "sdp": format!("v=0 {}", kind) }))
}

pub async fn join(cmd_tx: &mpsc::Sender<RoomCommand>, peer_id: &PeerId, room: &str) -> Result<()> {
    cmd_tx
        .send(RoomCommand::JoinRoom {
            peer_id: peer_id.clone(),
            room: RoomId::from(room),
        })
        .await
        .context("Failed to send JoinRoom")
}

pub async fn disconnect(cmd_tx: &mpsc::Sender<RoomCommand>, peer_id: &PeerId) -> Result<()> {
    cmd_tx
        .send(RoomCommand::Disconnect {
            peer_id: peer_id.clone(),
        })
        .await
        .context("Failed to send Disconnect")
}

/// Round-trips a snapshot through the hub. The hub handles commands in
/// order, so once this returns every earlier command has been processed.
pub async fn members(cmd_tx: &mpsc::Sender<RoomCommand>, room: &str) -> Result<Vec<PeerId>> {
    let (reply, rx) = oneshot::channel();
    cmd_tx
        .send(RoomCommand::Snapshot {
            room: RoomId::from(room),
            reply,
        })
        .await
        .context("Failed to send Snapshot")?;
    rx.await.context("Hub dropped the snapshot reply")
}
