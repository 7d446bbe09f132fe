use crate::room::room_command::RoomCommand;
use crate::room::room_registry::RoomRegistry;
use crate::signaling::SignalingOutput;
use meshroom_core::{PeerId, RoomId, ServerMessage, Signal};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Single event loop that owns room membership and routes signals.
///
/// Commands are handled one at a time, so the registry needs no lock and two
/// handlers never interleave.
pub struct SignalingHub {
    registry: RoomRegistry,
    command_rx: mpsc::Receiver<RoomCommand>,
    signaling: Arc<dyn SignalingOutput>,
}

impl SignalingHub {
    pub fn new(command_rx: mpsc::Receiver<RoomCommand>, signaling: Arc<dyn SignalingOutput>) -> Self {
        Self {
            registry: RoomRegistry::new(),
            command_rx,
            signaling,
        }
    }

    pub async fn run(mut self) {
        info!("Signaling hub started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Command channel closed. Signaling hub finished");
    }

    async fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::JoinRoom { peer_id, room } => self.join(peer_id, room).await,

            RoomCommand::Offer {
                peer_id,
                target,
                caller,
                signal,
            } => {
                debug!("Relaying offer {} -> {} (caller {})", peer_id, target, caller);
                self.relay(&target, ServerMessage::Offer { signal, caller })
                    .await;
            }

            RoomCommand::Answer {
                peer_id,
                target,
                signal,
            } => {
                debug!("Relaying answer {} -> {}", peer_id, target);
                self.relay_answer(peer_id, target, signal).await;
            }

            RoomCommand::Disconnect { peer_id } => self.disconnect(peer_id).await,

            RoomCommand::Snapshot { room, reply } => {
                let _ = reply.send(self.registry.remaining_members(&room));
            }
        }
    }

    async fn join(&mut self, peer_id: PeerId, room: RoomId) {
        let others = match self.registry.join(&room, &peer_id) {
            Ok(others) => others,
            Err(e) => {
                warn!("Ignoring join-room '{}': {}", room, e);
                return;
            }
        };

        info!(
            "Peer {} joined room '{}' ({} already present)",
            peer_id,
            room,
            others.len()
        );

        self.signaling
            .send_signal(&peer_id, ServerMessage::OtherParticipants(others))
            .await;
    }

    async fn relay_answer(&self, sender: PeerId, target: PeerId, signal: Signal) {
        let msg = ServerMessage::Answer {
            signal,
            caller: sender,
        };
        self.relay(&target, msg).await;
    }

    async fn relay(&self, target: &PeerId, msg: ServerMessage) {
        if !self.signaling.send_signal(target, msg).await {
            debug!("Relay target {} is not connected, dropping", target);
        }
    }

    async fn disconnect(&mut self, peer_id: PeerId) {
        let Some(room) = self.registry.leave(&peer_id) else {
            debug!("Peer {} disconnected without joining a room", peer_id);
            return;
        };

        let remaining = self.registry.remaining_members(&room);
        info!(
            "Peer {} left room '{}', notifying {} participant(s)",
            peer_id,
            room,
            remaining.len()
        );

        for member in remaining {
            self.signaling
                .send_signal(&member, ServerMessage::ParticipantDeparted(peer_id.clone()))
                .await;
        }
    }
}
