use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::peer::{LinkSnapshot, PeerLinkManager};
use crate::signaling::{SignalingConnection, SignalingSink};
use crate::transport::{LocalStream, TransportEvent, TransportFactory, WebRtcTransportFactory};
use meshroom_core::{ClientMessage, PeerId, RoomId, ServerMessage};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// A joined room: the signaling connection plus the links it maintains.
///
/// Dropping the session without calling [`MeshSession::leave`] still tears
/// every link down, just without waiting for it.
pub struct MeshSession {
    local_id: PeerId,
    room: RoomId,
    links: watch::Receiver<Vec<LinkSnapshot>>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl MeshSession {
    pub async fn join(
        config: ClientConfig,
        room: impl Into<RoomId>,
        local_stream: LocalStream,
    ) -> Result<Self, ClientError> {
        Self::join_with(
            config,
            room,
            local_stream,
            Arc::new(WebRtcTransportFactory::default()),
        )
        .await
    }

    pub async fn join_with(
        config: ClientConfig,
        room: impl Into<RoomId>,
        local_stream: LocalStream,
        factory: Arc<dyn TransportFactory>,
    ) -> Result<Self, ClientError> {
        if local_stream.is_empty() {
            return Err(ClientError::NoLocalMedia);
        }
        let room = room.into();

        let mut conn = SignalingConnection::connect(&config.server_url).await?;
        let local_id = match timeout(config.welcome_timeout, wait_for_welcome(&mut conn)).await {
            Ok(Some(id)) => id,
            _ => {
                let _ = conn.close().await;
                return Err(ClientError::NoWelcome);
            }
        };

        let sink = conn.sink();
        sink.send(ClientMessage::JoinRoom(room.clone()))?;
        info!("Joining room '{}' as {}", room, local_id);

        let (manager, transport_rx) = PeerLinkManager::new(
            local_id.clone(),
            local_stream,
            factory,
            sink,
            config.event_buffer,
        );
        let links = manager.subscribe();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(drive(manager, conn, transport_rx, shutdown_rx));

        Ok(Self {
            local_id,
            room,
            links,
            shutdown: Some(shutdown_tx),
            task,
        })
    }

    pub fn local_id(&self) -> &PeerId {
        &self.local_id
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    /// Ordered link snapshots, updated every time a link changes.
    pub fn links(&self) -> watch::Receiver<Vec<LinkSnapshot>> {
        self.links.clone()
    }

    /// Tears down every link and disconnects from the server.
    pub async fn leave(mut self) -> Result<(), ClientError> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        (&mut self.task).await?;
        info!("Left room '{}'", self.room);
        Ok(())
    }
}

async fn wait_for_welcome(conn: &mut SignalingConnection) -> Option<PeerId> {
    while let Some(msg) = conn.recv().await {
        match msg {
            ServerMessage::Welcome { id } => return Some(id),
            other => debug!("Skipping {:?} before welcome", other),
        }
    }
    None
}

async fn drive(
    mut manager: PeerLinkManager,
    mut conn: SignalingConnection,
    mut transport_rx: mpsc::Receiver<TransportEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            msg = conn.recv() => {
                let Some(msg) = msg else {
                    warn!("Signaling connection lost");
                    break;
                };
                if let Err(e) = manager.handle_server_message(msg).await {
                    warn!("Failed to handle server message: {}", e);
                }
            }
            Some(event) = transport_rx.recv() => {
                if let Err(e) = manager.handle_transport_event(event).await {
                    warn!("Failed to handle transport event: {}", e);
                }
            }
        }
    }

    manager.teardown_all().await;
    if let Err(e) = conn.close().await {
        warn!("Error closing signaling connection: {}", e);
    }
}
