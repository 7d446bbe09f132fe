use crate::error::ClientError;
use crate::peer::peer_link::{LinkRole, LinkSnapshot, LinkState, PeerLink};
use crate::signaling::SignalingSink;
use crate::transport::{LocalStream, TransportEvent, TransportFactory};
use meshroom_core::{ClientMessage, PeerId, ServerMessage, Signal};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Turns room notifications and relayed signals into a maintained set of
/// [`PeerLink`]s, one per remote participant.
///
/// Never awaits negotiation itself: transports report back through the
/// event channel returned by [`PeerLinkManager::new`], and the owner feeds
/// those events into [`PeerLinkManager::handle_transport_event`].
pub struct PeerLinkManager {
    local_id: PeerId,
    local_stream: LocalStream,
    factory: Arc<dyn TransportFactory>,
    signaling: Arc<dyn SignalingSink>,
    events_tx: mpsc::Sender<TransportEvent>,
    links: HashMap<PeerId, PeerLink>,
    order: Vec<PeerId>,
    changes: watch::Sender<Vec<LinkSnapshot>>,
}

impl PeerLinkManager {
    pub fn new(
        local_id: PeerId,
        local_stream: LocalStream,
        factory: Arc<dyn TransportFactory>,
        signaling: Arc<dyn SignalingSink>,
        event_buffer: usize,
    ) -> (Self, mpsc::Receiver<TransportEvent>) {
        let (events_tx, events_rx) = mpsc::channel(event_buffer);
        let (changes, _) = watch::channel(Vec::new());

        let manager = Self {
            local_id,
            local_stream,
            factory,
            signaling,
            events_tx,
            links: HashMap::new(),
            order: Vec::new(),
            changes,
        };
        (manager, events_rx)
    }

    pub fn local_id(&self) -> &PeerId {
        &self.local_id
    }

    /// Change notification; the value is the ordered link snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Vec<LinkSnapshot>> {
        self.changes.subscribe()
    }

    /// Active links in creation order.
    pub fn links(&self) -> Vec<LinkSnapshot> {
        self.order
            .iter()
            .filter_map(|id| self.links.get(id))
            .map(PeerLink::snapshot)
            .collect()
    }

    pub fn link(&self, peer_id: &PeerId) -> Option<&PeerLink> {
        self.links.get(peer_id)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub async fn handle_server_message(&mut self, msg: ServerMessage) -> Result<(), ClientError> {
        match msg {
            ServerMessage::Welcome { id } => {
                debug!("Ignoring repeated welcome ({})", id);
            }
            ServerMessage::IceConfig { ice_servers } => {
                debug!("Server announced {} ICE server(s)", ice_servers.len());
                self.factory.update_ice_servers(ice_servers);
            }
            ServerMessage::OtherParticipants(ids) => self.on_other_participants(ids).await,
            ServerMessage::Offer { signal, caller } => self.on_offer(caller, signal).await?,
            ServerMessage::Answer { signal, caller } => self.on_answer(caller, signal).await?,
            ServerMessage::ParticipantDeparted(id) => {
                self.on_participant_departed(&id).await;
            }
        }
        Ok(())
    }

    /// Dials everyone already in the room, in the order given.
    ///
    /// A transport that cannot be created only skips that one participant.
    pub async fn on_other_participants(&mut self, ids: Vec<PeerId>) {
        info!("{} participant(s) already in the room", ids.len());

        for id in ids {
            if id == self.local_id || self.links.contains_key(&id) {
                continue;
            }

            let created = self
                .factory
                .create(
                    id.clone(),
                    LinkRole::Initiator,
                    &self.local_stream,
                    self.events_tx.clone(),
                )
                .await;

            match created {
                Ok(transport) => {
                    debug!("Created initiator link to {}", id);
                    self.insert(PeerLink::new(id, LinkRole::Initiator, transport));
                }
                Err(e) => warn!("Could not create link to {}: {}", id, e),
            }
        }

        self.notify();
    }

    /// Answers a relayed offer, creating the responder link on first contact.
    pub async fn on_offer(&mut self, caller: PeerId, signal: Signal) -> Result<(), ClientError> {
        match self.links.get(&caller).map(PeerLink::role) {
            Some(LinkRole::Initiator) => {
                warn!("Offer from {} collides with our own offer", caller);
                return Err(ClientError::OfferCollision(caller));
            }
            Some(LinkRole::Responder) => {
                debug!("Renegotiation offer from {}", caller);
            }
            None => {
                let transport = self
                    .factory
                    .create(
                        caller.clone(),
                        LinkRole::Responder,
                        &self.local_stream,
                        self.events_tx.clone(),
                    )
                    .await?;
                debug!("Created responder link to {}", caller);
                self.insert(PeerLink::new(caller.clone(), LinkRole::Responder, transport));
            }
        }

        let result = self.feed(&caller, signal).await;
        self.notify();
        result
    }

    pub async fn on_answer(&mut self, caller: PeerId, signal: Signal) -> Result<(), ClientError> {
        match self.links.get(&caller).map(PeerLink::role) {
            Some(LinkRole::Initiator) => {}
            _ => {
                error!("Answer from {} without a pending offer", caller);
                return Err(ClientError::UnexpectedAnswer(caller));
            }
        }

        let result = self.feed(&caller, signal).await;
        self.notify();
        result
    }

    /// Closes and removes the link to `id`. Unknown ids are a no-op.
    pub async fn on_participant_departed(&mut self, id: &PeerId) -> Option<PeerLink> {
        let link = self.remove(id).await?;
        info!("Participant {} departed, link closed", id);
        self.notify();
        Some(link)
    }

    pub async fn handle_transport_event(&mut self, event: TransportEvent) -> Result<(), ClientError> {
        match event {
            TransportEvent::NegotiationPayload(peer_id, signal) => {
                let Some(link) = self.links.get_mut(&peer_id) else {
                    debug!("Dropping payload for stale link {}", peer_id);
                    return Ok(());
                };

                let msg = match link.role() {
                    LinkRole::Initiator => ClientMessage::Offer {
                        target: peer_id.clone(),
                        caller: self.local_id.clone(),
                        signal,
                    },
                    LinkRole::Responder => ClientMessage::Answer {
                        target: peer_id.clone(),
                        signal,
                    },
                };
                link.advance(LinkState::Negotiating);
                self.signaling.send(msg)?;
            }

            TransportEvent::Connected(peer_id) => {
                if let Some(link) = self.links.get_mut(&peer_id) {
                    if link.advance(LinkState::Established) {
                        info!("Link to {} established", peer_id);
                    }
                }
            }

            TransportEvent::RemoteTrack(peer_id, track) => {
                if let Some(link) = self.links.get_mut(&peer_id) {
                    link.add_remote_track(track);
                }
            }

            TransportEvent::Failed(peer_id, reason) => {
                if self.remove(&peer_id).await.is_some() {
                    warn!("Link to {} failed: {}", peer_id, reason);
                }
            }

            TransportEvent::Closed(peer_id) => {
                if self.remove(&peer_id).await.is_some() {
                    info!("Link to {} closed by transport", peer_id);
                }
            }
        }

        self.notify();
        Ok(())
    }

    /// Closes every link, leaving the manager empty.
    pub async fn teardown_all(&mut self) {
        let ids = std::mem::take(&mut self.order);
        for id in ids {
            if let Some(mut link) = self.links.remove(&id) {
                if let Err(e) = link.close().await {
                    warn!("Error closing link to {}: {}", id, e);
                }
            }
        }
        info!("All peer links torn down");
        self.notify();
    }

    fn insert(&mut self, link: PeerLink) {
        let id = link.peer_id().clone();
        self.order.push(id.clone());
        self.links.insert(id, link);
    }

    async fn remove(&mut self, id: &PeerId) -> Option<PeerLink> {
        let mut link = self.links.remove(id)?;
        self.order.retain(|other| other != id);
        if let Err(e) = link.close().await {
            warn!("Error closing link to {}: {}", id, e);
        }
        Some(link)
    }

    async fn feed(&mut self, peer_id: &PeerId, signal: Signal) -> Result<(), ClientError> {
        let Some(link) = self.links.get_mut(peer_id) else {
            return Ok(());
        };

        if let Err(e) = link.feed_signal(signal).await {
            warn!("Transport for {} rejected signal: {}", peer_id, e);
            self.remove(peer_id).await;
            return Err(e.into());
        }
        Ok(())
    }

    fn notify(&self) {
        self.changes.send_replace(self.links());
    }
}
