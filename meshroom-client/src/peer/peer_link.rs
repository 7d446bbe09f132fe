use crate::error::TransportError;
use crate::transport::{PeerTransport, RemoteTrack};
use meshroom_core::{PeerId, Signal};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkRole {
    /// We dialed: the link sends the offer.
    Initiator,
    /// They dialed: the link answers.
    Responder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkState {
    Created,
    Negotiating,
    Established,
    Closed,
}

impl LinkState {
    fn rank(self) -> u8 {
        match self {
            LinkState::Created => 0,
            LinkState::Negotiating => 1,
            LinkState::Established => 2,
            LinkState::Closed => 3,
        }
    }

    /// One step at a time; `Closed` is reachable from anywhere and never left.
    pub fn can_advance_to(self, next: LinkState) -> bool {
        match (self, next) {
            (LinkState::Closed, _) => false,
            (_, LinkState::Closed) => true,
            (current, next) => next.rank() == current.rank() + 1,
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LinkState::Created => "created",
            LinkState::Negotiating => "negotiating",
            LinkState::Established => "established",
            LinkState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// What UI collaborators get to see of a link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSnapshot {
    pub peer_id: PeerId,
    pub role: LinkRole,
    pub state: LinkState,
    pub remote_tracks: Vec<RemoteTrack>,
}

/// Negotiation-and-transport state with exactly one remote participant.
pub struct PeerLink {
    peer_id: PeerId,
    role: LinkRole,
    state: LinkState,
    transport: Box<dyn PeerTransport>,
    remote_tracks: Vec<RemoteTrack>,
}

impl PeerLink {
    pub fn new(peer_id: PeerId, role: LinkRole, transport: Box<dyn PeerTransport>) -> Self {
        Self {
            peer_id,
            role,
            state: LinkState::Created,
            transport,
            remote_tracks: Vec::new(),
        }
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn role(&self) -> LinkRole {
        self.role
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn remote_tracks(&self) -> &[RemoteTrack] {
        &self.remote_tracks
    }

    /// Moves to `next` if the transition is allowed. Returns whether the
    /// state changed.
    pub fn advance(&mut self, next: LinkState) -> bool {
        if !self.state.can_advance_to(next) {
            return false;
        }
        self.state = next;
        true
    }

    pub async fn feed_signal(&mut self, signal: Signal) -> Result<(), TransportError> {
        if self.state == LinkState::Closed {
            return Err(TransportError::Closed(self.peer_id.clone()));
        }
        self.transport.feed_signal(signal).await?;
        self.advance(LinkState::Negotiating);
        Ok(())
    }

    /// Records a remote track; a track already announced is not duplicated.
    pub fn add_remote_track(&mut self, track: RemoteTrack) -> bool {
        if self.remote_tracks.contains(&track) {
            return false;
        }
        self.remote_tracks.push(track);
        true
    }

    /// Closes the transport. Calling it on a closed link does nothing.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        if !self.advance(LinkState::Closed) {
            return Ok(());
        }
        self.transport.close().await
    }

    pub fn snapshot(&self) -> LinkSnapshot {
        LinkSnapshot {
            peer_id: self.peer_id.clone(),
            role: self.role,
            state: self.state,
            remote_tracks: self.remote_tracks.clone(),
        }
    }
}

impl fmt::Debug for PeerLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerLink")
            .field("peer_id", &self.peer_id)
            .field("role", &self.role)
            .field("state", &self.state)
            .field("remote_tracks", &self.remote_tracks)
            .finish()
    }
}
