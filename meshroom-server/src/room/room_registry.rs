use meshroom_core::{PeerId, RoomId};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("peer {peer} is already in room '{current}'")]
    AlreadyInRoom { peer: PeerId, current: RoomId },
}

/// Who is in which room.
///
/// Members are kept in join order because that order decides in which order
/// a newcomer dials the people already present. The reverse index keeps
/// `leave` from scanning every room on disconnect.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Vec<PeerId>>,
    membership: HashMap<PeerId, RoomId>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `peer` to `room` and returns everyone else already there.
    ///
    /// Re-joining the same room is idempotent. Joining a different room while
    /// still a member of one is refused and changes nothing.
    pub fn join(&mut self, room: &RoomId, peer: &PeerId) -> Result<Vec<PeerId>, RoomError> {
        if let Some(current) = self.membership.get(peer) {
            if current != room {
                return Err(RoomError::AlreadyInRoom {
                    peer: peer.clone(),
                    current: current.clone(),
                });
            }
        }

        let members = self.rooms.entry(room.clone()).or_default();
        if !members.contains(peer) {
            members.push(peer.clone());
        }
        self.membership.insert(peer.clone(), room.clone());

        Ok(members.iter().filter(|id| *id != peer).cloned().collect())
    }

    /// Removes `peer` from its room, pruning the room once it is empty.
    pub fn leave(&mut self, peer: &PeerId) -> Option<RoomId> {
        let room = self.membership.remove(peer)?;

        if let Some(members) = self.rooms.get_mut(&room) {
            members.retain(|id| id != peer);
            if members.is_empty() {
                self.rooms.remove(&room);
            }
        }

        Some(room)
    }

    pub fn remaining_members(&self, room: &RoomId) -> Vec<PeerId> {
        self.rooms.get(room).cloned().unwrap_or_default()
    }

    pub fn room_of(&self, peer: &PeerId) -> Option<&RoomId> {
        self.membership.get(peer)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
