use dashmap::DashMap;
use meshroom_core::PeerId;
use std::sync::Arc;
use tracing::info;

/// Result of moving a member into a room.
#[derive(Debug, Default, PartialEq)]
pub struct JoinOutcome {
    /// Room the member left on the way, with whoever is still in it.
    pub left: Option<Departure>,
    /// Members that were already in the joined room.
    pub existing: Vec<PeerId>,
}

#[derive(Debug, PartialEq)]
pub struct Departure {
    pub room: String,
    pub remaining: Vec<PeerId>,
}

/// Room membership. A member is in at most one room at a time.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<String, Vec<PeerId>>>,
    membership: Arc<DashMap<PeerId, String>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, peer: &PeerId, room: &str) -> JoinOutcome {
        let left = match self.room_of(peer) {
            Some(current) if current == room => {
                let existing = self
                    .members(room)
                    .into_iter()
                    .filter(|member| member != peer)
                    .collect();
                return JoinOutcome {
                    left: None,
                    existing,
                };
            }
            Some(_) => self.leave(peer),
            None => None,
        };

        let existing = {
            let mut members = self.rooms.entry(room.to_string()).or_insert_with(|| {
                info!("Creating new room: {}", room);
                Vec::new()
            });
            let existing = members.clone();
            members.push(peer.clone());
            existing
        };
        self.membership.insert(peer.clone(), room.to_string());

        JoinOutcome { left, existing }
    }

    pub fn leave(&self, peer: &PeerId) -> Option<Departure> {
        let (_, room) = self.membership.remove(peer)?;

        let remaining = match self.rooms.get_mut(&room) {
            Some(mut members) => {
                members.retain(|member| member != peer);
                members.clone()
            }
            None => Vec::new(),
        };

        if remaining.is_empty() {
            self.rooms.remove_if(&room, |_, members| members.is_empty());
            info!("Room {} is empty, dropping it", room);
        }

        Some(Departure { room, remaining })
    }

    pub fn room_of(&self, peer: &PeerId) -> Option<String> {
        self.membership.get(peer).map(|room| room.clone())
    }

    /// Members in join order.
    pub fn members(&self, room: &str) -> Vec<PeerId> {
        self.rooms
            .get(room)
            .map(|members| members.clone())
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
