//! Process-wide directory of open rooms.

use std::sync::Arc;
use std::time::Duration;

use actix::{Actor, Addr};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::info;

use crate::room::coordinator::Room;
use crate::services::OutcomeReporter;
use crate::utils::room_code::generate_room_code;

/// The only process-wide mutable state: room code → room actor address.
/// Rooms insert themselves on creation and remove themselves when the last
/// connection is gone.
pub struct RoomDirectory {
    rooms: DashMap<String, Addr<Room>>,
    reporter: Arc<dyn OutcomeReporter>,
    turn_timeout: Duration,
}

impl RoomDirectory {
    pub fn new(reporter: Arc<dyn OutcomeReporter>, turn_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            rooms: DashMap::new(),
            reporter,
            turn_timeout,
        })
    }

    /// Open a new room under a fresh unique code. Collisions retry with a
    /// new code; the entry API makes the claim atomic.
    pub fn create_room(self: Arc<Self>) -> (String, Addr<Room>) {
        loop {
            let code = generate_room_code();
            match self.rooms.entry(code.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    let room = Room::new(
                        code.clone(),
                        Arc::clone(&self),
                        Arc::clone(&self.reporter),
                        self.turn_timeout,
                    )
                    .start();
                    slot.insert(room.clone());
                    info!(room_code = %code, rooms_open = self.rooms.len(), "room created");
                    return (code, room);
                }
            }
        }
    }

    pub fn get(&self, code: &str) -> Option<Addr<Room>> {
        let code = code.trim().to_ascii_uppercase();
        self.rooms.get(&code).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, code: &str) {
        self.rooms.remove(code);
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
