//! Wire protocol: the JSON events exchanged with clients.
//!
//! Every frame is a tagged object, `{"type": "...", ...fields}`. Inbound
//! and outbound vocabularies are disjoint enums so a client frame can never
//! be reflected back by accident.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Card, CardId, Color, PlayerId, PowerCard, PowerCardId, PublicState};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    CreateRoom {
        name: String,
    },
    JoinRoom {
        room_code: String,
        name: String,
    },
    StartGame,
    PlayCard {
        card_id: CardId,
        chosen_color: Option<Color>,
    },
    DrawCard,
    DrawPowerCard,
    PlayPowerCard {
        card_id: PowerCardId,
        target_player_id: Option<PlayerId>,
        color: Option<Color>,
    },
    LeaveRoom,
    SendEmote {
        emote_type: String,
    },
    UpdateAuth {
        token: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    RoomCreated {
        room_code: String,
    },
    RoomJoined {
        room_code: String,
    },
    /// Sent to a connection when it first binds to a seat.
    PlayerIdentified {
        player_id: PlayerId,
    },
    LobbyUpdate {
        lobby: LobbyState,
    },
    /// Per-connection game start payload including the private hand.
    GameStarted {
        state: PublicState,
        hand: Vec<Card>,
    },
    StateUpdate {
        state: PublicState,
    },
    HandUpdate {
        cards: Vec<Card>,
    },
    PowerStateUpdate {
        points: u32,
        cards: Vec<PowerCard>,
        required_draws: u32,
    },
    RushAlert {
        player_id: PlayerId,
        player_name: String,
    },
    GameEnded {
        winner_id: PlayerId,
        scores: HashMap<PlayerId, u32>,
    },
    Emote {
        player_id: PlayerId,
        emote_type: String,
    },
    Error {
        code: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    InProgress,
}

#[derive(Debug, Clone, Serialize)]
pub struct LobbyPlayer {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub connected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LobbyState {
    pub room_code: String,
    pub status: RoomStatus,
    pub players: Vec<LobbyPlayer>,
}
