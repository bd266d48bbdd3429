//! Public projections of engine state.
//!
//! These are the only shapes that ever leave the engine. Opponents' hands
//! and power inventories are reduced to counts here and nowhere else.

use serde::Serialize;

use crate::domain::cards::{Card, Color};
use crate::domain::engine::PlayerId;
use crate::domain::power::PowerCard;

/// Per-seat facts safe for everyone in the room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub card_count: usize,
    pub has_called_uno: bool,
    pub power_card_count: usize,
    pub power_points: u32,
    pub frozen_for_turns: u32,
}

/// Room-wide game state broadcast after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicState {
    pub room_code: String,
    pub players: Vec<PlayerSummary>,
    pub current_player_id: PlayerId,
    /// +1 clockwise, -1 counter-clockwise.
    pub direction: i8,
    pub discard_top: Card,
    pub current_color: Color,
    pub draw_stack: u32,
    /// Unix milliseconds.
    pub started_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_power_draw_player_id: Option<PlayerId>,
}

/// Private power-meter view delivered to one player only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerState {
    pub points: u32,
    pub cards: Vec<PowerCard>,
    pub required_draws: u32,
}
