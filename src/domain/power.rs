//! Power-card types and the play request shape.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cards::Color;
use crate::domain::engine::PlayerId;

pub type PowerCardId = Uuid;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerCardType {
    /// Every opponent draws two cards.
    CardRush,
    /// Target forfeits their next two turns.
    Freeze,
    /// Shed every card of a chosen color back into the draw pile.
    ColorRush,
    /// Exchange entire hands with a target.
    SwapHands,
}

impl PowerCardType {
    pub const ALL: [PowerCardType; 4] = [
        PowerCardType::CardRush,
        PowerCardType::Freeze,
        PowerCardType::ColorRush,
        PowerCardType::SwapHands,
    ];
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PowerCard {
    pub id: PowerCardId,
    #[serde(rename = "type")]
    pub kind: PowerCardType,
}

impl PowerCard {
    pub fn new(kind: PowerCardType) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
        }
    }
}

/// Client request to play a power card. Target and color are only
/// meaningful for the kinds that need them.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PowerPlay {
    pub card_id: PowerCardId,
    pub target_player_id: Option<PlayerId>,
    pub color: Option<Color>,
}
