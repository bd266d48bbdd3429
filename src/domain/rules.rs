//! Game constants and the move-legality predicate.

use crate::domain::cards::{Card, Color};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;
pub const INITIAL_HAND_SIZE: usize = 7;

/// Points required per forced power-card draw.
pub const POWER_CARD_COST: u32 = 4;
/// Own-turns forfeited per freeze.
pub const FREEZE_TURNS: u32 = 2;
/// Cards each opponent draws on a card rush.
pub const CARD_RUSH_PENALTY: usize = 2;

/// Whether emptying one's hand via colorRush/swapHands counts as a win.
pub const WIN_ON_POWER_EMPTY: bool = true;

/// Is `card` legal on top of `top` given the active color and any pending
/// draw stack?
///
/// While a draw stack is pending, only stacking cards (draw2/wild4) are
/// legal, in either combination. Otherwise a card matches by wildness,
/// color, or face value.
pub fn is_legal_play(card: &Card, top: &Card, current_color: Color, draw_stack: u32) -> bool {
    if draw_stack > 0 {
        return card.value.is_draw();
    }
    card.color.is_wild() || card.color == current_color || card.value == top.value
}
