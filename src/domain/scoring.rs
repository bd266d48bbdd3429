//! End-of-game score computation.

use std::collections::HashMap;

use crate::domain::cards::{Card, Value};
use crate::domain::engine::PlayerId;

/// Point value of a card left in a losing hand: digits at face value,
/// colored action cards 20, wilds 50.
pub fn card_score(value: Value) -> u32 {
    match value.digit() {
        Some(d) => d,
        None => match value {
            Value::Skip | Value::Reverse | Value::DrawTwo => 20,
            Value::Wild | Value::WildFour => 50,
            _ => 0,
        },
    }
}

/// Score table for `game_ended`: each non-winner is charged the points left
/// in their hand, and the winner captures the sum of all of them.
/// Pure computation; no game state is touched.
pub fn final_scores<'a, I>(hands: I, winner: PlayerId) -> HashMap<PlayerId, u32>
where
    I: IntoIterator<Item = (PlayerId, &'a [Card])>,
{
    let mut scores = HashMap::new();
    let mut captured = 0u32;
    for (player, hand) in hands {
        if player == winner {
            continue;
        }
        let points: u32 = hand.iter().map(|c| card_score(c.value)).sum();
        captured += points;
        scores.insert(player, points);
    }
    scores.insert(winner, captured);
    scores
}
