//! Deck factory: the 108-card standard deck and the power-card bag.

use crate::domain::cards::{Card, Color, Value};
use crate::domain::power::{PowerCard, PowerCardType};

/// Copies of each power-card type per bag. The bag is regenerated on
/// exhaustion, so the size only affects how often the mix resets.
const POWER_BAG_COPIES: usize = 4;

/// Deterministic RNG for shuffling.
///
/// SplitMix64: fast, well-distributed, and reproducible from a seed so
/// tests can replay a whole game.
#[derive(Debug, Clone)]
pub struct GameRng {
    state: u64,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.state;
        z ^= z >> 30;
        z = z.wrapping_mul(0xBF58476D1CE4E5B9);
        z ^= z >> 27;
        z = z.wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    /// Uniform value in `0..max` via rejection sampling (no modulo bias).
    fn next_range(&mut self, max: usize) -> usize {
        let m = max as u64;
        let limit = u64::MAX - (u64::MAX % m);
        loop {
            let x = self.next();
            if x < limit {
                return (x % m) as usize;
            }
        }
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_range(i + 1);
            items.swap(i, j);
        }
    }
}

/// Build and shuffle the standard 108-card deck: per color one 0, two each
/// of 1-9 and skip/reverse/draw2, plus four wilds and four wild-draw-fours.
pub fn standard_deck(rng: &mut GameRng) -> Vec<Card> {
    let mut deck = Vec::with_capacity(108);
    for color in Color::CHOOSABLE {
        deck.push(Card::new(color, Value::Zero));
        for value in &Value::DIGITS[1..] {
            deck.push(Card::new(color, *value));
            deck.push(Card::new(color, *value));
        }
        for value in [Value::Skip, Value::Reverse, Value::DrawTwo] {
            deck.push(Card::new(color, value));
            deck.push(Card::new(color, value));
        }
    }
    for _ in 0..4 {
        deck.push(Card::new(Color::Wild, Value::Wild));
        deck.push(Card::new(Color::Wild, Value::WildFour));
    }
    rng.shuffle(&mut deck);
    deck
}

/// One shuffled power-card bag with fresh ids, uniform over the four types.
pub fn power_bag(rng: &mut GameRng) -> Vec<PowerCard> {
    let mut bag = Vec::with_capacity(POWER_BAG_COPIES * PowerCardType::ALL.len());
    for kind in PowerCardType::ALL {
        for _ in 0..POWER_BAG_COPIES {
            bag.push(PowerCard::new(kind));
        }
    }
    rng.shuffle(&mut bag);
    bag
}
