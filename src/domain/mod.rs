//! Domain layer: pure game rules, the deck factory, and the engine.

pub mod cards;
pub mod deck;
pub mod engine;
pub mod power;
pub mod rules;
pub mod scoring;
pub mod transitions;
pub mod view;

#[cfg(test)]
mod tests_engine;
#[cfg(test)]
mod tests_power;

// Re-exports for ergonomics
pub use cards::{Card, CardId, Color, Value};
pub use engine::{
    DrawOutcome, GameEngine, PlayOutcome, PlayerId, PowerDrawOutcome, RemoveOutcome,
};
pub use power::{PowerCard, PowerCardId, PowerCardType, PowerPlay};
pub use rules::is_legal_play;
pub use view::{PlayerSummary, PowerState, PublicState};
