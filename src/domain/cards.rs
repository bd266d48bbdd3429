//! Core card types: Color, Value, Card.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque per-match card identity. Clients use it for animation
/// reconciliation only; ids are minted at game start and die with the game.
pub type CardId = Uuid;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Yellow,
    Green,
    Blue,
    Wild,
}

impl Color {
    /// The four concrete colors a wild card may choose from.
    pub const CHOOSABLE: [Color; 4] = [Color::Red, Color::Yellow, Color::Green, Color::Blue];

    pub fn is_wild(self) -> bool {
        self == Color::Wild
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Value {
    #[serde(rename = "0")]
    Zero,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "skip")]
    Skip,
    #[serde(rename = "reverse")]
    Reverse,
    #[serde(rename = "draw2")]
    DrawTwo,
    #[serde(rename = "wild")]
    Wild,
    #[serde(rename = "wild4")]
    WildFour,
}

impl Value {
    pub const DIGITS: [Value; 10] = [
        Value::Zero,
        Value::One,
        Value::Two,
        Value::Three,
        Value::Four,
        Value::Five,
        Value::Six,
        Value::Seven,
        Value::Eight,
        Value::Nine,
    ];

    /// Digit value for number cards, None for action cards.
    pub fn digit(self) -> Option<u32> {
        match self {
            Value::Zero => Some(0),
            Value::One => Some(1),
            Value::Two => Some(2),
            Value::Three => Some(3),
            Value::Four => Some(4),
            Value::Five => Some(5),
            Value::Six => Some(6),
            Value::Seven => Some(7),
            Value::Eight => Some(8),
            Value::Nine => Some(9),
            _ => None,
        }
    }

    /// True for the two values that may be stacked onto a pending draw stack.
    pub fn is_draw(self) -> bool {
        matches!(self, Value::DrawTwo | Value::WildFour)
    }

    pub fn is_wild(self) -> bool {
        matches!(self, Value::Wild | Value::WildFour)
    }

    /// Power-meter points earned by playing this value.
    pub fn power_points(self) -> u32 {
        match self {
            Value::Skip | Value::Reverse => 1,
            Value::DrawTwo | Value::Wild => 2,
            Value::WildFour => 3,
            _ => 0,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub color: Color,
    pub value: Value,
}

impl Card {
    pub fn new(color: Color, value: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            color,
            value,
        }
    }
}
