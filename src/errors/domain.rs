//! Domain error taxonomy.
//!
//! Two flat enums: `GameError` for engine rule violations, `LobbyError` for
//! room admission and lifecycle failures. Both carry a stable
//! SCREAMING_SNAKE_CASE `code()` and a client-facing `Display` message.
//! Add new codes here; never pass ad-hoc strings to the wire layer.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Rule violations surfaced by the game engine. Engine state is never
/// partially mutated when one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    NotYourTurn,
    GameNotStarted,
    GameEnded,
    PowerDrawPending,
    CardNotInHand,
    IllegalMove,
    WildRequiresColor,
    AlreadyPlayedPowerThisTurn,
    PowerCardNotFound,
    InsufficientPoints,
    MissingTarget,
    MissingColor,
    NoMatchingColorInHand,
    InvalidPlayerCount,
    UnknownPlayer,
}

impl GameError {
    pub fn code(self) -> &'static str {
        match self {
            GameError::NotYourTurn => "NOT_YOUR_TURN",
            GameError::GameNotStarted => "GAME_NOT_STARTED",
            GameError::GameEnded => "GAME_ENDED",
            GameError::PowerDrawPending => "POWER_DRAW_PENDING",
            GameError::CardNotInHand => "CARD_NOT_IN_HAND",
            GameError::IllegalMove => "ILLEGAL_MOVE",
            GameError::WildRequiresColor => "WILD_REQUIRES_COLOR",
            GameError::AlreadyPlayedPowerThisTurn => "ALREADY_PLAYED_POWER_THIS_TURN",
            GameError::PowerCardNotFound => "POWER_CARD_NOT_FOUND",
            GameError::InsufficientPoints => "INSUFFICIENT_POINTS",
            GameError::MissingTarget => "MISSING_TARGET",
            GameError::MissingColor => "MISSING_COLOR",
            GameError::NoMatchingColorInHand => "NO_MATCHING_COLOR_IN_HAND",
            GameError::InvalidPlayerCount => "INVALID_PLAYER_COUNT",
            GameError::UnknownPlayer => "UNKNOWN_PLAYER",
        }
    }
}

impl Display for GameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let msg = match self {
            GameError::NotYourTurn => "It is not your turn",
            GameError::GameNotStarted => "The game has not started",
            GameError::GameEnded => "The game is over",
            GameError::PowerDrawPending => "Draw your power card before continuing",
            GameError::CardNotInHand => "That card is not in your hand",
            GameError::IllegalMove => "That card cannot be played right now",
            GameError::WildRequiresColor => "Playing a wild requires choosing a color",
            GameError::AlreadyPlayedPowerThisTurn => "You already played a power card this turn",
            GameError::PowerCardNotFound => "That power card is not in your inventory",
            GameError::InsufficientPoints => "Not enough power points",
            GameError::MissingTarget => "A target player is required",
            GameError::MissingColor => "A color is required",
            GameError::NoMatchingColorInHand => "You hold no cards of that color",
            GameError::InvalidPlayerCount => "A game needs between 2 and 6 players",
            GameError::UnknownPlayer => "Unknown player",
        };
        f.write_str(msg)
    }
}

impl Error for GameError {}

/// Lobby admission and room lifecycle failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyError {
    RoomNotFound,
    RoomFull,
    NameInUse,
    InvalidName,
    GameInProgress,
    NotHost,
    TooFewPlayers,
    AlreadyStarted,
    AlreadyInRoom,
    NotInRoom,
}

impl LobbyError {
    pub fn code(self) -> &'static str {
        match self {
            LobbyError::RoomNotFound => "ROOM_NOT_FOUND",
            LobbyError::RoomFull => "ROOM_FULL",
            LobbyError::NameInUse => "NAME_IN_USE",
            LobbyError::InvalidName => "INVALID_NAME",
            LobbyError::GameInProgress => "GAME_IN_PROGRESS",
            LobbyError::NotHost => "NOT_HOST",
            LobbyError::TooFewPlayers => "TOO_FEW_PLAYERS",
            LobbyError::AlreadyStarted => "ALREADY_STARTED",
            LobbyError::AlreadyInRoom => "ALREADY_IN_ROOM",
            LobbyError::NotInRoom => "NOT_IN_ROOM",
        }
    }
}

impl Display for LobbyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let msg = match self {
            LobbyError::RoomNotFound => "Room not found",
            LobbyError::RoomFull => "Room full",
            LobbyError::NameInUse => "Name in use",
            LobbyError::InvalidName => "A display name is required",
            LobbyError::GameInProgress => "Game in progress",
            LobbyError::NotHost => "Only the host can do that",
            LobbyError::TooFewPlayers => "At least 2 players are needed to start",
            LobbyError::AlreadyStarted => "The game has already started",
            LobbyError::AlreadyInRoom => "Leave your current room first",
            LobbyError::NotInRoom => "You are not in a room",
        };
        f.write_str(msg)
    }
}

impl Error for LobbyError {}
