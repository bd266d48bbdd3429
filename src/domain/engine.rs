//! The per-room authoritative game state machine.
//!
//! Pure and synchronous: no I/O, no clocks besides the start timestamp, no
//! async. The room coordinator owns exactly one engine and is the only
//! caller. Every operation either completes fully or returns a `GameError`
//! with the state untouched.

use std::collections::{HashMap, HashSet};

use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::cards::{Card, CardId, Color, Value};
use crate::domain::deck::{power_bag, standard_deck, GameRng};
use crate::domain::power::{PowerCard, PowerCardType, PowerPlay};
use crate::domain::rules::{
    is_legal_play, CARD_RUSH_PENALTY, FREEZE_TURNS, INITIAL_HAND_SIZE, MAX_PLAYERS, MIN_PLAYERS,
    POWER_CARD_COST, WIN_ON_POWER_EMPTY,
};
use crate::domain::scoring::final_scores;
use crate::domain::view::{PlayerSummary, PowerState, PublicState};
use crate::errors::GameError;

pub type PlayerId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn delta(self) -> i64 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }
}

/// Engine-internal per-player record. Hands keep insertion order so the
/// client can render stably across updates.
#[derive(Debug, Clone)]
pub struct Seat {
    pub id: PlayerId,
    pub name: String,
    pub hand: Vec<Card>,
    pub called_uno: bool,
    pub power_cards: Vec<PowerCard>,
    pub power_points: u32,
    pub played_power_this_turn: bool,
    pub awaiting_power_draw: bool,
    pub pending_skip: Option<u8>,
    pub frozen_turns: u32,
}

impl Seat {
    fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            hand: Vec::new(),
            called_uno: false,
            power_cards: Vec::new(),
            power_points: 0,
            played_power_this_turn: false,
            awaiting_power_draw: false,
            pending_skip: None,
            frozen_turns: 0,
        }
    }

    /// The uno flag tracks "hand is exactly one card" after every mutation
    /// that touches this seat's hand.
    fn refresh_uno(&mut self) {
        self.called_uno = self.hand.len() == 1;
    }

    fn owed_power_draws(&self) -> u32 {
        self.power_points / POWER_CARD_COST
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Effects applied and the turn advanced.
    Continue,
    /// Effects applied, but the actor owes forced power draws; the turn
    /// cursor has not moved.
    PowerDrawRequired,
    Won { winner: PlayerId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOutcome {
    /// May be lower than the penalty when both piles run dry.
    pub cards_drawn: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerDrawOutcome {
    pub card: PowerCard,
    pub remaining_draws: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Continue,
    Won { winner: PlayerId },
    Empty,
}

#[derive(Debug)]
pub struct GameEngine {
    seats: Vec<Seat>,
    /// Draw pile; the last element is the top.
    deck: Vec<Card>,
    /// Discard pile; the last element is the top.
    discard: Vec<Card>,
    power_deck: Vec<PowerCard>,
    turn_index: usize,
    direction: Direction,
    draw_stack: u32,
    current_color: Color,
    pending_power_draw: Option<PlayerId>,
    winner: Option<PlayerId>,
    dirty_hands: HashSet<PlayerId>,
    started_at: OffsetDateTime,
    rng: GameRng,
}

impl GameEngine {
    /// Deal a fresh game. Fails unless 2..=6 players are seated.
    ///
    /// The initial discard is the first non-wild card of the shuffled deck;
    /// wilds surfacing on top are rotated to the bottom and the pile is
    /// reshuffled so `current_color` is well-defined from turn one. The
    /// initial card's action effect is NOT applied: the first player faces
    /// a clean board.
    pub fn start(roster: Vec<(PlayerId, String)>, seed: u64) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&roster.len()) {
            return Err(GameError::InvalidPlayerCount);
        }

        let mut rng = GameRng::new(seed);
        let mut deck = standard_deck(&mut rng);
        let power_deck = power_bag(&mut rng);

        let mut seats: Vec<Seat> = roster
            .into_iter()
            .map(|(id, name)| Seat::new(id, name))
            .collect();

        for seat in &mut seats {
            for _ in 0..INITIAL_HAND_SIZE {
                if let Some(card) = deck.pop() {
                    seat.hand.push(card);
                }
            }
        }

        // Flip the initial discard, rotating wilds to the bottom. The loop
        // is bounded; if the bound is ever hit a colored card is swapped up
        // directly (observationally identical).
        let mut guard = 0;
        while guard < 64 && deck.last().map(|c| c.color.is_wild()).unwrap_or(false) {
            if let Some(wild) = deck.pop() {
                deck.insert(0, wild);
                rng.shuffle(&mut deck);
            }
            guard += 1;
        }
        if deck.last().map(|c| c.color.is_wild()).unwrap_or(true) {
            if let Some(pos) = deck.iter().rposition(|c| !c.color.is_wild()) {
                let last = deck.len() - 1;
                deck.swap(pos, last);
            }
        }
        let initial = deck.pop().ok_or(GameError::InvalidPlayerCount)?;
        let current_color = initial.color;
        let discard = vec![initial];

        let dirty_hands = seats.iter().map(|s| s.id).collect();

        Ok(Self {
            seats,
            deck,
            discard,
            power_deck,
            turn_index: 0,
            direction: Direction::Clockwise,
            draw_stack: 0,
            current_color,
            pending_power_draw: None,
            winner: None,
            dirty_hands,
            started_at: OffsetDateTime::now_utc(),
            rng,
        })
    }

    // --- read surface -----------------------------------------------------

    pub fn current_player(&self) -> PlayerId {
        self.seats[self.turn_index].id
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn pending_power_draw(&self) -> Option<PlayerId> {
        self.pending_power_draw
    }

    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    pub fn hand(&self, player: PlayerId) -> Result<&[Card], GameError> {
        self.seat_index(player)
            .map(|i| self.seats[i].hand.as_slice())
            .ok_or(GameError::UnknownPlayer)
    }

    pub fn power_state(&self, player: PlayerId) -> Result<PowerState, GameError> {
        let seat = self
            .seat_index(player)
            .map(|i| &self.seats[i])
            .ok_or(GameError::UnknownPlayer)?;
        Ok(PowerState {
            points: seat.power_points,
            cards: seat.power_cards.clone(),
            required_draws: if seat.awaiting_power_draw {
                seat.owed_power_draws()
            } else {
                0
            },
        })
    }

    /// (player, hand size) snapshot, used to edge-trigger rush alerts.
    pub fn hand_counts(&self) -> Vec<(PlayerId, usize)> {
        self.seats.iter().map(|s| (s.id, s.hand.len())).collect()
    }

    /// Drain the set of players whose private hand changed since the last
    /// drain.
    pub fn take_dirty_hands(&mut self) -> Vec<PlayerId> {
        self.dirty_hands.drain().collect()
    }

    /// The sole public projection of game state. Opponents' hands and power
    /// inventories are reduced to counts here.
    pub fn public_state(&self, room_code: &str, host: PlayerId) -> PublicState {
        let players = self
            .seats
            .iter()
            .map(|seat| PlayerSummary {
                id: seat.id,
                name: seat.name.clone(),
                is_host: seat.id == host,
                card_count: seat.hand.len(),
                has_called_uno: seat.called_uno,
                power_card_count: seat.power_cards.len(),
                power_points: seat.power_points,
                frozen_for_turns: seat.frozen_turns,
            })
            .collect();

        // A non-empty discard is a start() postcondition.
        let discard_top = self
            .discard
            .last()
            .copied()
            .unwrap_or_else(|| Card::new(self.current_color, Value::Zero));

        PublicState {
            room_code: room_code.to_string(),
            players,
            current_player_id: self.current_player(),
            direction: self.direction.delta() as i8,
            discard_top,
            current_color: self.current_color,
            draw_stack: self.draw_stack,
            started_at: (self.started_at.unix_timestamp_nanos() / 1_000_000) as i64,
            pending_power_draw_player_id: self.pending_power_draw,
        }
    }

    /// Score table for `game_ended`; None until a winner is set.
    pub fn final_scores(&self) -> Option<HashMap<PlayerId, u32>> {
        let winner = self.winner?;
        Some(final_scores(
            self.seats.iter().map(|s| (s.id, s.hand.as_slice())),
            winner,
        ))
    }

    // --- operations -------------------------------------------------------

    pub fn play_card(
        &mut self,
        player: PlayerId,
        card_id: CardId,
        chosen_color: Option<Color>,
    ) -> Result<PlayOutcome, GameError> {
        let idx = self.ensure_turn(player)?;
        self.ensure_no_pending_power()?;

        let pos = self.seats[idx]
            .hand
            .iter()
            .position(|c| c.id == card_id)
            .ok_or(GameError::CardNotInHand)?;
        let card = self.seats[idx].hand[pos];

        let top = self.discard.last().ok_or(GameError::GameNotStarted)?;
        if !is_legal_play(&card, top, self.current_color, self.draw_stack) {
            return Err(GameError::IllegalMove);
        }

        // Wild validation happens before the hand is touched.
        let wild_color = if card.value.is_wild() {
            match chosen_color {
                Some(color) if !color.is_wild() => Some(color),
                _ => return Err(GameError::WildRequiresColor),
            }
        } else {
            None
        };

        let seat = &mut self.seats[idx];
        seat.hand.remove(pos);
        seat.refresh_uno();
        self.discard.push(card);
        self.dirty_hands.insert(player);

        // Win check comes first: no effects, points, or power bookkeeping
        // for the winning play.
        if self.seats[idx].hand.is_empty() {
            self.winner = Some(player);
            return Ok(PlayOutcome::Won { winner: player });
        }

        let mut advance_step: u8 = 1;
        match card.value {
            Value::Skip => {
                self.current_color = card.color;
                advance_step = 2;
            }
            Value::Reverse => {
                self.direction = self.direction.flipped();
                if self.seats.len() == 2 {
                    advance_step = 2;
                }
            }
            Value::DrawTwo => {
                self.draw_stack += 2;
            }
            Value::Wild => {
                // wild_color is Some by the check above
                if let Some(color) = wild_color {
                    self.current_color = color;
                }
            }
            Value::WildFour => {
                if let Some(color) = wild_color {
                    self.current_color = color;
                }
                self.draw_stack += 4;
            }
            _ => {
                self.current_color = card.color;
            }
        }

        self.seats[idx].power_points += card.value.power_points();

        if self.seats[idx].owed_power_draws() >= 1 {
            let seat = &mut self.seats[idx];
            seat.pending_skip = Some(advance_step);
            seat.awaiting_power_draw = true;
            self.pending_power_draw = Some(player);
            return Ok(PlayOutcome::PowerDrawRequired);
        }

        self.advance(u32::from(advance_step));
        Ok(PlayOutcome::Continue)
    }

    /// Draw from the pile: the full penalty stack if one is pending,
    /// otherwise a single card. Drawing always ends the turn.
    pub fn draw(&mut self, player: PlayerId) -> Result<DrawOutcome, GameError> {
        let idx = self.ensure_turn(player)?;
        self.ensure_no_pending_power()?;

        let wanted = if self.draw_stack > 0 {
            self.draw_stack as usize
        } else {
            1
        };
        self.draw_stack = 0;

        let cards = self.draw_from_pile(wanted);
        let drawn = cards.len();
        let seat = &mut self.seats[idx];
        seat.hand.extend(cards);
        seat.refresh_uno();
        self.dirty_hands.insert(player);

        self.advance(1);
        Ok(DrawOutcome { cards_drawn: drawn })
    }

    /// Convert accumulated power points into a power card. While the actor
    /// still owes draws afterwards the turn stays paused; once the meter
    /// drops below the cost the deferred advance happens.
    pub fn draw_power_card(&mut self, player: PlayerId) -> Result<PowerDrawOutcome, GameError> {
        let idx = self.ensure_turn(player)?;

        if self.seats[idx].owed_power_draws() < 1 {
            return Err(GameError::InsufficientPoints);
        }

        let card = self.pop_power_card();

        let seat = &mut self.seats[idx];
        seat.power_cards.push(card);
        seat.power_points = seat.power_points.saturating_sub(POWER_CARD_COST);

        let remaining = seat.owed_power_draws();
        if remaining >= 1 {
            seat.awaiting_power_draw = true;
            self.pending_power_draw = Some(player);
        } else {
            seat.awaiting_power_draw = false;
            let steps = seat.pending_skip.take().unwrap_or(1);
            self.pending_power_draw = None;
            self.advance(u32::from(steps));
        }

        Ok(PowerDrawOutcome {
            card,
            remaining_draws: remaining,
        })
    }

    /// Play a power card. Does not consume the turn; at most one per turn.
    ///
    /// All validation happens before any state is touched, so a failed play
    /// leaves the inventory exactly as it was.
    pub fn play_power_card(
        &mut self,
        player: PlayerId,
        play: PowerPlay,
    ) -> Result<PlayOutcome, GameError> {
        let idx = self.ensure_turn(player)?;
        self.ensure_no_pending_power()?;

        if self.seats[idx].played_power_this_turn {
            return Err(GameError::AlreadyPlayedPowerThisTurn);
        }

        let pos = self.seats[idx]
            .power_cards
            .iter()
            .position(|c| c.id == play.card_id)
            .ok_or(GameError::PowerCardNotFound)?;
        let kind = self.seats[idx].power_cards[pos].kind;

        // Pre-validation phase: compute everything the effect needs, commit
        // only if every check passes.
        let target_idx = match kind {
            PowerCardType::Freeze | PowerCardType::SwapHands => {
                let target = play.target_player_id.ok_or(GameError::MissingTarget)?;
                if target == player {
                    return Err(GameError::MissingTarget);
                }
                Some(self.seat_index(target).ok_or(GameError::MissingTarget)?)
            }
            _ => None,
        };
        let rush_color = match kind {
            PowerCardType::ColorRush => {
                let color = play.color.ok_or(GameError::MissingColor)?;
                if color.is_wild() {
                    return Err(GameError::MissingColor);
                }
                if !self.seats[idx].hand.iter().any(|c| c.color == color) {
                    return Err(GameError::NoMatchingColorInHand);
                }
                Some(color)
            }
            _ => None,
        };

        self.seats[idx].power_cards.remove(pos);
        self.seats[idx].played_power_this_turn = true;

        match kind {
            PowerCardType::CardRush => {
                for other in 0..self.seats.len() {
                    if other == idx {
                        continue;
                    }
                    let cards = self.draw_from_pile(CARD_RUSH_PENALTY);
                    let seat = &mut self.seats[other];
                    seat.hand.extend(cards);
                    seat.refresh_uno();
                    self.dirty_hands.insert(seat.id);
                }
            }
            PowerCardType::Freeze => {
                if let Some(t) = target_idx {
                    self.seats[t].frozen_turns += FREEZE_TURNS;
                }
            }
            PowerCardType::ColorRush => {
                if let Some(color) = rush_color {
                    let seat = &mut self.seats[idx];
                    let mut shed = Vec::new();
                    seat.hand.retain(|c| {
                        if c.color == color {
                            shed.push(*c);
                            false
                        } else {
                            true
                        }
                    });
                    seat.refresh_uno();
                    self.deck.extend(shed);
                    self.rng.shuffle(&mut self.deck);
                    self.dirty_hands.insert(player);
                }
            }
            PowerCardType::SwapHands => {
                if let Some(t) = target_idx {
                    let own = std::mem::take(&mut self.seats[idx].hand);
                    let theirs = std::mem::replace(&mut self.seats[t].hand, own);
                    self.seats[idx].hand = theirs;
                    self.seats[idx].refresh_uno();
                    self.seats[t].refresh_uno();
                    self.dirty_hands.insert(player);
                    self.dirty_hands.insert(self.seats[t].id);
                }
            }
        }

        if WIN_ON_POWER_EMPTY && self.seats[idx].hand.is_empty() {
            self.winner = Some(player);
            return Ok(PlayOutcome::Won { winner: player });
        }

        Ok(PlayOutcome::Continue)
    }

    /// Drop a player from the turn order. Their cards leave the game
    /// entirely; recycling them into the draw pile would leak which hidden
    /// cards were held.
    pub fn remove_player(&mut self, player: PlayerId) -> Result<RemoveOutcome, GameError> {
        let idx = self.seat_index(player).ok_or(GameError::UnknownPlayer)?;

        self.seats.remove(idx);
        self.dirty_hands.remove(&player);

        if self.pending_power_draw == Some(player) {
            self.pending_power_draw = None;
        }

        if self.seats.is_empty() {
            return Ok(RemoveOutcome::Empty);
        }
        if self.seats.len() == 1 {
            let winner = self.seats[0].id;
            self.winner = Some(winner);
            return Ok(RemoveOutcome::Won { winner });
        }

        if idx < self.turn_index {
            self.turn_index -= 1;
        } else if idx == self.turn_index {
            // The cursor now points at whoever sat after the removed player.
            if self.turn_index >= self.seats.len() {
                self.turn_index = 0;
            }
            let seat = &mut self.seats[self.turn_index];
            seat.played_power_this_turn = false;
            seat.called_uno = false;
        }

        Ok(RemoveOutcome::Continue)
    }

    // --- internals --------------------------------------------------------

    fn seat_index(&self, player: PlayerId) -> Option<usize> {
        self.seats.iter().position(|s| s.id == player)
    }

    fn ensure_turn(&self, player: PlayerId) -> Result<usize, GameError> {
        if self.winner.is_some() {
            return Err(GameError::GameEnded);
        }
        let idx = self.seat_index(player).ok_or(GameError::UnknownPlayer)?;
        if idx != self.turn_index {
            return Err(GameError::NotYourTurn);
        }
        Ok(idx)
    }

    fn ensure_no_pending_power(&self) -> Result<(), GameError> {
        if self.pending_power_draw.is_some() {
            return Err(GameError::PowerDrawPending);
        }
        Ok(())
    }

    fn offset_index(&self, from: usize, steps: u32) -> usize {
        let n = self.seats.len() as i64;
        let moved = from as i64 + self.direction.delta() * i64::from(steps);
        moved.rem_euclid(n) as usize
    }

    /// Move the cursor, resolving frozen turns: a frozen player pays one
    /// frozen counter (and any pending draw stack) and is passed over. The
    /// loop is bounded at 4N as a guard against state bugs.
    fn advance(&mut self, steps: u32) {
        self.turn_index = self.offset_index(self.turn_index, steps);

        let bound = 4 * self.seats.len();
        let mut iterations = 0;
        while self.seats[self.turn_index].frozen_turns > 0 && iterations < bound {
            self.seats[self.turn_index].frozen_turns -= 1;
            if self.draw_stack > 0 {
                let penalty = self.draw_stack as usize;
                self.draw_stack = 0;
                let cards = self.draw_from_pile(penalty);
                let seat = &mut self.seats[self.turn_index];
                seat.hand.extend(cards);
                seat.refresh_uno();
                self.dirty_hands.insert(seat.id);
            }
            self.turn_index = self.offset_index(self.turn_index, 1);
            iterations += 1;
        }

        let seat = &mut self.seats[self.turn_index];
        seat.played_power_this_turn = false;
        seat.called_uno = false;
    }

    /// Take up to `wanted` cards off the draw pile, recycling the discard
    /// (minus its top card) when the pile runs dry. May return fewer cards
    /// than requested; never errors.
    fn draw_from_pile(&mut self, wanted: usize) -> Vec<Card> {
        let mut out = Vec::with_capacity(wanted);
        for _ in 0..wanted {
            if self.deck.is_empty() {
                self.replenish_deck();
            }
            match self.deck.pop() {
                Some(card) => out.push(card),
                None => break,
            }
        }
        out
    }

    /// The power deck is an inexhaustible source: a fresh bag is generated
    /// whenever it runs out.
    fn pop_power_card(&mut self) -> PowerCard {
        if self.power_deck.is_empty() {
            self.power_deck = power_bag(&mut self.rng);
        }
        self.power_deck
            .pop()
            .unwrap_or_else(|| PowerCard::new(PowerCardType::CardRush))
    }

    fn replenish_deck(&mut self) {
        if self.discard.len() <= 1 {
            return;
        }
        let top = match self.discard.pop() {
            Some(card) => card,
            None => return,
        };
        self.deck.append(&mut self.discard);
        self.rng.shuffle(&mut self.deck);
        self.discard.push(top);
    }

    // --- test support -----------------------------------------------------

    /// Total cards across hands, deck, and discard (conservation checks).
    #[cfg(test)]
    pub(crate) fn total_cards(&self) -> usize {
        self.seats.iter().map(|s| s.hand.len()).sum::<usize>()
            + self.deck.len()
            + self.discard.len()
    }

    #[cfg(test)]
    pub(crate) fn seats(&self) -> &[Seat] {
        &self.seats
    }

    #[cfg(test)]
    pub(crate) fn seats_mut(&mut self) -> &mut Vec<Seat> {
        &mut self.seats
    }

    #[cfg(test)]
    pub(crate) fn current_color(&self) -> Color {
        self.current_color
    }

    #[cfg(test)]
    pub(crate) fn draw_stack(&self) -> u32 {
        self.draw_stack
    }

    #[cfg(test)]
    pub(crate) fn set_draw_stack(&mut self, stack: u32) {
        self.draw_stack = stack;
    }

    #[cfg(test)]
    pub(crate) fn discard_mut(&mut self) -> &mut Vec<Card> {
        &mut self.discard
    }

    #[cfg(test)]
    pub(crate) fn deck_mut(&mut self) -> &mut Vec<Card> {
        &mut self.deck
    }

    #[cfg(test)]
    pub(crate) fn set_current_color(&mut self, color: Color) {
        self.current_color = color;
    }

    #[cfg(test)]
    pub(crate) fn direction(&self) -> Direction {
        self.direction
    }
}
