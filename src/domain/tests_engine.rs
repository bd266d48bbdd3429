//! Engine unit tests: start preconditions, card effects, drawing, turn
//! order, and player removal.

use crate::domain::cards::{Color, Value};
use crate::domain::engine::{Direction, GameEngine, PlayOutcome, RemoveOutcome};
use crate::domain::rules::INITIAL_HAND_SIZE;
use crate::domain::test_gens::{
    named_roster, rig_discard_top, rig_hand, seat, set_frozen, started_engine,
};
use crate::errors::GameError;

#[test]
fn start_rejects_too_few_and_too_many_players() {
    assert_eq!(
        GameEngine::start(named_roster(1), 1).err(),
        Some(GameError::InvalidPlayerCount)
    );
    assert_eq!(
        GameEngine::start(named_roster(7), 1).err(),
        Some(GameError::InvalidPlayerCount)
    );
    assert!(GameEngine::start(named_roster(2), 1).is_ok());
    assert!(GameEngine::start(named_roster(6), 1).is_ok());
}

#[test]
fn start_deals_seven_cards_each_and_flips_a_colored_card() {
    for seed in 0..40 {
        let (engine, ids) = started_engine(4, seed);
        for id in &ids {
            assert_eq!(engine.hand(*id).unwrap().len(), INITIAL_HAND_SIZE);
        }
        // The initial discard seeds the active color, so it cannot be wild.
        assert_ne!(engine.current_color(), Color::Wild);
        assert_eq!(engine.total_cards(), 108);
        assert_eq!(engine.current_player(), ids[0]);
        assert_eq!(engine.direction(), Direction::Clockwise);
    }
}

#[test]
fn number_card_sets_color_and_advances_one() {
    let (mut engine, ids) = started_engine(3, 11);
    rig_discard_top(&mut engine, Color::Red, Value::Five);
    let cards = rig_hand(
        &mut engine,
        ids[0],
        &[(Color::Blue, Value::Five), (Color::Red, Value::One)],
    );

    let outcome = engine.play_card(ids[0], cards[0], None).unwrap();
    assert_eq!(outcome, PlayOutcome::Continue);
    assert_eq!(engine.current_color(), Color::Blue);
    assert_eq!(engine.current_player(), ids[1]);
}

#[test]
fn skip_advances_two() {
    let (mut engine, ids) = started_engine(4, 11);
    rig_discard_top(&mut engine, Color::Green, Value::Two);
    let cards = rig_hand(
        &mut engine,
        ids[0],
        &[(Color::Green, Value::Skip), (Color::Green, Value::One)],
    );

    engine.play_card(ids[0], cards[0], None).unwrap();
    assert_eq!(engine.current_player(), ids[2]);
}

#[test]
fn reverse_flips_direction() {
    let (mut engine, ids) = started_engine(4, 11);
    rig_discard_top(&mut engine, Color::Green, Value::Two);
    let cards = rig_hand(
        &mut engine,
        ids[0],
        &[(Color::Green, Value::Reverse), (Color::Green, Value::One)],
    );

    engine.play_card(ids[0], cards[0], None).unwrap();
    assert_eq!(engine.direction(), Direction::CounterClockwise);
    // One step backwards from seat 0 wraps to the last seat.
    assert_eq!(engine.current_player(), ids[3]);
}

#[test]
fn draw_two_leaves_the_active_color_alone() {
    let (mut engine, ids) = started_engine(3, 11);
    rig_discard_top(&mut engine, Color::Red, Value::DrawTwo);
    // Legal by value match even though the printed color differs.
    let cards = rig_hand(
        &mut engine,
        ids[0],
        &[(Color::Blue, Value::DrawTwo), (Color::Red, Value::One)],
    );

    engine.play_card(ids[0], cards[0], None).unwrap();
    assert_eq!(engine.draw_stack(), 2);
    assert_eq!(engine.current_color(), Color::Red);
    assert_eq!(engine.current_player(), ids[1]);
}

#[test]
fn wild_requires_color() {
    let (mut engine, ids) = started_engine(2, 11);
    rig_discard_top(&mut engine, Color::Green, Value::Two);
    let cards = rig_hand(
        &mut engine,
        ids[0],
        &[(Color::Wild, Value::Wild), (Color::Green, Value::One)],
    );

    assert_eq!(
        engine.play_card(ids[0], cards[0], None).err(),
        Some(GameError::WildRequiresColor)
    );
    assert_eq!(
        engine
            .play_card(ids[0], cards[0], Some(Color::Wild))
            .err(),
        Some(GameError::WildRequiresColor)
    );
    // The failed attempts left the hand alone.
    assert_eq!(engine.hand(ids[0]).unwrap().len(), 2);

    engine
        .play_card(ids[0], cards[0], Some(Color::Yellow))
        .unwrap();
    assert_eq!(engine.current_color(), Color::Yellow);
}

#[test]
fn illegal_card_is_rejected_without_mutation() {
    let (mut engine, ids) = started_engine(2, 11);
    rig_discard_top(&mut engine, Color::Red, Value::Five);
    let cards = rig_hand(
        &mut engine,
        ids[0],
        &[(Color::Blue, Value::Nine), (Color::Red, Value::One)],
    );

    assert_eq!(
        engine.play_card(ids[0], cards[0], None).err(),
        Some(GameError::IllegalMove)
    );
    assert_eq!(engine.hand(ids[0]).unwrap().len(), 2);
    assert_eq!(engine.current_player(), ids[0]);
}

#[test]
fn out_of_turn_players_are_rejected() {
    let (mut engine, ids) = started_engine(3, 11);
    let cards = rig_hand(&mut engine, ids[1], &[(Color::Red, Value::One)]);

    assert_eq!(
        engine.play_card(ids[1], cards[0], None).err(),
        Some(GameError::NotYourTurn)
    );
    assert_eq!(engine.draw(ids[1]).err(), Some(GameError::NotYourTurn));
    assert_eq!(
        engine.draw_power_card(ids[1]).err(),
        Some(GameError::NotYourTurn)
    );
}

#[test]
fn unknown_card_is_rejected() {
    let (mut engine, ids) = started_engine(2, 11);
    let ghost = uuid::Uuid::new_v4();
    assert_eq!(
        engine.play_card(ids[0], ghost, None).err(),
        Some(GameError::CardNotInHand)
    );
}

#[test]
fn draw_takes_one_card_and_ends_the_turn() {
    let (mut engine, ids) = started_engine(2, 11);
    let before = engine.hand(ids[0]).unwrap().len();

    let outcome = engine.draw(ids[0]).unwrap();
    assert_eq!(outcome.cards_drawn, 1);
    assert_eq!(engine.hand(ids[0]).unwrap().len(), before + 1);
    assert_eq!(engine.current_player(), ids[1]);
}

#[test]
fn draw_pays_the_full_stack() {
    let (mut engine, ids) = started_engine(3, 11);
    rig_discard_top(&mut engine, Color::Red, Value::DrawTwo);
    engine.set_draw_stack(4);
    let before = engine.hand(ids[0]).unwrap().len();

    let outcome = engine.draw(ids[0]).unwrap();
    assert_eq!(outcome.cards_drawn, 4);
    assert_eq!(engine.hand(ids[0]).unwrap().len(), before + 4);
    assert_eq!(engine.draw_stack(), 0);
    assert_eq!(engine.current_player(), ids[1]);
}

#[test]
fn draw_returns_fewer_cards_when_piles_run_dry() {
    let (mut engine, ids) = started_engine(2, 11);
    // One card in the draw pile, only the top card in the discard.
    engine.deck_mut().truncate(1);
    let top = engine.discard_mut().pop().unwrap();
    engine.discard_mut().clear();
    engine.discard_mut().push(top);
    engine.set_draw_stack(5);
    rig_discard_top(&mut engine, Color::Red, Value::DrawTwo);

    let outcome = engine.draw(ids[0]).unwrap();
    assert!(outcome.cards_drawn < 5);
    assert_eq!(engine.current_player(), ids[1]);
}

#[test]
fn empty_deck_recycles_discard_minus_top() {
    let (mut engine, ids) = started_engine(2, 11);
    // Move the whole draw pile onto the discard, leaving the deck empty.
    let deck_cards: Vec<_> = engine.deck_mut().drain(..).collect();
    engine.discard_mut().extend(deck_cards);
    let top_before = *engine.discard_mut().last().unwrap();
    let discard_size = engine.discard_mut().len();

    engine.draw(ids[0]).unwrap();

    // The old top is still the discard top; the rest became the draw pile.
    assert_eq!(*engine.discard_mut().last().unwrap(), top_before);
    assert_eq!(engine.discard_mut().len(), 1);
    assert_eq!(engine.deck_mut().len(), discard_size - 2);
    assert_eq!(engine.total_cards(), 108);
}

#[test]
fn winning_play_skips_effects() {
    let (mut engine, ids) = started_engine(3, 11);
    rig_discard_top(&mut engine, Color::Red, Value::Five);
    let cards = rig_hand(&mut engine, ids[0], &[(Color::Red, Value::DrawTwo)]);

    let outcome = engine.play_card(ids[0], cards[0], None).unwrap();
    assert_eq!(outcome, PlayOutcome::Won { winner: ids[0] });
    assert_eq!(engine.winner(), Some(ids[0]));
    // No draw-two effect is applied on the winning play.
    assert_eq!(engine.draw_stack(), 0);
    // The engine accepts no further mutations.
    assert_eq!(engine.draw(ids[1]).err(), Some(GameError::GameEnded));
}

#[test]
fn frozen_player_is_skipped_and_pays_the_stack() {
    let (mut engine, ids) = started_engine(3, 11);
    rig_discard_top(&mut engine, Color::Blue, Value::Two);
    let cards = rig_hand(
        &mut engine,
        ids[0],
        &[(Color::Blue, Value::DrawTwo), (Color::Blue, Value::One)],
    );
    set_frozen(&mut engine, ids[1], 1);
    let frozen_before = engine.hand(ids[1]).unwrap().len();

    engine.play_card(ids[0], cards[0], None).unwrap();

    assert_eq!(seat(&engine, ids[1]).frozen_turns, 0);
    assert_eq!(engine.hand(ids[1]).unwrap().len(), frozen_before + 2);
    assert_eq!(engine.draw_stack(), 0);
    assert_eq!(engine.current_player(), ids[2]);
}

#[test]
fn multi_turn_freeze_consumes_one_per_entry() {
    let (mut engine, ids) = started_engine(2, 11);
    rig_discard_top(&mut engine, Color::Blue, Value::Two);
    set_frozen(&mut engine, ids[1], 2);

    // A draws and ends the turn; B is frozen so it comes straight back.
    engine.draw(ids[0]).unwrap();
    assert_eq!(engine.current_player(), ids[0]);
    assert_eq!(seat(&engine, ids[1]).frozen_turns, 1);

    engine.draw(ids[0]).unwrap();
    assert_eq!(engine.current_player(), ids[0]);
    assert_eq!(seat(&engine, ids[1]).frozen_turns, 0);

    engine.draw(ids[0]).unwrap();
    assert_eq!(engine.current_player(), ids[1]);
}

#[test]
fn remove_player_keeps_cursor_on_successor() {
    let (mut engine, ids) = started_engine(4, 11);
    // Current player leaves; the next seat in order becomes current.
    let outcome = engine.remove_player(ids[0]).unwrap();
    assert_eq!(outcome, RemoveOutcome::Continue);
    assert_eq!(engine.current_player(), ids[1]);
    assert_eq!(engine.player_count(), 3);
}

#[test]
fn remove_earlier_seat_does_not_shift_the_turn() {
    let (mut engine, ids) = started_engine(4, 11);
    engine.draw(ids[0]).unwrap();
    assert_eq!(engine.current_player(), ids[1]);

    engine.remove_player(ids[0]).unwrap();
    assert_eq!(engine.current_player(), ids[1]);
}

#[test]
fn last_remaining_player_wins() {
    let (mut engine, ids) = started_engine(3, 11);
    engine.remove_player(ids[2]).unwrap();
    let outcome = engine.remove_player(ids[1]).unwrap();
    assert_eq!(outcome, RemoveOutcome::Won { winner: ids[0] });
    assert_eq!(engine.winner(), Some(ids[0]));
}

#[test]
fn dirty_hands_drain_once() {
    let (mut engine, ids) = started_engine(2, 11);
    engine.take_dirty_hands();

    engine.draw(ids[0]).unwrap();
    let dirty = engine.take_dirty_hands();
    assert_eq!(dirty, vec![ids[0]]);
    assert!(engine.take_dirty_hands().is_empty());
}

#[test]
fn uno_flag_follows_hand_size() {
    let (mut engine, ids) = started_engine(3, 11);
    rig_discard_top(&mut engine, Color::Red, Value::Five);
    let cards = rig_hand(
        &mut engine,
        ids[0],
        &[(Color::Red, Value::One), (Color::Red, Value::Two)],
    );

    engine.play_card(ids[0], cards[0], None).unwrap();
    assert!(seat(&engine, ids[0]).called_uno);
}

#[test]
fn public_state_exposes_counts_only() {
    let (mut engine, ids) = started_engine(3, 11);
    let state = engine.public_state("AB12CD", ids[0]);

    assert_eq!(state.room_code, "AB12CD");
    assert_eq!(state.players.len(), 3);
    assert_eq!(state.current_player_id, ids[0]);
    assert_eq!(state.direction, 1);
    for summary in &state.players {
        assert_eq!(summary.card_count, INITIAL_HAND_SIZE);
        assert_eq!(summary.power_card_count, 0);
    }
    assert!(state.players[0].is_host);
    assert!(!state.players[1].is_host);

    // The serialized form carries no hand or inventory contents.
    let json = serde_json::to_string(&state).unwrap();
    assert!(!json.contains("\"hand\""));
    assert!(!json.contains("\"power_cards\""));
    engine.take_dirty_hands();
}
