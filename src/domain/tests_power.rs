//! Power economy tests: the meter, forced draws, and the four power cards.

use std::collections::HashSet;

use crate::domain::cards::{Color, Value};
use crate::domain::engine::PlayOutcome;
use crate::domain::power::{PowerCardType, PowerPlay};
use crate::domain::rules::POWER_CARD_COST;
use crate::domain::test_gens::{
    clear_played_power, give_power_card, rig_discard_top, rig_hand, seat, set_power_points,
    started_engine,
};
use crate::errors::GameError;

fn power_play(card_id: uuid::Uuid) -> PowerPlay {
    PowerPlay {
        card_id,
        target_player_id: None,
        color: None,
    }
}

#[test]
fn action_cards_accrue_power_points() {
    let (mut engine, ids) = started_engine(3, 5);
    rig_discard_top(&mut engine, Color::Red, Value::Five);
    let cards = rig_hand(
        &mut engine,
        ids[0],
        &[(Color::Red, Value::Skip), (Color::Red, Value::One)],
    );

    engine.play_card(ids[0], cards[0], None).unwrap();
    assert_eq!(seat(&engine, ids[0]).power_points, 1);
}

#[test]
fn crossing_the_meter_forces_a_power_draw() {
    let (mut engine, ids) = started_engine(3, 5);
    rig_discard_top(&mut engine, Color::Red, Value::Five);
    let cards = rig_hand(
        &mut engine,
        ids[0],
        &[(Color::Wild, Value::WildFour), (Color::Red, Value::One)],
    );
    set_power_points(&mut engine, ids[0], 1);

    let outcome = engine
        .play_card(ids[0], cards[0], Some(Color::Green))
        .unwrap();
    assert_eq!(outcome, PlayOutcome::PowerDrawRequired);

    // The turn has not advanced and every other action is refused.
    assert_eq!(engine.current_player(), ids[0]);
    assert_eq!(engine.pending_power_draw(), Some(ids[0]));
    assert_eq!(engine.draw(ids[0]).err(), Some(GameError::PowerDrawPending));
    let other = rig_hand(&mut engine, ids[0], &[(Color::Green, Value::One)]);
    assert_eq!(
        engine.play_card(ids[0], other[0], None).err(),
        Some(GameError::PowerDrawPending)
    );

    // Drawing the owed power card releases the deferred advance.
    let drawn = engine.draw_power_card(ids[0]).unwrap();
    assert_eq!(drawn.remaining_draws, 0);
    assert_eq!(seat(&engine, ids[0]).power_points, 0);
    assert_eq!(seat(&engine, ids[0]).power_cards.len(), 1);
    assert_eq!(engine.pending_power_draw(), None);
    assert_eq!(engine.current_player(), ids[1]);
    // The wild-four stack survives for the next player.
    assert_eq!(engine.draw_stack(), 4);
}

#[test]
fn deferred_skip_count_is_preserved_through_the_power_draw() {
    // A skip would advance two seats; the forced draw must not lose that.
    let (mut engine, ids) = started_engine(4, 5);
    rig_discard_top(&mut engine, Color::Red, Value::Five);
    let cards = rig_hand(
        &mut engine,
        ids[0],
        &[(Color::Red, Value::Skip), (Color::Red, Value::One)],
    );
    set_power_points(&mut engine, ids[0], 3);

    let outcome = engine.play_card(ids[0], cards[0], None).unwrap();
    assert_eq!(outcome, PlayOutcome::PowerDrawRequired);
    assert_eq!(engine.current_player(), ids[0]);

    engine.draw_power_card(ids[0]).unwrap();
    assert_eq!(engine.current_player(), ids[2]);
}

#[test]
fn power_draw_without_points_is_rejected() {
    let (mut engine, ids) = started_engine(2, 5);
    set_power_points(&mut engine, ids[0], POWER_CARD_COST - 1);
    assert_eq!(
        engine.draw_power_card(ids[0]).err(),
        Some(GameError::InsufficientPoints)
    );
}

#[test]
fn multiple_owed_draws_keep_the_turn_paused() {
    let (mut engine, ids) = started_engine(2, 5);
    rig_discard_top(&mut engine, Color::Red, Value::Five);
    let cards = rig_hand(
        &mut engine,
        ids[0],
        &[(Color::Wild, Value::WildFour), (Color::Red, Value::One)],
    );
    set_power_points(&mut engine, ids[0], 5);

    // 5 + 3 = 8 points: two forced draws before the turn may advance.
    engine
        .play_card(ids[0], cards[0], Some(Color::Green))
        .unwrap();
    let first = engine.draw_power_card(ids[0]).unwrap();
    assert_eq!(first.remaining_draws, 1);
    assert_eq!(engine.current_player(), ids[0]);
    assert_eq!(engine.pending_power_draw(), Some(ids[0]));

    let second = engine.draw_power_card(ids[0]).unwrap();
    assert_eq!(second.remaining_draws, 0);
    assert_eq!(seat(&engine, ids[0]).power_cards.len(), 2);
    assert_ne!(engine.current_player(), ids[0]);
}

#[test]
fn power_deck_exhaustion_refills_silently() {
    let (mut engine, ids) = started_engine(2, 5);
    set_power_points(&mut engine, ids[0], 20 * POWER_CARD_COST);
    // Re-enter the pending state so repeated draws stay legal.
    for remaining in (0..20).rev() {
        let drawn = engine.draw_power_card(ids[0]).unwrap();
        assert_eq!(drawn.remaining_draws, remaining);
    }
    // 20 draws exceed one 16-card bag, so a refill happened along the way.
    assert_eq!(seat(&engine, ids[0]).power_cards.len(), 20);
    assert_eq!(seat(&engine, ids[0]).power_points, 0);
}

#[test]
fn card_rush_hits_every_opponent() {
    let (mut engine, ids) = started_engine(4, 5);
    let card = give_power_card(&mut engine, ids[0], PowerCardType::CardRush);
    let counts_before: Vec<usize> = ids.iter().map(|id| engine.hand(*id).unwrap().len()).collect();

    let outcome = engine.play_power_card(ids[0], power_play(card)).unwrap();
    assert_eq!(outcome, PlayOutcome::Continue);

    assert_eq!(engine.hand(ids[0]).unwrap().len(), counts_before[0]);
    for (i, id) in ids.iter().enumerate().skip(1) {
        assert_eq!(engine.hand(*id).unwrap().len(), counts_before[i] + 2);
    }
    // The turn is not consumed by a power card.
    assert_eq!(engine.current_player(), ids[0]);
    assert!(seat(&engine, ids[0]).played_power_this_turn);
}

#[test]
fn one_power_card_per_turn() {
    let (mut engine, ids) = started_engine(3, 5);
    let first = give_power_card(&mut engine, ids[0], PowerCardType::CardRush);
    let second = give_power_card(&mut engine, ids[0], PowerCardType::CardRush);

    engine.play_power_card(ids[0], power_play(first)).unwrap();
    assert_eq!(
        engine.play_power_card(ids[0], power_play(second)).err(),
        Some(GameError::AlreadyPlayedPowerThisTurn)
    );
    // The second card is still in the inventory.
    assert_eq!(seat(&engine, ids[0]).power_cards.len(), 1);
}

#[test]
fn freeze_requires_another_player_as_target() {
    let (mut engine, ids) = started_engine(3, 5);
    let card = give_power_card(&mut engine, ids[0], PowerCardType::Freeze);

    assert_eq!(
        engine.play_power_card(ids[0], power_play(card)).err(),
        Some(GameError::MissingTarget)
    );
    assert_eq!(
        engine
            .play_power_card(
                ids[0],
                PowerPlay {
                    card_id: card,
                    target_player_id: Some(ids[0]),
                    color: None,
                }
            )
            .err(),
        Some(GameError::MissingTarget)
    );
    // Failed validation left the card in the inventory.
    assert_eq!(seat(&engine, ids[0]).power_cards.len(), 1);

    engine
        .play_power_card(
            ids[0],
            PowerPlay {
                card_id: card,
                target_player_id: Some(ids[1]),
                color: None,
            },
        )
        .unwrap();
    assert_eq!(seat(&engine, ids[1]).frozen_turns, 2);
    assert!(seat(&engine, ids[0]).power_cards.is_empty());
}

#[test]
fn color_rush_sheds_the_color_back_into_the_deck() {
    let (mut engine, ids) = started_engine(2, 5);
    rig_hand(
        &mut engine,
        ids[0],
        &[
            (Color::Red, Value::One),
            (Color::Red, Value::Seven),
            (Color::Blue, Value::Three),
        ],
    );
    let card = give_power_card(&mut engine, ids[0], PowerCardType::ColorRush);
    let deck_before = engine.deck_mut().len();

    engine
        .play_power_card(
            ids[0],
            PowerPlay {
                card_id: card,
                target_player_id: None,
                color: Some(Color::Red),
            },
        )
        .unwrap();

    let hand = engine.hand(ids[0]).unwrap();
    assert_eq!(hand.len(), 1);
    assert!(hand.iter().all(|c| c.color != Color::Red));
    assert_eq!(engine.deck_mut().len(), deck_before + 2);
    // One card left: the uno flag flips on.
    assert!(seat(&engine, ids[0]).called_uno);
}

#[test]
fn color_rush_validates_color_and_holdings() {
    let (mut engine, ids) = started_engine(2, 5);
    rig_hand(&mut engine, ids[0], &[(Color::Blue, Value::Three)]);
    let card = give_power_card(&mut engine, ids[0], PowerCardType::ColorRush);

    assert_eq!(
        engine.play_power_card(ids[0], power_play(card)).err(),
        Some(GameError::MissingColor)
    );
    assert_eq!(
        engine
            .play_power_card(
                ids[0],
                PowerPlay {
                    card_id: card,
                    target_player_id: None,
                    color: Some(Color::Red),
                }
            )
            .err(),
        Some(GameError::NoMatchingColorInHand)
    );
    assert_eq!(seat(&engine, ids[0]).power_cards.len(), 1);
}

#[test]
fn color_rush_emptying_the_hand_wins() {
    let (mut engine, ids) = started_engine(2, 5);
    rig_hand(
        &mut engine,
        ids[0],
        &[(Color::Red, Value::One), (Color::Red, Value::Two)],
    );
    let card = give_power_card(&mut engine, ids[0], PowerCardType::ColorRush);

    let outcome = engine
        .play_power_card(
            ids[0],
            PowerPlay {
                card_id: card,
                target_player_id: None,
                color: Some(Color::Red),
            },
        )
        .unwrap();
    assert_eq!(outcome, PlayOutcome::Won { winner: ids[0] });
    assert_eq!(engine.winner(), Some(ids[0]));
}

#[test]
fn swap_hands_exchanges_whole_hands() {
    let (mut engine, ids) = started_engine(2, 5);
    let mine = rig_hand(&mut engine, ids[0], &[(Color::Red, Value::One)]);
    let theirs = rig_hand(
        &mut engine,
        ids[1],
        &[(Color::Blue, Value::Two), (Color::Green, Value::Three)],
    );
    let card = give_power_card(&mut engine, ids[0], PowerCardType::SwapHands);

    engine
        .play_power_card(
            ids[0],
            PowerPlay {
                card_id: card,
                target_player_id: Some(ids[1]),
                color: None,
            },
        )
        .unwrap();

    let own_ids: HashSet<_> = engine.hand(ids[0]).unwrap().iter().map(|c| c.id).collect();
    let other_ids: HashSet<_> = engine.hand(ids[1]).unwrap().iter().map(|c| c.id).collect();
    assert_eq!(own_ids, theirs.iter().copied().collect());
    assert_eq!(other_ids, mine.iter().copied().collect());
    // Both seats' uno flags track their new hand sizes.
    assert!(!seat(&engine, ids[0]).called_uno);
    assert!(seat(&engine, ids[1]).called_uno);
}

#[test]
fn swap_hands_twice_restores_both_hands() {
    let (mut engine, ids) = started_engine(2, 5);
    let mine = rig_hand(
        &mut engine,
        ids[0],
        &[(Color::Red, Value::One), (Color::Red, Value::Two)],
    );
    let theirs = rig_hand(&mut engine, ids[1], &[(Color::Blue, Value::Nine)]);
    let first = give_power_card(&mut engine, ids[0], PowerCardType::SwapHands);
    let second = give_power_card(&mut engine, ids[0], PowerCardType::SwapHands);

    let play = |card_id| PowerPlay {
        card_id,
        target_player_id: Some(ids[1]),
        color: None,
    };
    engine.play_power_card(ids[0], play(first)).unwrap();
    clear_played_power(&mut engine, ids[0]);
    engine.play_power_card(ids[0], play(second)).unwrap();

    let own_ids: HashSet<_> = engine.hand(ids[0]).unwrap().iter().map(|c| c.id).collect();
    let other_ids: HashSet<_> = engine.hand(ids[1]).unwrap().iter().map(|c| c.id).collect();
    assert_eq!(own_ids, mine.iter().copied().collect());
    assert_eq!(other_ids, theirs.iter().copied().collect());
}

#[test]
fn unknown_power_card_is_rejected() {
    let (mut engine, ids) = started_engine(2, 5);
    assert_eq!(
        engine
            .play_power_card(ids[0], power_play(uuid::Uuid::new_v4()))
            .err(),
        Some(GameError::PowerCardNotFound)
    );
}
