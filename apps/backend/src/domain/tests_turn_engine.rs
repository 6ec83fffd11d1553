//! Turn engine transitions: preconditions, effects, refill and termination.

use time::Duration;

use crate::domain::actions::PlayerAction;
use crate::domain::state::{EndReason, MatchOutcome};
use crate::domain::test_state_helpers::{arranged_match, c, t0, P0, P1, STAKE};
use crate::domain::turn_engine::{
    check_terminal, expire_if_due, forfeit, handle_action, refill, ActionOutcome, Resolution,
};
use crate::domain::Suit;

fn attack(token: &str) -> PlayerAction {
    PlayerAction::Attack { card: c(token) }
}

fn defend(pair: usize, token: &str) -> PlayerAction {
    PlayerAction::Defend {
        pair: Some(pair),
        card: c(token),
    }
}

fn applied() -> ActionOutcome {
    ActionOutcome::Applied {
        resolution: None,
        ended: None,
    }
}

#[test]
fn attack_moves_card_to_table_and_resets_deadline() {
    let mut m = arranged_match([&["7C", "8C"], &["9C", "AH"]], &["6D", "6H"], Suit::Spades, 0);
    let later = t0() + Duration::seconds(30);

    assert_eq!(handle_action(&mut m, P0, attack("7C"), later), applied());
    assert_eq!(m.table.pairs().len(), 1);
    assert!(!m.hand(0).contains(c("7C")));
    assert_eq!(m.deadline, later + m.action_window);
    assert!(m.is_conserved());
}

#[test]
fn wrong_actor_and_unheld_card_are_rejected_without_mutation() {
    let mut m = arranged_match([&["7C", "8C"], &["9C", "AH"]], &["6D"], Suit::Spades, 0);
    let before = m.clone();

    assert_eq!(handle_action(&mut m, P1, attack("9C"), t0()), ActionOutcome::Rejected);
    assert_eq!(handle_action(&mut m, P0, attack("AH"), t0()), ActionOutcome::Rejected);
    assert_eq!(handle_action(&mut m, P0, PlayerAction::Take, t0()), ActionOutcome::Rejected);
    assert_eq!(handle_action(&mut m, P0, PlayerAction::Bito, t0()), ActionOutcome::Rejected);

    assert_eq!(m.hands, before.hands);
    assert_eq!(m.table, before.table);
    assert_eq!(m.deadline, before.deadline);
}

#[test]
fn non_participant_is_ignored() {
    let mut m = arranged_match([&["7C"], &["9C"]], &["6D"], Suit::Spades, 0);
    assert_eq!(handle_action(&mut m, 999, attack("7C"), t0()), ActionOutcome::Ignored);
    assert!(m.table.is_empty());
}

#[test]
fn same_rank_throw_constraint() {
    let mut m = arranged_match(
        [&["7C", "7D", "8D"], &["6H", "9H", "TH", "JH"]],
        &["6D"],
        Suit::Spades,
        0,
    );
    assert_eq!(handle_action(&mut m, P0, attack("7C"), t0()), applied());
    assert_eq!(handle_action(&mut m, P0, attack("8D"), t0()), ActionOutcome::Rejected);
    assert_eq!(handle_action(&mut m, P0, attack("7D"), t0()), applied());
    assert_eq!(m.table.open_count(), 2);
}

#[test]
fn defense_rank_unlocks_throws() {
    let mut m = arranged_match(
        [&["7C", "8D"], &["8C", "9H", "TH"]],
        &["6D"],
        Suit::Spades,
        0,
    );
    handle_action(&mut m, P0, attack("7C"), t0());
    assert_eq!(handle_action(&mut m, P1, defend(0, "8C"), t0()), applied());
    assert_eq!(handle_action(&mut m, P0, attack("8D"), t0()), applied());
}

#[test]
fn trick_is_capped_by_defender_hand() {
    let mut m = arranged_match(
        [&["7C", "7D", "7H"], &["AS", "KS"]],
        &["6D"],
        Suit::Hearts,
        0,
    );
    assert_eq!(handle_action(&mut m, P0, attack("7C"), t0()), applied());
    assert_eq!(handle_action(&mut m, P0, attack("7D"), t0()), applied());
    assert_eq!(handle_action(&mut m, P0, attack("7H"), t0()), ActionOutcome::Rejected);
}

#[test]
fn covered_pairs_still_count_toward_the_trick_limit() {
    let mut m = arranged_match(
        [
            &["6C", "9D", "TH", "JC", "QD", "KH", "AC"],
            &["9C", "TD", "JH", "QC", "KD", "AH", "6S", "7S"],
        ],
        &["7D"],
        Suit::Spades,
        0,
    );
    let rounds = [("6C", "9C"), ("9D", "TD"), ("TH", "JH"), ("JC", "QC")];
    for (pair, (lead, cover)) in rounds.into_iter().enumerate() {
        assert_eq!(handle_action(&mut m, P0, attack(lead), t0()), applied());
        assert_eq!(handle_action(&mut m, P1, defend(pair, cover), t0()), applied());
    }

    // Four pairs on the table and four cards in the defender's hand.
    assert_eq!(m.table.len(), 4);
    assert!(!m.table.has_open());
    assert_eq!(m.hand(1).len(), 4);
    assert_eq!(handle_action(&mut m, P0, attack("QD"), t0()), ActionOutcome::Rejected);
    assert_eq!(m.table.len(), 4);
}

#[test]
fn beat_rule_examples_through_defend() {
    // trump spades, attack 6H
    let mut m = arranged_match(
        [&["6H", "KH"], &["9H", "6D", "6S", "AC"]],
        &["7D"],
        Suit::Spades,
        0,
    );
    handle_action(&mut m, P0, attack("6H"), t0());
    assert_eq!(handle_action(&mut m, P1, defend(0, "6D"), t0()), ActionOutcome::Rejected);
    assert_eq!(handle_action(&mut m, P1, defend(0, "9H"), t0()), applied());

    let mut m = arranged_match(
        [&["KH", "6H"], &["6S", "AC"]],
        &["7D"],
        Suit::Spades,
        0,
    );
    handle_action(&mut m, P0, attack("KH"), t0());
    assert_eq!(handle_action(&mut m, P1, defend(0, "AC"), t0()), ActionOutcome::Rejected);
    assert_eq!(handle_action(&mut m, P1, defend(0, "6S"), t0()), applied());
}

#[test]
fn defend_targets_first_open_pair_when_unspecified() {
    let mut m = arranged_match(
        [&["7C", "7D"], &["8D", "AS", "KS"]],
        &["6H"],
        Suit::Spades,
        0,
    );
    handle_action(&mut m, P0, attack("7C"), t0());
    handle_action(&mut m, P0, attack("7D"), t0());

    // First open pair is 7C; 8D cannot beat it.
    let no_index = PlayerAction::Defend {
        pair: None,
        card: c("8D"),
    };
    assert_eq!(handle_action(&mut m, P1, no_index, t0()), ActionOutcome::Rejected);
    assert_eq!(handle_action(&mut m, P1, defend(1, "8D"), t0()), applied());

    let no_index = PlayerAction::Defend {
        pair: None,
        card: c("KS"),
    };
    assert_eq!(handle_action(&mut m, P1, no_index, t0()), applied());
    assert!(!m.table.has_open());
}

#[test]
fn defending_a_covered_pair_is_rejected() {
    let mut m = arranged_match([&["7C"], &["8C", "9C"]], &["6H"], Suit::Spades, 0);
    handle_action(&mut m, P0, attack("7C"), t0());
    handle_action(&mut m, P1, defend(0, "8C"), t0());
    assert_eq!(handle_action(&mut m, P1, defend(0, "9C"), t0()), ActionOutcome::Rejected);
    assert_eq!(handle_action(&mut m, P1, defend(3, "9C"), t0()), ActionOutcome::Rejected);
}

#[test]
fn take_moves_table_to_defender_and_keeps_roles() {
    let mut m = arranged_match(
        [&["7C", "7D", "QH"], &["8C", "AH"]],
        &["6D", "6C", "6H", "9S"],
        Suit::Spades,
        0,
    );
    handle_action(&mut m, P0, attack("7C"), t0());
    handle_action(&mut m, P1, defend(0, "8C"), t0());
    handle_action(&mut m, P0, attack("7D"), t0());

    let outcome = handle_action(&mut m, P1, PlayerAction::Take, t0());
    assert_eq!(
        outcome,
        ActionOutcome::Applied {
            resolution: Some(Resolution::Took { cards: 3 }),
            ended: None,
        }
    );
    assert!(m.table.is_empty());
    assert_eq!(m.attacker, 0);
    // Attacker had 1 card, drew all 4 from the deck; defender took 3 (AH + 3 = 4).
    assert_eq!(m.hand(0).len(), 5);
    assert_eq!(m.hand(1).len(), 4);
    assert!(m.hand(1).contains(c("7C")));
    assert!(m.deck.is_empty());
    assert!(m.is_conserved());
}

#[test]
fn take_requires_an_open_pair() {
    let mut m = arranged_match([&["7C"], &["8C", "AH"]], &["6D"], Suit::Spades, 0);
    assert_eq!(handle_action(&mut m, P1, PlayerAction::Take, t0()), ActionOutcome::Rejected);
    handle_action(&mut m, P0, attack("7C"), t0());
    handle_action(&mut m, P1, defend(0, "8C"), t0());
    assert_eq!(handle_action(&mut m, P1, PlayerAction::Take, t0()), ActionOutcome::Rejected);
}

#[test]
fn bito_discards_refills_attacker_first_then_swaps() {
    let mut m = arranged_match(
        [&["7C", "QH", "KH", "AH", "9D", "TD"], &["8C", "6S", "7S", "8S", "9S", "TS"]],
        &["6H", "6D"],
        Suit::Spades,
        0,
    );
    handle_action(&mut m, P0, attack("7C"), t0());
    handle_action(&mut m, P1, defend(0, "8C"), t0());
    let outcome = handle_action(&mut m, P0, PlayerAction::Bito, t0());

    assert_eq!(
        outcome,
        ActionOutcome::Applied {
            resolution: Some(Resolution::Discarded { pairs: 1 }),
            ended: None,
        }
    );
    assert_eq!(m.discarded, 36 - 14 + 2);
    // Outgoing attacker drew the top card before the defender.
    assert!(m.hand(0).contains(c("6D")));
    assert!(m.hand(1).contains(c("6H")));
    assert_eq!(m.attacker, 1);
    assert!(m.is_conserved());
}

#[test]
fn bito_rejected_with_open_pairs_or_empty_table() {
    let mut m = arranged_match([&["7C"], &["8D", "AH"]], &["6D"], Suit::Spades, 0);
    assert_eq!(handle_action(&mut m, P0, PlayerAction::Bito, t0()), ActionOutcome::Rejected);
    handle_action(&mut m, P0, attack("7C"), t0());
    assert_eq!(handle_action(&mut m, P0, PlayerAction::Bito, t0()), ActionOutcome::Rejected);
}

#[test]
fn refill_favours_attacker_near_exhaustion() {
    let mut m = arranged_match([&["7C"], &["8C"]], &["6D", "6H", "6S"], Suit::Spades, 1);
    refill(&mut m);
    assert_eq!(m.hand(1).len(), 4);
    assert_eq!(m.hand(0).len(), 1);
    assert!(m.deck.is_empty());
}

#[test]
fn refill_never_trims_an_oversized_hand() {
    let mut m = arranged_match(
        [&["7C", "8C", "9C", "TC", "JC", "QC", "KC", "AC"], &["8D"]],
        &["6D"],
        Suit::Spades,
        0,
    );
    refill(&mut m);
    assert_eq!(m.hand(0).len(), 8);
    assert_eq!(m.hand(1).len(), 2);
}

#[test]
fn late_action_forfeits_the_sender_even_if_legal() {
    let mut m = arranged_match([&["7C"], &["8C"]], &["6D"], Suit::Spades, 0);
    let late = m.deadline + Duration::milliseconds(1);

    // P1 is not the one who owes a move, but sent the late message.
    let outcome = handle_action(&mut m, P1, PlayerAction::Take, late);
    assert_eq!(
        outcome,
        ActionOutcome::Forfeited(MatchOutcome {
            winner: P0,
            loser: P1,
            stake: STAKE,
            payout: 19,
            reason: EndReason::Timeout,
        })
    );
    assert!(m.finished);

    assert_eq!(handle_action(&mut m, P0, attack("7C"), late), ActionOutcome::Ignored);
}

#[test]
fn action_exactly_at_deadline_is_still_in_time() {
    let mut m = arranged_match([&["7C"], &["8C"]], &["6D"], Suit::Spades, 0);
    let at = m.deadline;
    assert_eq!(handle_action(&mut m, P0, attack("7C"), at), applied());
}

#[test]
fn attacker_emptying_hand_with_empty_deck_wins() {
    let mut m = arranged_match([&["7C"], &["8C", "AH"]], &[], Suit::Spades, 0);
    let outcome = handle_action(&mut m, P0, attack("7C"), t0());
    let ActionOutcome::Applied { ended: Some(end), .. } = outcome else {
        panic!("expected a natural end, got {outcome:?}");
    };
    assert_eq!(end.winner, P0);
    assert_eq!(end.loser, P1);
    assert_eq!(end.reason, EndReason::Natural);
    assert_eq!(end.payout, STAKE + 9);
}

#[test]
fn defender_emptying_hand_wins() {
    let mut m = arranged_match([&["7C", "KD"], &["8C"]], &[], Suit::Spades, 0);
    handle_action(&mut m, P0, attack("7C"), t0());
    let outcome = handle_action(&mut m, P1, defend(0, "8C"), t0());
    assert_eq!(outcome.ended().map(|o| o.winner), Some(P1));
}

#[test]
fn no_end_while_deck_has_cards() {
    let mut m = arranged_match([&["7C"], &["8C"]], &["6D"], Suit::Spades, 0);
    let outcome = handle_action(&mut m, P0, attack("7C"), t0());
    assert_eq!(outcome, applied());
    assert!(!m.finished);
}

#[test]
fn simultaneous_empty_hands_favour_attacker() {
    let mut m = arranged_match([&[], &[]], &[], Suit::Spades, 1);
    let end = check_terminal(&mut m).expect("ended");
    assert_eq!(end.winner, P1);
}

#[test]
fn terminal_check_is_idempotent() {
    let mut m = arranged_match([&[], &["8C"]], &[], Suit::Spades, 0);
    assert!(check_terminal(&mut m).is_some());
    assert!(check_terminal(&mut m).is_none());
    assert!(forfeit(&mut m, P0, EndReason::Disconnect).is_none());
    assert_eq!(m.outcome.map(|o| o.reason), Some(EndReason::Natural));
}

#[test]
fn forfeit_declares_the_other_seat_winner() {
    let mut m = arranged_match([&["7C"], &["8C"]], &["6D"], Suit::Spades, 0);
    assert!(forfeit(&mut m, 999, EndReason::Disconnect).is_none());
    let end = forfeit(&mut m, P0, EndReason::Disconnect).expect("ended");
    assert_eq!((end.winner, end.loser), (P1, P0));
    assert_eq!(end.reason, EndReason::Disconnect);
}

#[test]
fn sweep_expiry_blames_the_seat_that_owes_a_move() {
    let mut m = arranged_match([&["7C"], &["8C"]], &["6D"], Suit::Spades, 0);
    let deadline = m.deadline;
    assert!(expire_if_due(&mut m, deadline).is_none());

    let late = m.deadline + Duration::seconds(1);
    let end = expire_if_due(&mut m, late).expect("expired");
    // Empty table: the attacker owed the move.
    assert_eq!(end.loser, P0);
    assert_eq!(end.reason, EndReason::Timeout);
    assert!(expire_if_due(&mut m, late).is_none());

    let mut m = arranged_match([&["7C", "9D"], &["8D"]], &["6D"], Suit::Spades, 0);
    handle_action(&mut m, P0, attack("7C"), t0());
    let late = m.deadline + Duration::seconds(1);
    let end = expire_if_due(&mut m, late).expect("expired");
    assert_eq!(end.loser, P1);
}
