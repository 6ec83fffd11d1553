//! Initial deal and first-attacker selection.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use time::{Duration, OffsetDateTime};

use crate::domain::cards_logic::lowest_trump;
use crate::domain::deck::Deck;
use crate::domain::hand::Hand;
use crate::domain::rules::{HAND_SIZE, MAX_STAKE};
use crate::domain::state::{MatchId, MatchState, Seat, UserId};
use crate::domain::table::Table;
use crate::domain::{Card, Suit};
use crate::errors::domain::{DomainError, ValidationKind};

/// Everything needed to open a match.
#[derive(Debug, Clone)]
pub struct MatchSetup {
    pub id: MatchId,
    pub players: [UserId; 2],
    pub stake: i64,
    pub seed: u64,
    pub action_window: Duration,
}

/// Deal from `deck`: six rounds of single-card draws, seat 0 first each
/// round. The trump card is the bottom card and stays in the deck.
pub fn deal_hands(deck: &mut Deck) -> Result<([Hand; 2], Card), DomainError> {
    let trump_card = deck
        .bottom()
        .ok_or_else(|| DomainError::validation_other("Cannot deal from an empty deck"))?;

    let mut hands: [Hand; 2] = Default::default();
    for _ in 0..HAND_SIZE {
        for hand in hands.iter_mut() {
            let card = deck
                .draw()
                .ok_or_else(|| DomainError::validation_other("Deck exhausted while dealing"))?;
            hand.add(card);
        }
    }
    Ok((hands, trump_card))
}

/// Holder of the lowest trump attacks; a sole trump holder attacks;
/// otherwise a fair coin decides.
pub fn choose_first_attacker<R: Rng + ?Sized>(
    hands: &[Hand; 2],
    trump: Suit,
    rng: &mut R,
) -> Seat {
    let low0 = lowest_trump(hands[0].cards(), trump);
    let low1 = lowest_trump(hands[1].cards(), trump);
    match (low0, low1) {
        (Some(a), Some(b)) => {
            if a <= b {
                0
            } else {
                1
            }
        }
        (Some(_), None) => 0,
        (None, Some(_)) => 1,
        (None, None) => {
            if rng.random_bool(0.5) {
                0
            } else {
                1
            }
        }
    }
}

/// Create a fully dealt match. The same seed always produces the same
/// deck, hands and first attacker.
pub fn new_match(setup: MatchSetup, now: OffsetDateTime) -> Result<MatchState, DomainError> {
    if setup.players[0] == setup.players[1] {
        return Err(DomainError::validation(
            ValidationKind::SamePlayerTwice,
            "A match needs two distinct participants",
        ));
    }
    if setup.stake <= 0 || setup.stake > MAX_STAKE {
        return Err(DomainError::validation(
            ValidationKind::InvalidStake,
            format!("Stake must be in 1..={MAX_STAKE}, got {}", setup.stake),
        ));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(setup.seed);
    let mut deck = Deck::shuffled_with(&mut rng);
    let (hands, trump_card) = deal_hands(&mut deck)?;
    let trump = trump_card.suit;
    let attacker = choose_first_attacker(&hands, trump, &mut rng);

    Ok(MatchState {
        id: setup.id,
        stake: setup.stake,
        players: setup.players,
        hands,
        deck,
        trump_card,
        trump,
        table: Table::default(),
        attacker,
        discarded: 0,
        deadline: now + setup.action_window,
        action_window: setup.action_window,
        finished: false,
        outcome: None,
    })
}
