//! Public snapshot API for observing a match without exposing hands.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::state::{MatchId, MatchOutcome, MatchState, UserId};
use crate::domain::table::TrickPair;
use crate::domain::{Card, Suit};

/// Public info about one participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPublic {
    pub user_id: UserId,
    pub hand_count: usize,
}

/// Everything both participants may see. Broadcast after every successful
/// mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicSnapshot {
    pub match_id: MatchId,
    pub stake: i64,
    pub trump_suit: Suit,
    pub trump_card: Card,
    pub deck_count: usize,
    pub discarded_count: usize,
    pub attacker: UserId,
    pub defender: UserId,
    pub table: Vec<TrickPair>,
    pub players: Vec<PlayerPublic>,
    /// Unix milliseconds.
    pub deadline: i64,
}

/// A participant's own cards, sent to that participant only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateHand {
    pub match_id: MatchId,
    pub cards: Vec<Card>,
}

/// End-of-match notification sent to both participants and the lobby.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEnded {
    pub match_id: MatchId,
    #[serde(flatten)]
    pub outcome: MatchOutcome,
}

pub fn unix_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn public_snapshot(state: &MatchState) -> PublicSnapshot {
    PublicSnapshot {
        match_id: state.id,
        stake: state.stake,
        trump_suit: state.trump,
        trump_card: state.trump_card,
        deck_count: state.deck.len(),
        discarded_count: state.discarded,
        attacker: state.attacker_id(),
        defender: state.defender_id(),
        table: state.table.pairs().to_vec(),
        players: state
            .players
            .iter()
            .zip(state.hands.iter())
            .map(|(&user_id, hand)| PlayerPublic {
                user_id,
                hand_count: hand.len(),
            })
            .collect(),
        deadline: unix_millis(state.deadline),
    }
}

/// Private hands in seat order, each paired with its owner.
pub fn private_hands(state: &MatchState) -> [(UserId, PrivateHand); 2] {
    [0usize, 1].map(|seat| {
        (
            state.players[seat],
            PrivateHand {
                match_id: state.id,
                cards: state.hands[seat].sorted(),
            },
        )
    })
}
