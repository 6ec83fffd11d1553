use std::fmt;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use ulid::Ulid;

use crate::domain::deck::Deck;
use crate::domain::hand::Hand;
use crate::domain::rules::{payout_for_stake, DECK_SIZE, PLAYERS};
use crate::domain::table::Table;
use crate::domain::{Card, Suit};

pub type UserId = i64;
/// Seat index within a match (0 or 1), fixed at creation.
pub type Seat = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub Ulid);

impl MatchId {
    pub fn generate() -> Self {
        Self(Ulid::new())
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Deck exhausted and a hand emptied.
    Natural,
    /// An action arrived after the deadline, or the sweep found it elapsed.
    Timeout,
    /// A participant left or lost their connection.
    Disconnect,
}

/// Terminal result of a match, produced exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub winner: UserId,
    pub loser: UserId,
    pub stake: i64,
    pub payout: i64,
    pub reason: EndReason,
}

/// The match aggregate. Owns deck, hands and table; mutated only by the
/// turn engine.
#[derive(Debug, Clone)]
pub struct MatchState {
    pub id: MatchId,
    pub stake: i64,
    /// Participants by seat.
    pub players: [UserId; PLAYERS],
    /// Hands by seat.
    pub hands: [Hand; PLAYERS],
    pub deck: Deck,
    /// Bottom card of the deck at deal time; visible to both players.
    pub trump_card: Card,
    pub trump: Suit,
    pub table: Table,
    pub attacker: Seat,
    pub discarded: usize,
    pub deadline: OffsetDateTime,
    pub action_window: Duration,
    pub finished: bool,
    pub outcome: Option<MatchOutcome>,
}

/// Returns the other seat of a two-player match.
#[inline]
pub fn other_seat(seat: Seat) -> Seat {
    1 - seat
}

impl MatchState {
    pub fn defender(&self) -> Seat {
        other_seat(self.attacker)
    }

    pub fn attacker_id(&self) -> UserId {
        self.players[self.attacker as usize]
    }

    pub fn defender_id(&self) -> UserId {
        self.players[self.defender() as usize]
    }

    pub fn seat_of(&self, user: UserId) -> Option<Seat> {
        self.players
            .iter()
            .position(|&p| p == user)
            .map(|i| i as Seat)
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat as usize]
    }

    pub fn hand_mut(&mut self, seat: Seat) -> &mut Hand {
        &mut self.hands[seat as usize]
    }

    pub fn reset_deadline(&mut self, now: OffsetDateTime) {
        self.deadline = now + self.action_window;
    }

    pub fn deadline_elapsed(&self, now: OffsetDateTime) -> bool {
        now > self.deadline
    }

    /// Every card accounted for: deck, hands, table, discard pile.
    pub fn cards_accounted(&self) -> usize {
        self.deck.len()
            + self.hands.iter().map(Hand::len).sum::<usize>()
            + self.table.card_count()
            + self.discarded
    }

    /// Debug-time conservation check.
    pub fn is_conserved(&self) -> bool {
        self.cards_accounted() == DECK_SIZE
    }

    /// Set the terminal flag and record the outcome. Returns `None` when
    /// the match had already finished, which makes every terminal path
    /// idempotent.
    pub fn finish(&mut self, winner: Seat, reason: EndReason) -> Option<MatchOutcome> {
        if self.finished {
            return None;
        }
        let outcome = MatchOutcome {
            winner: self.players[winner as usize],
            loser: self.players[other_seat(winner) as usize],
            stake: self.stake,
            payout: payout_for_stake(self.stake),
            reason,
        };
        self.finished = true;
        self.outcome = Some(outcome);
        Some(outcome)
    }
}
