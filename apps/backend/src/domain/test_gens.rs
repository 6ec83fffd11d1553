// Proptest strategies shared by the engine property tests.

use proptest::prelude::*;
use proptest::sample::select;

use crate::domain::{Card, Rank, Suit};

pub fn suit() -> impl Strategy<Value = Suit> {
    select(Suit::ALL.to_vec())
}

pub fn rank() -> impl Strategy<Value = Rank> {
    select(Rank::ALL.to_vec())
}

pub fn card() -> impl Strategy<Value = Card> {
    (rank(), suit()).prop_map(|(rank, suit)| Card::new(rank, suit))
}

/// Two cards that are never the same card.
pub fn card_pair() -> impl Strategy<Value = (Card, Card)> {
    (card(), card()).prop_filter("cards must differ", |(a, b)| a != b)
}

/// Deal seed plus choice indices; each index picks among the legal actions
/// at one step of a play-out.
pub fn playout() -> impl Strategy<Value = (u64, Vec<u16>)> {
    (any::<u64>(), prop::collection::vec(any::<u16>(), 1..200))
}
