//! Card game logic: beat rule and trump lookups

use super::cards_types::{Card, Rank, Suit};

/// Whether `defense` covers `attack` under `trump`.
///
/// Same suit compares by rank; otherwise only a trump covers a non-trump.
pub fn card_beats(defense: Card, attack: Card, trump: Suit) -> bool {
    if defense.suit == attack.suit {
        return defense.rank > attack.rank;
    }
    defense.suit == trump
}

/// Lowest-ranked trump in `hand`, if any.
pub fn lowest_trump(hand: &[Card], trump: Suit) -> Option<Rank> {
    hand.iter().filter(|c| c.suit == trump).map(|c| c.rank).min()
}
