//! The 36-card deck: construction, seeded shuffle, draw-from-the-end.

use rand::seq::SliceRandom;

use crate::domain::rules::DECK_SIZE;
use crate::domain::{Card, Rank, Suit};

/// Generate the full 36-card deck in standard order.
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card { rank, suit });
        }
    }
    deck
}

/// Ordered draw pile. The last element is the top card; index 0 is the
/// bottom card, which is drawn last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Full deck in the order produced by `rng`.
    pub fn shuffled_with<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cards = full_deck();
        cards.shuffle(rng);
        Self { cards }
    }

    /// Build a deck from an explicit order (top card last).
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Card at the bottom of the pile, drawn last.
    pub fn bottom(&self) -> Option<Card> {
        self.cards.first().copied()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}
