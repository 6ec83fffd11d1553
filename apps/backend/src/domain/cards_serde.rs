//! Wire form of cards: a two-character token, rank then suit ("6S", "TH", "AD").
//! Suits travel by upper-case name through their derived serde impls.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::cards_types::{Card, Rank, Suit};

const RANK_CHARS: [char; 9] = ['6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A'];

fn suit_char(suit: Suit) -> char {
    match suit {
        Suit::Clubs => 'C',
        Suit::Diamonds => 'D',
        Suit::Hearts => 'H',
        Suit::Spades => 'S',
    }
}

impl Card {
    /// Compact token as sent to clients. Round-trips through `FromStr`.
    pub fn token(self) -> [char; 2] {
        [RANK_CHARS[self.rank as usize], suit_char(self.suit)]
    }
}

impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let [r, s] = self.token();
        serializer.collect_str(&format_args!("{r}{s}"))
    }
}

struct CardVisitor;

impl Visitor<'_> for CardVisitor {
    type Value = Card;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a card token such as \"TH\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Card, E> {
        v.parse::<Card>().map_err(|e| E::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(CardVisitor)
    }
}
