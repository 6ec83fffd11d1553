//! The active trick: insertion-ordered attack/defense pairs.

use serde::{Deserialize, Serialize};

use crate::domain::Card;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrickPair {
    pub attack: Card,
    pub defense: Option<Card>,
}

impl TrickPair {
    pub fn is_open(&self) -> bool {
        self.defense.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    pairs: Vec<TrickPair>,
}

impl Table {
    pub fn pairs(&self) -> &[TrickPair] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs in the current trick, covered or not.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn open_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.is_open()).count()
    }

    pub fn has_open(&self) -> bool {
        self.pairs.iter().any(TrickPair::is_open)
    }

    pub fn first_open(&self) -> Option<usize> {
        self.pairs.iter().position(TrickPair::is_open)
    }

    /// Number of physical cards lying on the table.
    pub fn card_count(&self) -> usize {
        self.pairs
            .iter()
            .map(|p| 1 + usize::from(p.defense.is_some()))
            .sum()
    }

    /// A card may join the table when it is empty or the card's rank
    /// already appears on either side of some pair.
    pub fn rank_allowed(&self, card: Card) -> bool {
        self.pairs.is_empty()
            || self
                .pairs
                .iter()
                .any(|p| p.attack.rank == card.rank || p.defense.is_some_and(|d| d.rank == card.rank))
    }

    pub fn open_pair(&self, index: usize) -> Option<&TrickPair> {
        self.pairs.get(index).filter(|p| p.is_open())
    }

    pub fn push_attack(&mut self, card: Card) {
        self.pairs.push(TrickPair {
            attack: card,
            defense: None,
        });
    }

    /// Cover the open pair at `index`. Returns false if there is no such
    /// open pair.
    pub fn cover(&mut self, index: usize, card: Card) -> bool {
        match self.pairs.get_mut(index) {
            Some(pair) if pair.is_open() => {
                pair.defense = Some(card);
                true
            }
            _ => false,
        }
    }

    /// Empty the table, yielding every card (attack then defense per pair).
    pub fn drain_cards(&mut self) -> Vec<Card> {
        let mut out = Vec::with_capacity(self.card_count());
        for pair in self.pairs.drain(..) {
            out.push(pair.attack);
            if let Some(d) = pair.defense {
                out.push(d);
            }
        }
        out
    }
}
