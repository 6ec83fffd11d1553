//! Card parsing from compact string tokens (e.g., "6S", "TH", "10H", "AD")

use std::str::FromStr;

use super::cards_types::{Card, Rank, Suit};
use crate::errors::domain::{DomainError, ValidationKind};

fn parse_error(s: &str) -> DomainError {
    DomainError::validation(ValidationKind::ParseCard, format!("Parse card: {s}"))
}

fn rank_from_token(token: &str) -> Option<Rank> {
    let rank = match token {
        "6" => Rank::Six,
        "7" => Rank::Seven,
        "8" => Rank::Eight,
        "9" => Rank::Nine,
        "T" | "10" => Rank::Ten,
        "J" => Rank::Jack,
        "Q" => Rank::Queen,
        "K" => Rank::King,
        "A" => Rank::Ace,
        _ => return None,
    };
    Some(rank)
}

fn suit_from_char(ch: char) -> Option<Suit> {
    let suit = match ch {
        'C' | '♣' => Suit::Clubs,
        'D' | '♦' => Suit::Diamonds,
        'H' | '♥' => Suit::Hearts,
        'S' | '♠' => Suit::Spades,
        _ => return None,
    };
    Some(suit)
}

impl FromStr for Card {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let suit_ch = s.chars().last().ok_or_else(|| parse_error(s))?;
        let rank_part = &s[..s.len() - suit_ch.len_utf8()];
        let rank = rank_from_token(rank_part).ok_or_else(|| parse_error(s))?;
        let suit = suit_from_char(suit_ch).ok_or_else(|| parse_error(s))?;
        Ok(Card { rank, suit })
    }
}

/// Non-panicking helper to parse card tokens into Card instances.
pub fn try_parse_cards<I, S>(tokens: I) -> Result<Vec<Card>, DomainError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|s| s.as_ref().parse::<Card>())
        .collect()
}
