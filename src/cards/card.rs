use super::rank::Rank;
use super::suit::Suit;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};

/// One of the 52 unique `(Suit, Rank)` pairs. Immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    rank: Rank,
    suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }
}

// u8 isomorphism: 0..52, rank-major (four consecutive suits per rank).
impl From<Card> for u8 {
    fn from(c: Card) -> u8 {
        (c.rank as u8) * 4 + (c.suit as u8)
    }
}

impl From<u8> for Card {
    fn from(n: u8) -> Self {
        Self {
            rank: Rank::from(n / 4),
            suit: Suit::from(n % 4),
        }
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

impl Serialize for Card {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Card::try_from(s.as_str()).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<&str> for Card {
    type Error = String;

    fn try_from(s: &str) -> std::result::Result<Self, Self::Error> {
        let mut chars = s.chars();
        let rank = match chars.next() {
            Some('2') => Rank::Two,
            Some('3') => Rank::Three,
            Some('4') => Rank::Four,
            Some('5') => Rank::Five,
            Some('6') => Rank::Six,
            Some('7') => Rank::Seven,
            Some('8') => Rank::Eight,
            Some('9') => Rank::Nine,
            Some('T') | Some('t') => Rank::Ten,
            Some('J') | Some('j') => Rank::Jack,
            Some('Q') | Some('q') => Rank::Queen,
            Some('K') | Some('k') => Rank::King,
            Some('A') | Some('a') => Rank::Ace,
            _ => return Err(format!("invalid rank in card string {s:?}")),
        };
        let suit = match chars.next() {
            Some('c') | Some('C') | Some('♣') => Suit::Club,
            Some('d') | Some('D') | Some('♦') => Suit::Diamond,
            Some('h') | Some('H') | Some('♥') => Suit::Heart,
            Some('s') | Some('S') | Some('♠') => Suit::Spade,
            _ => return Err(format!("invalid suit in card string {s:?}")),
        };
        Ok(Card::new(rank, suit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u8_isomorphism_round_trips_all_52() {
        for n in 0u8..52 {
            let card = Card::from(n);
            assert_eq!(u8::from(card), n);
        }
    }

    #[test]
    fn display_and_parse_round_trip() {
        let card = Card::new(Rank::Ace, Suit::Spade);
        let text = card.to_string();
        assert_eq!(Card::try_from(text.as_str()).unwrap(), card);
    }
}
