use std::{fmt, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::result::{Error, Result};

/// Regex fragment matching one card token.
pub(crate) const REGEX_CARD: &str = "[2-9TJQKA][scdh]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const RANKS: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    pub fn from_ascii(b: u8) -> Option<Self> {
        let rank = match b {
            b'2' => Rank::Two,
            b'3' => Rank::Three,
            b'4' => Rank::Four,
            b'5' => Rank::Five,
            b'6' => Rank::Six,
            b'7' => Rank::Seven,
            b'8' => Rank::Eight,
            b'9' => Rank::Nine,
            b'T' => Rank::Ten,
            b'J' => Rank::Jack,
            b'Q' => Rank::Queen,
            b'K' => Rank::King,
            b'A' => Rank::Ace,
            _ => return None,
        };
        Some(rank)
    }

    pub fn to_char(self) -> char {
        b"23456789TJQKA"[self as usize] as char
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suit {
    Spades,
    Clubs,
    Diamonds,
    Hearts,
}

impl Suit {
    pub fn from_ascii(b: u8) -> Option<Self> {
        match b {
            b's' => Some(Suit::Spades),
            b'c' => Some(Suit::Clubs),
            b'd' => Some(Suit::Diamonds),
            b'h' => Some(Suit::Hearts),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Suit::Spades => 's',
            Suit::Clubs => 'c',
            Suit::Diamonds => 'd',
            Suit::Hearts => 'h',
        }
    }
}

/// A card token as written in the log, e.g. `Qd` or `Ts`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct Card {
    rank: Rank,
    suit: Suit,
}

impl Card {
    pub const fn of(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub fn rank(self) -> Rank {
        self.rank
    }

    pub fn suit(self) -> Suit {
        self.suit
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.to_char(), self.suit.to_char())
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self, f)
    }
}

impl FromStr for Card {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.as_bytes() {
            [rank, suit] => match (Rank::from_ascii(*rank), Suit::from_ascii(*suit)) {
                (Some(rank), Some(suit)) => Ok(Self::of(rank, suit)),
                _ => Err(Error::InvalidCard(s.to_string())),
            },
            _ => Err(Error::InvalidCard(s.to_string())),
        }
    }
}

/// Parses the space separated tokens found between brackets, e.g. `5s Kd 3c`.
pub fn parse_cards(tokens: &str) -> Result<Vec<Card>> {
    tokens.split_whitespace().map(Card::from_str).collect()
}

/// Joins cards back into their bracket content form.
pub fn format_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|card| card.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_cards() {
        assert_eq!(
            Card::from_str("Qd").unwrap(),
            Card::of(Rank::Queen, Suit::Diamonds)
        );
        assert_eq!(Card::from_str("Ts").unwrap(), Card::of(Rank::Ten, Suit::Spades));
        assert_eq!(Card::from_str("2c").unwrap(), Card::of(Rank::Two, Suit::Clubs));
        for bad in ["", "Q", "Qx", "1d", "10d", "qd"] {
            assert_eq!(Card::from_str(bad), Err(Error::InvalidCard(bad.to_string())));
        }
    }

    #[test]
    fn tokens_round_trip() {
        for tokens in ["5s Kd 3c", "Qd 7c 4c 8c 6s", "4c 9h Js Ks Ad", "Th"] {
            let cards = parse_cards(tokens).unwrap();
            assert_eq!(format_cards(&cards), tokens);
        }
    }

    #[test]
    fn all_ranks_round_trip() {
        for rank in Rank::RANKS {
            for suit in [Suit::Spades, Suit::Clubs, Suit::Diamonds, Suit::Hearts] {
                let card = Card::of(rank, suit);
                assert_eq!(Card::from_str(&card.to_string()).unwrap(), card);
            }
        }
    }
}
