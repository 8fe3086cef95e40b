use enum_map::Enum;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

pub const SPADE: char = 's';
pub const HEART: char = 'h';
pub const DIAMOND: char = 'd';
pub const CLUB: char = 'c';
pub const ALL_SUITS: [Suit; 4] = [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade];
pub const ALL_RANKS: [Rank; 13] = [
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

#[derive(Hash, Enum, Clone, Copy, Debug, PartialEq, PartialOrd, Eq, Ord, Serialize, Deserialize)]
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
    pub fn value(&self) -> u8 {
        use Rank::*;
        match *self {
            Two => 2,
            Three => 3,
            Four => 4,
            Five => 5,
            Six => 6,
            Seven => 7,
            Eight => 8,
            Nine => 9,
            Ten => 10,
            Jack => 11,
            Queen => 12,
            King => 13,
            Ace => 14,
        }
    }

    /// Wire form, per the snapshot format: `A K Q J 10 9 .. 2`.
    fn wire(&self) -> &'static str {
        use Rank::*;
        match *self {
            Two => "2",
            Three => "3",
            Four => "4",
            Five => "5",
            Six => "6",
            Seven => "7",
            Eight => "8",
            Nine => "9",
            Ten => "10",
            Jack => "J",
            Queen => "Q",
            King => "K",
            Ace => "A",
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ten => write!(f, "T"),
            other => write!(f, "{}", other.wire()),
        }
    }
}

#[derive(Debug, derive_more::Display, Clone, PartialEq, Eq)]
pub enum CardParseError {
    #[display(fmt = "unrecognized rank {:?}", _0)]
    BadRank(String),
    #[display(fmt = "unrecognized suit {:?}", _0)]
    BadSuit(String),
    #[display(fmt = "unrecognized card {:?}", _0)]
    BadCard(String),
}

impl std::error::Error for CardParseError {}

impl FromStr for Rank {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        Ok(match norm.as_str() {
            "2" | "two" | "deuce" => Rank::Two,
            "3" | "three" => Rank::Three,
            "4" | "four" => Rank::Four,
            "5" | "five" => Rank::Five,
            "6" | "six" => Rank::Six,
            "7" | "seven" => Rank::Seven,
            "8" | "eight" => Rank::Eight,
            "9" | "nine" => Rank::Nine,
            "10" | "t" | "ten" => Rank::Ten,
            "j" | "jack" => Rank::Jack,
            "q" | "queen" => Rank::Queen,
            "k" | "king" => Rank::King,
            "a" | "ace" => Rank::Ace,
            _ => return Err(CardParseError::BadRank(s.to_string())),
        })
    }
}

#[derive(Hash, Enum, Clone, Copy, Debug, PartialEq, Eq, Ord)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}

impl Suit {
    fn wire(&self) -> &'static str {
        match self {
            Self::Club => "c",
            Self::Diamond => "d",
            Self::Heart => "h",
            Self::Spade => "s",
        }
    }
}

impl std::fmt::Display for Suit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Club => write!(f, "{}", CLUB),
            Self::Diamond => write!(f, "{}", DIAMOND),
            Self::Heart => write!(f, "{}", HEART),
            Self::Spade => write!(f, "{}", SPADE),
        }
    }
}

/// All suits are equal.
impl PartialOrd for Suit {
    fn partial_cmp(&self, _: &Self) -> Option<std::cmp::Ordering> {
        Some(std::cmp::Ordering::Equal)
    }
}

impl FromStr for Suit {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        Ok(match norm.as_str() {
            "s" | "♠" | "♤" | "spade" | "spades" => Suit::Spade,
            "h" | "♥" | "♡" | "heart" | "hearts" => Suit::Heart,
            "d" | "♦" | "♢" | "diamond" | "diamonds" => Suit::Diamond,
            "c" | "♣" | "♧" | "club" | "clubs" => Suit::Club,
            _ => return Err(CardParseError::BadSuit(s.to_string())),
        })
    }
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub const fn new(suit: Suit, rank: Rank) -> Self {
        Card { suit, rank }
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

/// We only consider Card Rank when determining order.
impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// We only consider Card Rank when determining order.
impl Ord for Card {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank.cmp(&other.rank)
    }
}

impl FromStr for Card {
    type Err = CardParseError;

    /// Accepts the compact form used throughout logs and tests: rank then
    /// suit, e.g. `Ah`, `Ts`, `10c`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() < 2 {
            return Err(CardParseError::BadCard(s.to_string()));
        }
        let split = s.len() - s.chars().last().map(|c| c.len_utf8()).unwrap_or(1);
        let (rank, suit) = s.split_at(split);
        Ok(Card {
            rank: rank.parse()?,
            suit: suit.parse()?,
        })
    }
}

/// The `{suit, value}` shape cards take in snapshots and events.
#[derive(Serialize, Deserialize)]
struct CardRepr {
    suit: String,
    value: String,
}

impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CardRepr {
            suit: self.suit.wire().to_string(),
            value: self.rank.wire().to_string(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = CardRepr::deserialize(deserializer)?;
        let suit = repr.suit.parse().map_err(D::Error::custom)?;
        let rank = repr.value.parse().map_err(D::Error::custom)?;
        Ok(Card { suit, rank })
    }
}

/// Returns an UNSHUFFLED vector of all 52 cards.
pub fn all_cards() -> Vec<Card> {
    use itertools::Itertools;
    ALL_SUITS
        .iter()
        .cartesian_product(ALL_RANKS.iter())
        .map(|x| Card::new(*x.0, *x.1))
        .collect()
}

#[cfg(test)]
pub(crate) fn cards_from_str(s: &str) -> Vec<Card> {
    s.split_whitespace()
        .map(|w| w.parse().expect("bad test card"))
        .collect()
}
