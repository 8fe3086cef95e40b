use super::card::{Card, Rank};
use crate::errors::GameError;
use enum_map::EnumMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// It's important that the variants are declared worst-hand-first so the
/// derived Ord agrees with poker ranking.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HandClass {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

/// The evaluated strength of a five-card hand. Totally ordered: class
/// first, then the ranks in significance order (pairs/trips before
/// kickers), which resolves every kicker dispute. Suits never break ties.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct HandValue {
    class: HandClass,
    /// Significance-ordered ranks, e.g. quads are `[q,q,q,q,kicker]` and a
    /// boat is `[trip,trip,trip,pair,pair]`. Straights repeat the high card.
    ranks: [Rank; 5],
    cards: [Card; 5],
}

impl PartialEq for HandValue {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.ranks == other.ranks
    }
}

impl Eq for HandValue {}

impl PartialOrd for HandValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.class.cmp(&other.class) {
            Ordering::Equal => self.ranks.cmp(&other.ranks),
            o => o,
        }
    }
}

impl std::fmt::Display for HandValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.cards[0], self.cards[1], self.cards[2], self.cards[3], self.cards[4],
        )
    }
}

impl HandValue {
    /// Evaluate exactly five cards.
    pub fn of_five(cards: [Card; 5]) -> Self {
        let (class, ranks) = classify(&cards);
        Self {
            class,
            ranks,
            cards,
        }
    }

    pub const fn class(&self) -> HandClass {
        self.class
    }

    /// The five cards this value was computed from, i.e. the best five at
    /// showdown.
    pub const fn cards(&self) -> [Card; 5] {
        self.cards
    }

    /// Three-way comparison for callers that want the classic -1/0/1.
    pub fn compare(&self, other: &Self) -> i32 {
        match self.cmp(other) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    pub fn describe(&self) -> String {
        match self.class {
            HandClass::HighCard => format!("{} high", self.ranks[0]),
            HandClass::Pair => format!("Pair of {}s", self.ranks[0]),
            HandClass::TwoPair => {
                format!("Two pair {}s and {}s", self.ranks[0], self.ranks[2])
            }
            HandClass::ThreeOfAKind => format!("Set of {}s", self.ranks[0]),
            HandClass::Straight => format!("{} high straight", self.ranks[0]),
            HandClass::Flush => format!("{} high flush", self.ranks[0]),
            HandClass::FullHouse => {
                format!("Boat {}s full of {}s", self.ranks[0], self.ranks[3])
            }
            HandClass::FourOfAKind => format!("Quad {}s", self.ranks[0]),
            HandClass::StraightFlush => format!("{} high straight flush", self.ranks[0]),
        }
    }
}

/// Best five-card hand from two hole cards plus up to five community cards.
///
/// Checks every 5-card combination of the given cards; with the showdown
/// maximum of 7 cards that's 21 evaluations.
pub fn evaluate(hole: &[Card], community: &[Card]) -> Result<HandValue, GameError> {
    if hole.len() > 2 {
        return Err(GameError::InvalidShowdownCardCount);
    }
    let cards: Vec<Card> = hole.iter().chain(community.iter()).copied().collect();
    if cards.len() < 5 {
        return Err(GameError::InvalidShowdownCardCount);
    }
    cards
        .into_iter()
        .combinations(5)
        .map(|combo| HandValue::of_five([combo[0], combo[1], combo[2], combo[3], combo[4]]))
        .max()
        .ok_or(GameError::InvalidShowdownCardCount)
}

fn classify(cards: &[Card; 5]) -> (HandClass, [Rank; 5]) {
    let mut counts: EnumMap<Rank, u8> = EnumMap::default();
    for c in cards {
        counts[c.rank] += 1;
    }
    // Rank groups ordered by count first, then rank. Expanding the groups in
    // this order is exactly the significance order every class wants.
    let mut groups: Vec<(u8, Rank)> = counts
        .iter()
        .filter(|(_, &n)| n > 0)
        .map(|(r, &n)| (n, r))
        .collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));
    let mut ranks = [Rank::Two; 5];
    let mut i = 0;
    for (n, r) in &groups {
        for _ in 0..*n {
            ranks[i] = *r;
            i += 1;
        }
    }

    let flush = cards.iter().map(|c| c.suit).all_equal();
    let straight = straight_high(&groups);
    if let Some(high) = straight {
        let ranks = [high; 5];
        let class = if flush {
            HandClass::StraightFlush
        } else {
            HandClass::Straight
        };
        return (class, ranks);
    }
    let class = match (groups[0].0, groups.len()) {
        (4, _) => HandClass::FourOfAKind,
        (3, 2) => HandClass::FullHouse,
        _ if flush => HandClass::Flush,
        (3, _) => HandClass::ThreeOfAKind,
        (2, 3) => HandClass::TwoPair,
        (2, _) => HandClass::Pair,
        _ => HandClass::HighCard,
    };
    (class, ranks)
}

/// The straight's high card, if these five distinct-or-not ranks form one.
/// The wheel (A-5) reports Five so it loses to every other straight.
fn straight_high(groups: &[(u8, Rank)]) -> Option<Rank> {
    if groups.len() != 5 {
        return None;
    }
    // groups are sorted rank-descending already (all counts are 1)
    let v: Vec<u8> = groups.iter().map(|(_, r)| r.value()).collect();
    if v == [14, 5, 4, 3, 2] {
        return Some(Rank::Five);
    }
    for w in v.windows(2) {
        if w[0] != w[1] + 1 {
            return None;
        }
    }
    Some(groups[0].1)
}
