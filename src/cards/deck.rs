use super::card::{all_cards, Card};
use crate::errors::DeckError;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const DECK_LEN: usize = 52;

/// A dealing deck. Cards come off the front; the remaining order is
/// exposed for snapshotting and can be restored verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: VecDeque<Card>,
}

impl Deck {
    /// A full 52-card deck, shuffled with the caller's RNG.
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let mut d = Deck {
            cards: all_cards().into(),
        };
        d.shuffle(rng);
        d
    }

    /// Uniform Fisher–Yates over whatever cards remain.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        let mut cards: Vec<Card> = self.cards.drain(..).collect();
        cards.shuffle(rng);
        self.cards = cards.into();
    }

    /// Remove and return the front card.
    pub fn draw(&mut self) -> Result<Card, DeckError> {
        self.cards.pop_front().ok_or(DeckError::DeckEmpty)
    }

    /// Discard the front card face-down before dealing a street.
    pub fn burn(&mut self) {
        self.cards.pop_front();
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The remaining cards in draw order, plus the seed that produced the
    /// shuffle when one is known, for deterministic replay.
    pub fn state(&self, seed: Option<u64>) -> DeckState {
        DeckState {
            cards: self.cards.iter().copied().collect(),
            seed,
        }
    }

    pub fn restore(state: &DeckState) -> Self {
        Deck {
            cards: state.cards.iter().copied().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckState {
    pub cards: Vec<Card>,
    pub seed: Option<u64>,
}
