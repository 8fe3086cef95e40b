use crate::cards::card::Card;
use crate::cards::hand::HandValue;
use crate::errors::GameError;
use crate::{Chips, PlayerId, SeatIdx};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Where a player is in the hand lifecycle.
///
/// `AtTable` is a seated player who is not dealt into the current hand;
/// `Left` is terminal. A folded player stays folded until the next hand's
/// reset, no matter what is dispatched at them in the meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    AtTable,
    InGame,
    Folded,
    AllIn,
    Left,
}

bitflags! {
    /// Conceptual ways to filter seats when iterating, e.g. only those still
    /// eligible for the pot.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PlayerFilter: u8 {
        /// Every seat in the hand roster.
        const ALL = 0b1;
        /// Seats still eligible to win the pot: not folded, not gone.
        const ALIVE = 0b10;
        /// Seats that can still act: alive and not all-in.
        const ACTIVE = 0b100;
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Remaining chips. Never negative.
    pub balance: Chips,
    /// Chips committed in the current betting round only.
    pub current_bet: Chips,
    /// Hole cards, dealt one per pass.
    pub hand: Vec<Card>,
    pub seat: SeatIdx,
    pub state: PlayerState,
    /// Stamp of this player's most recent accepted action, for the timebank.
    pub last_action: Instant,
    /// Showdown evaluation cache; set just before pots are distributed.
    pub hand_value: Option<HandValue>,
}

impl Player {
    pub fn new(id: PlayerId, name: String, balance: Chips, seat: SeatIdx) -> Self {
        Self {
            id,
            name,
            balance,
            current_bet: 0,
            hand: Vec::with_capacity(2),
            seat,
            state: PlayerState::AtTable,
            last_action: Instant::now(),
            hand_value: None,
        }
    }

    /// Deal this player into a hand. Balance is preserved; everything
    /// per-hand is cleared. Seats that have left stay gone.
    pub fn reset_for_new_hand(&mut self) {
        if self.state == PlayerState::Left {
            return;
        }
        self.state = PlayerState::InGame;
        self.hand.clear();
        self.current_bet = 0;
        self.hand_value = None;
        self.last_action = Instant::now();
    }

    /// Fold, if the rules allow it. Only `AtTable` and `InGame` may fold;
    /// in particular an all-in player has nothing left to surrender and the
    /// attempt is rejected.
    pub fn try_fold(&mut self) -> Result<(), GameError> {
        match self.state {
            PlayerState::AtTable | PlayerState::InGame => {
                self.state = PlayerState::Folded;
                Ok(())
            }
            _ => Err(GameError::CannotFoldAllIn),
        }
    }

    pub fn leave(&mut self) {
        self.state = PlayerState::Left;
    }

    /// Move `delta` chips from the stack into the current round's bet.
    /// The caller has already bounded `delta` by the balance; hitting zero
    /// with chips committed is what being all-in means.
    pub(crate) fn commit(&mut self, delta: Chips) {
        debug_assert!(delta >= 0 && delta <= self.balance);
        self.balance -= delta;
        self.current_bet += delta;
        if self.balance == 0 && self.current_bet > 0 && self.state == PlayerState::InGame {
            self.state = PlayerState::AllIn;
        }
    }

    /// Still eligible to win the pot.
    pub const fn is_alive(&self) -> bool {
        matches!(self.state, PlayerState::InGame | PlayerState::AllIn)
    }

    /// Can still act this hand.
    pub const fn is_active(&self) -> bool {
        matches!(self.state, PlayerState::InGame)
    }

    pub const fn is_folded(&self) -> bool {
        matches!(self.state, PlayerState::Folded)
    }

    pub(crate) fn matches(&self, filter: PlayerFilter) -> bool {
        filter.contains(PlayerFilter::ALL)
            || filter.contains(PlayerFilter::ALIVE) && self.is_alive()
            || filter.contains(PlayerFilter::ACTIVE) && self.is_active()
    }

    pub(crate) fn touch(&mut self) {
        self.last_action = Instant::now();
    }
}
