use crate::cards::card::Card;
use crate::cards::deck::DeckState;
use crate::config::TableConfig;
use crate::game::{GameInner, HandPhase, Street};
use crate::player::PlayerState;
use crate::{Chips, PlayerId, SeatIdx};
use serde::{Deserialize, Serialize};

/// A seated user as the lobby sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub seat: SeatIdx,
    pub ready: bool,
}

/// One seat's in-hand state. `total_bet` is the whole-hand commitment; the
/// pot layering is derivable from the totals alone, which is what makes
/// these snapshots restorable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub balance: Chips,
    pub current_bet: Chips,
    pub total_bet: Chips,
    pub seat: SeatIdx,
    pub state: PlayerState,
    /// Hole cards, unfiltered. The transport decides who sees what.
    pub hand: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub dealer: SeatIdx,
    pub current_player: SeatIdx,
    pub current_bet: Chips,
    pub pot: Chips,
    pub round: u64,
    /// Actions taken so far this betting round; the completion rule needs
    /// it back after a restore.
    pub actions_in_round: u32,
    pub phase: HandPhase,
    /// The betting street, when the hand is on one.
    pub bet_round: Option<Street>,
    pub community: Vec<Card>,
    pub deck: DeckState,
    pub players: Vec<PlayerSnapshot>,
}

impl GameSnapshot {
    pub(crate) fn capture(g: &GameInner) -> Self {
        let players = g
            .players
            .iter()
            .enumerate()
            .map(|(seat, p)| PlayerSnapshot {
                id: p.id.clone(),
                name: p.name.clone(),
                balance: p.balance,
                current_bet: p.current_bet,
                total_bet: g.pots.total_bets().get(seat).copied().unwrap_or(0),
                seat: p.seat,
                state: p.state,
                hand: p.hand.clone(),
            })
            .collect();
        GameSnapshot {
            dealer: g.dealer,
            current_player: g.current_player,
            current_bet: g.current_bet,
            pot: g.pots.total(),
            round: g.round,
            actions_in_round: g.actions_in_round,
            phase: g.phase,
            bet_round: match g.phase {
                HandPhase::Street(s) => Some(s),
                _ => None,
            },
            community: g.community.clone(),
            deck: g.deck.state(g.hand_seed()),
            players,
        }
    }
}

/// Point-in-time view of a whole table, taken atomically under the table
/// and game locks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStateSnapshot {
    pub config: TableConfig,
    pub users: Vec<UserSnapshot>,
    pub game_started: bool,
    pub game_phase: Option<HandPhase>,
    pub game: Option<GameSnapshot>,
}
