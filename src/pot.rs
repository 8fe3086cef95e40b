use crate::errors::PotError;
use crate::player::Player;
use crate::{Chips, SeatIdx};
use serde::{Deserialize, Serialize};

/// One pool of chips and the seats allowed to win it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pot {
    pub amount: Chips,
    /// Seat-aligned eligibility mask, same length as the hand roster. Only
    /// seats still in the hand ever appear here; a folded seat's chips stay
    /// in the amount but the seat can never win them.
    pub eligible: Vec<bool>,
}

impl Pot {
    fn is_eligible(&self, seat: SeatIdx) -> Result<bool, PotError> {
        self.eligible
            .get(seat)
            .copied()
            .ok_or(PotError::EligibilityIndexOutOfRange)
    }
}

/// Payout record for one pot, seat indices in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotAward {
    pub pot: usize,
    pub amount: Chips,
    pub winners: Vec<SeatIdx>,
}

/// The hand's bet ledger and the pots derived from it.
///
/// Callers record every chip committed via [`PotManager::add_bet`]; the main
/// and side pots are rebuilt from the cumulative ledger after each bet, so
/// at any point between actions `sum(pot amounts) == sum(total_bets)`. Pot
/// layering is a pure function of the cumulative bets plus fold flags,
/// which is also what lets a snapshot restore pots from the ledger alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotManager {
    /// Index 0 is the main pot; side pots follow in ascending threshold
    /// order.
    pots: Vec<Pot>,
    /// Chips committed per seat in the current betting round only.
    current_bets: Vec<Chips>,
    /// Chips committed per seat across the whole hand.
    total_bets: Vec<Chips>,
}

impl PotManager {
    pub fn new(seats: usize) -> Self {
        Self {
            pots: vec![Pot {
                amount: 0,
                eligible: vec![false; seats],
            }],
            current_bets: vec![0; seats],
            total_bets: vec![0; seats],
        }
    }

    /// Rebuild a manager from a snapshotted ledger.
    pub fn restore(current_bets: Vec<Chips>, total_bets: Vec<Chips>, players: &[Player]) -> Self {
        let mut pm = Self {
            pots: Vec::new(),
            current_bets,
            total_bets,
        };
        pm.rebuild(players);
        pm
    }

    pub fn seats(&self) -> usize {
        self.total_bets.len()
    }

    pub fn pots(&self) -> &[Pot] {
        &self.pots
    }

    pub fn total(&self) -> Chips {
        self.pots.iter().map(|p| p.amount).sum()
    }

    pub fn total_bets(&self) -> &[Chips] {
        &self.total_bets
    }

    pub fn current_bets(&self) -> &[Chips] {
        &self.current_bets
    }

    /// Record `amount` more chips from `seat` and restratify the pots. The
    /// caller has already bounded the amount against the player's stack, so
    /// this never fails.
    pub fn add_bet(&mut self, seat: SeatIdx, amount: Chips, players: &[Player]) {
        debug_assert!(seat < self.seats());
        debug_assert!(amount >= 0);
        self.current_bets[seat] += amount;
        self.total_bets[seat] += amount;
        self.rebuild(players);
        log::debug!(
            "seat {} adds {}, pot now {}",
            seat,
            amount,
            self.total()
        );
    }

    /// Round boundary: per-round bets start over, cumulative totals persist.
    pub fn reset_current_bets(&mut self) {
        self.current_bets.iter_mut().for_each(|b| *b = 0);
    }

    /// Restratify pots from the cumulative ledger.
    ///
    /// Each distinct positive commitment level is a threshold; the pot for
    /// threshold `t` holds every seat's chips between the previous threshold
    /// and `t`, and only seats committed to at least `t` (and still in the
    /// hand) can win it.
    pub fn rebuild(&mut self, players: &[Player]) {
        debug_assert_eq!(players.len(), self.seats());
        let mut thresholds: Vec<Chips> = self
            .total_bets
            .iter()
            .copied()
            .filter(|&t| t > 0)
            .collect();
        thresholds.sort_unstable();
        thresholds.dedup();

        self.pots.clear();
        if thresholds.is_empty() {
            self.pots.push(Pot {
                amount: 0,
                eligible: vec![false; self.seats()],
            });
            return;
        }
        let mut prev = 0;
        for t in thresholds {
            let mut amount = 0;
            let mut eligible = vec![false; self.seats()];
            for (seat, &total) in self.total_bets.iter().enumerate() {
                amount += (total.min(t) - prev).max(0);
                eligible[seat] = total >= t && players.get(seat).map_or(false, Player::is_alive);
            }
            self.pots.push(Pot { amount, eligible });
            prev = t;
        }
        debug_assert_eq!(self.total(), self.total_bets.iter().sum::<Chips>());
    }

    /// Refund the uncalled portion of the top bettor's bet this round: the
    /// amount by which it strictly exceeds the second-highest. Returns the
    /// refunded seat and amount, if any.
    pub fn return_uncalled_bet(&mut self, players: &mut [Player]) -> Option<(SeatIdx, Chips)> {
        let (top_seat, top) = self
            .current_bets
            .iter()
            .copied()
            .enumerate()
            .max_by_key(|&(_, bet)| bet)?;
        let second = self
            .current_bets
            .iter()
            .copied()
            .enumerate()
            .filter(|&(seat, _)| seat != top_seat)
            .map(|(_, bet)| bet)
            .max()
            .unwrap_or(0);
        if top <= second {
            return None;
        }
        let refund = top - second;
        self.current_bets[top_seat] -= refund;
        self.total_bets[top_seat] -= refund;
        players[top_seat].balance += refund;
        self.rebuild(players);
        log::debug!("uncalled bet: {} returned to seat {}", refund, top_seat);
        Some((top_seat, refund))
    }

    /// Pay every pot out to its winners and zero it.
    ///
    /// A pot with a single live eligible seat goes to that seat without any
    /// evaluation (fold wins, lone side-pot claims). Otherwise the live
    /// eligible seats' cached hand values decide; every seat tied for best
    /// splits evenly, with the indivisible remainder going to the lowest
    /// winning seat. Calling this again is a no-op.
    pub fn distribute(&mut self, players: &mut [Player]) -> Result<Vec<PotAward>, PotError> {
        let mut awards = Vec::new();
        for pot_idx in 0..self.pots.len() {
            if self.pots[pot_idx].amount == 0 {
                continue;
            }
            if self.pots[pot_idx].eligible.len() != players.len() {
                return Err(PotError::EligibilityLengthMismatch);
            }
            let mut live = Vec::new();
            for (seat, p) in players.iter().enumerate() {
                if self.pots[pot_idx].is_eligible(seat)? && p.is_alive() {
                    live.push(seat);
                }
            }
            if live.is_empty() {
                return Err(PotError::NoEligibleWinner);
            }
            let winners = if live.len() == 1 {
                live
            } else {
                let mut values = Vec::with_capacity(live.len());
                for &seat in &live {
                    let hv = players[seat]
                        .hand_value
                        .ok_or(PotError::EvaluationMissing)?;
                    values.push((seat, hv));
                }
                let best = values
                    .iter()
                    .map(|&(_, hv)| hv)
                    .max()
                    .ok_or(PotError::NoEligibleWinner)?;
                values
                    .into_iter()
                    .filter(|&(_, hv)| hv.compare(&best) == 0)
                    .map(|(seat, _)| seat)
                    .collect()
            };
            let amount = self.pots[pot_idx].amount;
            let share = amount / winners.len() as Chips;
            let remainder = amount % winners.len() as Chips;
            for (i, &seat) in winners.iter().enumerate() {
                let credit = share + if i == 0 { remainder } else { 0 };
                players[seat].balance += credit;
                log::debug!("pot {}: seat {} wins {}", pot_idx, seat, credit);
            }
            self.pots[pot_idx].amount = 0;
            self.pots[pot_idx].eligible.iter_mut().for_each(|e| *e = false);
            awards.push(PotAward {
                pot: pot_idx,
                amount,
                winners,
            });
        }
        Ok(awards)
    }
}
