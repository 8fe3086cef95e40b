use crate::cards::card::Card;
use crate::cards::deck::{Deck, DeckState};
use crate::cards::hand;
use crate::config::TableConfig;
use crate::errors::{GameError, TableError};
use crate::player::{Player, PlayerFilter, PlayerState};
use crate::pot::PotManager;
use crate::snapshot::GameSnapshot;
use crate::{Chips, PlayerId, SeatIdx};
use futures::future::BoxFuture;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, Serialize, Deserialize,
)]
pub enum Street {
    PreFlop,
    Flop,
    Turn,
    River,
}

/// Where the hand is: being dealt, on a betting street, or settled.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, Serialize, Deserialize,
)]
pub enum HandPhase {
    Dealing,
    Street(Street),
    Showdown,
}

/// One blind obligation taken at hand setup. The amount is what was
/// actually posted, which is less than the blind when the stack was short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlindPost {
    pub player_id: PlayerId,
    pub seat: SeatIdx,
    pub amount: Chips,
    pub is_big: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnerInfo {
    pub player_id: PlayerId,
    pub seat: SeatIdx,
    pub winnings: Chips,
    /// The winning five cards; absent on fold wins, where nothing is shown.
    pub best_hand: Option<Vec<Card>>,
    pub hand_desc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowdownResult {
    pub winners: Vec<PlayerId>,
    pub winner_info: Vec<WinnerInfo>,
    /// Pot at distribution time, after any uncalled bet was returned.
    pub total_pot: Chips,
}

/// What the table should do now that an action has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RoundDisposition {
    /// More betting to come this street.
    InProgress,
    /// Street settled with two or more players still able to act.
    AdvanceStreet,
    /// Nobody (or one settled player) can act again: run out the board.
    AutoDeal,
    /// Hand is decided.
    Showdown,
}

pub type MinPlayersFn = Arc<dyn Fn() -> usize + Send + Sync>;
pub type StartHandFn = Arc<dyn Fn() -> BoxFuture<'static, Result<(), TableError>> + Send + Sync>;
pub type NotifyFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Callbacks the auto-start timer fires instead of holding a reference
/// back to the table.
#[derive(Clone)]
pub struct AutoStartHooks {
    pub min_players: MinPlayersFn,
    pub start_new_hand: StartHandFn,
    pub on_new_hand_started: Option<NotifyFn>,
}

/// A running hand plus its auto-start machinery. All hand state lives
/// behind `mu`; the timer bookkeeping sits outside so cancellation never
/// contends with gameplay.
pub struct Game {
    pub(crate) mu: Mutex<GameInner>,
    hooks: StdMutex<Option<AutoStartHooks>>,
    auto_start_timer: StdMutex<Option<JoinHandle<()>>>,
    auto_start_canceled: AtomicBool,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game").finish_non_exhaustive()
    }
}

impl Game {
    pub fn new(players: Vec<Player>, cfg: &TableConfig) -> Result<Self, GameError> {
        Ok(Self::from_inner(GameInner::new(players, cfg)?))
    }

    pub(crate) fn from_inner(inner: GameInner) -> Self {
        Self {
            mu: Mutex::new(inner),
            hooks: StdMutex::new(None),
            auto_start_timer: StdMutex::new(None),
            auto_start_canceled: AtomicBool::new(false),
        }
    }

    pub fn set_hooks(&self, hooks: AutoStartHooks) {
        *self.hooks.lock().unwrap_or_else(|e| e.into_inner()) = Some(hooks);
    }

    /// Arm the post-showdown timer. When it fires, and enough seats can
    /// still cover the big blind, the next hand is started through the
    /// registered callback; the started notification runs in its own task.
    pub fn schedule_auto_start(game: &Arc<Game>, delay: Duration) {
        if delay.is_zero() {
            return;
        }
        let hooks = match game
            .hooks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            Some(h) => h,
            None => return,
        };
        game.auto_start_canceled.store(false, AtomicOrdering::SeqCst);
        let g = Arc::clone(game);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if g.auto_start_canceled.load(AtomicOrdering::SeqCst) {
                return;
            }
            let funded = {
                let inner = g.mu.lock().await;
                inner
                    .players
                    .iter()
                    .filter(|p| p.state != PlayerState::Left && p.balance >= inner.big_blind)
                    .count()
            };
            if funded < (hooks.min_players)() {
                log::debug!("auto-start skipped: {} funded seats", funded);
                return;
            }
            match (hooks.start_new_hand)().await {
                Ok(()) => {
                    if let Some(cb) = hooks.on_new_hand_started {
                        tokio::spawn(cb());
                    }
                }
                Err(e) => log::warn!("auto-start failed: {}", e),
            }
        });
        let prev = game
            .auto_start_timer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(handle);
        if let Some(prev) = prev {
            prev.abort();
        }
    }

    /// Stop a pending auto-start. Safe to call any number of times,
    /// including when no timer is armed.
    pub fn cancel_auto_start(&self) {
        self.auto_start_canceled.store(true, AtomicOrdering::SeqCst);
        if let Some(h) = self
            .auto_start_timer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            h.abort();
        }
    }
}

/// All per-hand state: the seat roster, board, deck, pots, and the betting
/// cursor. Mutated only under [`Game::mu`].
#[derive(Debug)]
pub struct GameInner {
    pub(crate) players: Vec<Player>,
    pub(crate) dealer: SeatIdx,
    pub(crate) current_player: SeatIdx,
    pub(crate) phase: HandPhase,
    pub(crate) community: Vec<Card>,
    pub(crate) deck: Deck,
    pub(crate) pots: PotManager,
    /// Highest per-round commitment any live seat has made.
    pub(crate) current_bet: Chips,
    pub(crate) actions_in_round: u32,
    /// Hand ordinal, starting at 1 for the first dealt hand.
    pub(crate) round: u64,
    pub(crate) winners: Vec<PlayerId>,
    rng: ChaChaRng,
    small_blind: Chips,
    big_blind: Chips,
    seed: Option<u64>,
    hand_seed: Option<u64>,
}

impl GameInner {
    pub(crate) fn new(players: Vec<Player>, cfg: &TableConfig) -> Result<Self, GameError> {
        if players.len() < 2 {
            return Err(GameError::NotEnoughPlayers);
        }
        let rng = match cfg.seed {
            Some(s) => ChaChaRng::seed_from_u64(s),
            None => {
                let now = unix_nanos();
                ChaChaRng::seed_from_u64(now ^ rand::thread_rng().gen::<u64>())
            }
        };
        let seats = players.len();
        Ok(Self {
            players,
            dealer: 0,
            current_player: 0,
            phase: HandPhase::Dealing,
            community: Vec::with_capacity(5),
            deck: Deck::restore(&DeckState {
                cards: Vec::new(),
                seed: None,
            }),
            pots: PotManager::new(seats),
            current_bet: 0,
            actions_in_round: 0,
            round: 0,
            winners: Vec::new(),
            rng,
            small_blind: cfg.small_blind,
            big_blind: cfg.big_blind,
            seed: cfg.seed,
            hand_seed: cfg.seed,
        })
    }

    /// Rebuild a hand from a snapshot. The pot layering comes back from the
    /// per-seat cumulative bets; timers are the restorer's problem.
    pub(crate) fn from_snapshot(
        snap: &GameSnapshot,
        cfg: &TableConfig,
    ) -> Result<Self, GameError> {
        if snap.players.len() < 2 {
            return Err(GameError::NotEnoughPlayers);
        }
        let players: Vec<Player> = snap
            .players
            .iter()
            .map(|ps| {
                let mut p = Player::new(ps.id.clone(), ps.name.clone(), ps.balance, ps.seat);
                p.current_bet = ps.current_bet;
                p.hand = ps.hand.clone();
                p.state = ps.state;
                p
            })
            .collect();
        let current_bets = snap.players.iter().map(|p| p.current_bet).collect();
        let total_bets = snap.players.iter().map(|p| p.total_bet).collect();
        let pots = PotManager::restore(current_bets, total_bets, &players);
        let rng_seed = snap.deck.seed.or(cfg.seed);
        let rng = match rng_seed {
            Some(s) => ChaChaRng::seed_from_u64(s),
            None => ChaChaRng::seed_from_u64(unix_nanos() ^ rand::thread_rng().gen::<u64>()),
        };
        Ok(Self {
            players,
            dealer: snap.dealer,
            current_player: snap.current_player,
            phase: snap.phase,
            community: snap.community.clone(),
            deck: Deck::restore(&snap.deck),
            pots,
            current_bet: snap.current_bet,
            actions_in_round: snap.actions_in_round,
            round: snap.round,
            winners: Vec::new(),
            rng,
            small_blind: cfg.small_blind,
            big_blind: cfg.big_blind,
            seed: cfg.seed,
            hand_seed: snap.deck.seed,
        })
    }

    pub(crate) fn players_iter(
        &self,
        filter: PlayerFilter,
    ) -> impl Iterator<Item = (SeatIdx, &Player)> {
        self.players
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.matches(filter))
    }

    pub(crate) fn count(&self, filter: PlayerFilter) -> usize {
        self.players_iter(filter).count()
    }

    pub(crate) fn seat_of(&self, player_id: &str) -> Option<SeatIdx> {
        self.players.iter().position(|p| p.id == player_id)
    }

    pub(crate) fn current_player_id(&self) -> Option<PlayerId> {
        self.players
            .get(self.current_player)
            .map(|p| p.id.clone())
    }

    pub(crate) fn hand_seed(&self) -> Option<u64> {
        self.hand_seed
    }

    /// First seat matching `filter` at or after `seat`, scanning clockwise.
    fn seat_from(&self, seat: SeatIdx, filter: PlayerFilter) -> Option<SeatIdx> {
        let n = self.players.len();
        (0..n)
            .map(|step| (seat + step) % n)
            .find(|&s| self.players[s].matches(filter))
    }

    /// First seat matching `filter` strictly after `seat`, scanning
    /// clockwise.
    fn seat_after(&self, seat: SeatIdx, filter: PlayerFilter) -> Option<SeatIdx> {
        let n = self.players.len();
        (1..=n)
            .map(|step| (seat + step) % n)
            .find(|&s| self.players[s].matches(filter))
    }

    /// A seeded game keeps one shared RNG for reproducibility. Otherwise
    /// each hand mixes a fresh seed from the clock, the hand ordinal, and a
    /// draw from the outgoing RNG, so back-to-back hands never reuse a
    /// shuffle.
    fn reseed_for_hand(&mut self) {
        if self.seed.is_some() {
            return;
        }
        let mixed = unix_nanos() ^ (self.round << 32) ^ self.rng.gen::<u64>();
        self.hand_seed = Some(mixed);
        self.rng = ChaChaRng::seed_from_u64(mixed);
    }

    /// Swap in the next hand's roster and run setup: rotate the button,
    /// shuffle, deal, post blinds.
    pub(crate) fn reset_for_new_hand(
        &mut self,
        roster: Vec<Player>,
    ) -> Result<Vec<BlindPost>, GameError> {
        if roster.len() < 2 {
            return Err(GameError::NotEnoughPlayers);
        }
        let seats = roster.len();
        self.players = roster;
        for p in self.players.iter_mut() {
            p.reset_for_new_hand();
        }
        self.round += 1;
        if self.round > 1 {
            self.dealer = (self.dealer + 1) % seats;
        }
        self.reseed_for_hand();
        self.pots = PotManager::new(seats);
        self.community.clear();
        self.winners.clear();
        self.current_bet = 0;
        self.actions_in_round = 0;
        self.setup_hand()
    }

    /// Deal hole cards (one per pass, two passes, in seat order) and post
    /// the blinds. Heads-up the dealer is the small blind and acts first
    /// preflop; otherwise the small blind sits left of the dealer and the
    /// seat after the big blind opens.
    fn setup_hand(&mut self) -> Result<Vec<BlindPost>, GameError> {
        self.phase = HandPhase::Dealing;
        self.deck = Deck::new(&mut self.rng);
        for _pass in 0..2 {
            for seat in 0..self.players.len() {
                if self.players[seat].is_active() {
                    let card = self.deck.draw()?;
                    self.players[seat].hand.push(card);
                }
            }
        }

        let alive = self.count(PlayerFilter::ALIVE);
        if alive < 2 {
            return Err(GameError::NotEnoughPlayers);
        }
        let heads_up = alive == 2;
        let sb_seat = if heads_up {
            self.seat_from(self.dealer, PlayerFilter::ALIVE)
        } else {
            self.seat_after(self.dealer, PlayerFilter::ALIVE)
        }
        .ok_or(GameError::NotEnoughPlayers)?;
        let bb_seat = self
            .seat_after(sb_seat, PlayerFilter::ALIVE)
            .ok_or(GameError::NotEnoughPlayers)?;

        let posts = vec![
            self.post_blind(sb_seat, self.small_blind, false),
            self.post_blind(bb_seat, self.big_blind, true),
        ];
        self.current_bet = self.big_blind;
        self.actions_in_round = 0;
        self.phase = HandPhase::Street(Street::PreFlop);
        self.current_player = if heads_up {
            self.seat_from(sb_seat, PlayerFilter::ACTIVE).unwrap_or(sb_seat)
        } else {
            self.seat_after(bb_seat, PlayerFilter::ACTIVE).unwrap_or(bb_seat)
        };
        log::debug!(
            "hand {} dealt: dealer seat {}, first to act seat {}",
            self.round,
            self.dealer,
            self.current_player
        );
        Ok(posts)
    }

    /// A blind bigger than the stack takes the whole stack and the seat is
    /// all in for the hand.
    fn post_blind(&mut self, seat: SeatIdx, amount: Chips, is_big: bool) -> BlindPost {
        let delta = amount.min(self.players[seat].balance);
        self.players[seat].commit(delta);
        self.pots.add_bet(seat, delta, &self.players);
        BlindPost {
            player_id: self.players[seat].id.clone(),
            seat,
            amount: delta,
            is_big,
        }
    }

    fn ensure_turn(&self, player_id: &str) -> Result<SeatIdx, GameError> {
        if !matches!(self.phase, HandPhase::Street(_)) {
            return Err(GameError::NotYourTurn);
        }
        let seat = self.seat_of(player_id).ok_or(GameError::NotYourTurn)?;
        // The cursor can still point at a seat that just folded or went all
        // in; such a seat holds no turn.
        if seat != self.current_player || !self.players[seat].is_active() {
            return Err(GameError::NotYourTurn);
        }
        Ok(seat)
    }

    pub(crate) fn fold(&mut self, player_id: &str) -> Result<(), GameError> {
        let seat = self.ensure_turn(player_id)?;
        self.players[seat].try_fold()?;
        self.players[seat].touch();
        self.actions_in_round += 1;
        log::debug!("seat {} folds", seat);
        // Uncontested pot: the hand is over, nobody else gets a turn. The
        // phase moves right here so no further action can slip in before
        // the showdown is resolved.
        if self.count(PlayerFilter::ALIVE) > 1 {
            self.advance_turn();
        } else {
            self.phase = HandPhase::Showdown;
        }
        Ok(())
    }

    pub(crate) fn check(&mut self, player_id: &str) -> Result<(), GameError> {
        let seat = self.ensure_turn(player_id)?;
        if self.players[seat].current_bet < self.current_bet {
            return Err(GameError::CannotCheck);
        }
        self.players[seat].touch();
        self.actions_in_round += 1;
        log::debug!("seat {} checks", seat);
        self.advance_turn();
        Ok(())
    }

    pub(crate) fn call(&mut self, player_id: &str) -> Result<(), GameError> {
        let seat = self.ensure_turn(player_id)?;
        let p = &self.players[seat];
        if self.current_bet <= p.current_bet {
            return Err(GameError::NothingToCall);
        }
        if p.balance == 0 {
            return Err(GameError::InsufficientBalance);
        }
        // A short stack calls for whatever it has left and is all in.
        let delta = (self.current_bet - p.current_bet).min(p.balance);
        self.players[seat].commit(delta);
        self.pots.add_bet(seat, delta, &self.players);
        self.players[seat].touch();
        self.actions_in_round += 1;
        log::debug!("seat {} calls {}", seat, delta);
        self.advance_turn();
        Ok(())
    }

    /// `amount` is the seat's new total for this round, not a delta.
    pub(crate) fn bet(&mut self, player_id: &str, amount: Chips) -> Result<(), GameError> {
        let seat = self.ensure_turn(player_id)?;
        let p = &self.players[seat];
        if amount < p.current_bet {
            return Err(GameError::CannotDecreaseBet);
        }
        if p.balance == 0 {
            return Err(GameError::InsufficientBalance);
        }
        let delta = (amount - p.current_bet).min(p.balance);
        self.players[seat].commit(delta);
        let total = self.players[seat].current_bet;
        if total > self.current_bet {
            self.current_bet = total;
        }
        if delta > 0 {
            self.pots.add_bet(seat, delta, &self.players);
        }
        self.players[seat].touch();
        self.actions_in_round += 1;
        log::debug!("seat {} bets to {}", seat, total);
        self.advance_turn();
        Ok(())
    }

    /// Mark a seat as gone: dead to the pots and the turn order. If that
    /// leaves nobody to contest the pot, the betting phase closes too.
    pub(crate) fn remove_seat(&mut self, seat: SeatIdx) {
        self.players[seat].leave();
        if seat == self.current_player {
            self.advance_turn();
        }
        if self.count(PlayerFilter::ALIVE) <= 1 && matches!(self.phase, HandPhase::Street(_)) {
            self.phase = HandPhase::Showdown;
        }
    }

    /// Move the cursor to the next seat that can act. A full lap finding
    /// nobody leaves the cursor in place; the hand is effectively over.
    pub(crate) fn advance_turn(&mut self) {
        if let Some(next) = self.seat_after(self.current_player, PlayerFilter::ACTIVE) {
            self.current_player = next;
        }
    }

    pub(crate) fn disposition(&self) -> RoundDisposition {
        if matches!(self.phase, HandPhase::Showdown) {
            return RoundDisposition::Showdown;
        }
        let alive = self.count(PlayerFilter::ALIVE);
        if alive <= 1 {
            return RoundDisposition::Showdown;
        }
        let active: Vec<SeatIdx> = self
            .players_iter(PlayerFilter::ACTIVE)
            .map(|(i, _)| i)
            .collect();
        let settled = active
            .iter()
            .all(|&s| self.players[s].current_bet == self.current_bet);
        if active.len() <= 1 {
            // With at most one seat able to act there is no betting left,
            // but a lone seat still facing a raise must answer it first.
            return if settled {
                RoundDisposition::AutoDeal
            } else {
                RoundDisposition::InProgress
            };
        }
        if self.actions_in_round as usize >= active.len() && settled {
            RoundDisposition::AdvanceStreet
        } else {
            RoundDisposition::InProgress
        }
    }

    /// Close the street: deal the next board cards, reset per-round bets,
    /// and hand the action to the first seat after the button.
    pub(crate) fn advance_street(&mut self) -> Result<HandPhase, GameError> {
        let next = match self.phase {
            HandPhase::Street(Street::PreFlop) => HandPhase::Street(Street::Flop),
            HandPhase::Street(Street::Flop) => HandPhase::Street(Street::Turn),
            HandPhase::Street(Street::Turn) => HandPhase::Street(Street::River),
            HandPhase::Street(Street::River) => HandPhase::Showdown,
            other => return Ok(other),
        };
        match next {
            HandPhase::Street(Street::Flop) => {
                self.deck.burn();
                for _ in 0..3 {
                    let c = self.deck.draw()?;
                    self.community.push(c);
                }
            }
            HandPhase::Street(Street::Turn) | HandPhase::Street(Street::River) => {
                self.deck.burn();
                let c = self.deck.draw()?;
                self.community.push(c);
            }
            _ => {}
        }
        self.current_bet = 0;
        for p in self.players.iter_mut() {
            p.current_bet = 0;
        }
        self.pots.reset_current_bets();
        self.actions_in_round = 0;
        if !matches!(next, HandPhase::Showdown) {
            let heads_up = self.count(PlayerFilter::ALIVE) == 2;
            let first = if heads_up {
                self.seat_from(self.dealer, PlayerFilter::ACTIVE)
            } else {
                self.seat_after(self.dealer, PlayerFilter::ACTIVE)
            };
            if let Some(seat) = first {
                self.current_player = seat;
            }
        }
        self.phase = next;
        log::debug!("advanced to {}", next);
        Ok(next)
    }

    /// Deal the next street without touching any betting state. Used when
    /// the board is being run out with nobody left to act. Returns the new
    /// phase and board, or None once the hand reaches showdown.
    pub(crate) fn deal_next_street(
        &mut self,
    ) -> Result<Option<(HandPhase, Vec<Card>)>, GameError> {
        let next = match self.phase {
            HandPhase::Street(Street::PreFlop) => {
                self.deck.burn();
                for _ in 0..3 {
                    let c = self.deck.draw()?;
                    self.community.push(c);
                }
                HandPhase::Street(Street::Flop)
            }
            HandPhase::Street(Street::Flop) => {
                self.deck.burn();
                let c = self.deck.draw()?;
                self.community.push(c);
                HandPhase::Street(Street::Turn)
            }
            HandPhase::Street(Street::Turn) => {
                self.deck.burn();
                let c = self.deck.draw()?;
                self.community.push(c);
                HandPhase::Street(Street::River)
            }
            HandPhase::Street(Street::River) => {
                self.phase = HandPhase::Showdown;
                return Ok(None);
            }
            _ => return Ok(None),
        };
        self.phase = next;
        Ok(Some((next, self.community.clone())))
    }

    /// Settle the hand: return any uncalled bet, finish the board if the
    /// pot is contested, evaluate the live hands, and pay out every pot.
    /// The caller guards against re-entry per hand.
    pub(crate) fn resolve_showdown(&mut self) -> Result<ShowdownResult, GameError> {
        if let Some((seat, refund)) = self.pots.return_uncalled_bet(&mut self.players) {
            log::debug!("seat {} takes back uncalled {}", seat, refund);
        }
        let alive: Vec<SeatIdx> = self
            .players_iter(PlayerFilter::ALIVE)
            .map(|(i, _)| i)
            .collect();
        let total_pot = self.pots.total();
        let before: Vec<Chips> = self.players.iter().map(|p| p.balance).collect();

        if alive.len() > 1 {
            // An all-in hand can arrive here with streets still to deal.
            while matches!(self.phase, HandPhase::Street(_)) {
                self.deal_next_street()?;
            }
            if self.community.len() != 5 {
                return Err(GameError::InvalidShowdownCardCount);
            }
            for &seat in &alive {
                if self.players[seat].hand.len() != 2 {
                    return Err(GameError::InvalidShowdownCardCount);
                }
                let hv = hand::evaluate(&self.players[seat].hand, &self.community)?;
                self.players[seat].hand_value = Some(hv);
            }
        }

        self.pots.distribute(&mut self.players)?;

        let mut winners = Vec::new();
        let mut winner_info = Vec::new();
        for (seat, p) in self.players.iter().enumerate() {
            let delta = p.balance - before[seat];
            if delta > 0 {
                winners.push(p.id.clone());
                winner_info.push(WinnerInfo {
                    player_id: p.id.clone(),
                    seat,
                    winnings: delta,
                    best_hand: p.hand_value.map(|hv| hv.cards().to_vec()),
                    hand_desc: p.hand_value.map(|hv| hv.describe()),
                });
            }
        }
        self.phase = HandPhase::Showdown;
        self.winners = winners.clone();
        log::debug!(
            "hand {} settled: pot {}, winners {:?}",
            self.round,
            total_pot,
            winners
        );
        Ok(ShowdownResult {
            winners,
            winner_info,
            total_pot,
        })
    }
}

fn unix_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
