use crate::config::TableConfig;
use crate::errors::{GameError, TableError};
use crate::events::{BlindKind, Event, EventPayload, EventPublisher};
use crate::game::{
    AutoStartHooks, BlindPost, Game, GameInner, HandPhase, NotifyFn, RoundDisposition,
    ShowdownResult,
};
use crate::player::{Player, PlayerState};
use crate::snapshot::{GameSnapshot, TableStateSnapshot, UserSnapshot};
use crate::{Chips, PlayerId, SeatIdx};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, Weak};
use tokio::sync::{mpsc, RwLock};

/// Table lifecycle: gathering people, everyone ready, or a game running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    WaitingForPlayers,
    PlayersReady,
    GameActive,
}

/// A seated account. Chip balances live on the hand's `Player`; the user
/// record only carries lobby-level state.
#[derive(Debug, Clone)]
pub struct User {
    pub id: PlayerId,
    pub name: String,
    pub seat: SeatIdx,
    pub ready: bool,
    /// Account balance used by the join gate; the account layer validates
    /// it against the table's buy-in.
    pub account_balance: Chips,
}

struct TableInner {
    users: HashMap<PlayerId, User>,
    state: TableState,
    game: Option<Arc<Game>>,
    last_showdown: Option<ShowdownResult>,
    /// The last hand ordinal whose showdown has been settled; keeps
    /// resolution idempotent however many callers race into it.
    resolved_round: u64,
    host_id: PlayerId,
}

/// One poker table: seats, lifecycle state, the running game, and the
/// outward event stream. All methods are safe to call concurrently; the
/// table lock is always taken before the game lock, never after.
pub struct Table {
    cfg: TableConfig,
    weak: Weak<Table>,
    inner: RwLock<TableInner>,
    events: EventPublisher,
    on_new_hand_started: StdMutex<Option<NotifyFn>>,
}

impl Table {
    pub fn new(cfg: TableConfig) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            cfg: cfg.clone(),
            inner: RwLock::new(TableInner {
                users: HashMap::new(),
                state: TableState::WaitingForPlayers,
                game: None,
                last_showdown: None,
                resolved_round: 0,
                host_id: cfg.host_id.clone(),
            }),
            weak: weak.clone(),
            events: EventPublisher::default(),
            on_new_hand_started: StdMutex::new(None),
        })
    }

    pub fn config(&self) -> &TableConfig {
        &self.cfg
    }

    /// Attach the outbound notification channel. Publication is
    /// non-blocking; a full channel drops events.
    pub fn set_event_channel(&self, tx: mpsc::Sender<Event>) {
        self.events.set_channel(tx);
    }

    /// Optional callback fired (in its own task) after an auto-started hand
    /// has been dealt.
    pub fn set_new_hand_callback(&self, cb: NotifyFn) {
        *self
            .on_new_hand_started
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(cb);
    }

    pub async fn table_state(&self) -> TableState {
        self.inner.read().await.state
    }

    /// Seat an account at the lowest free seat.
    pub async fn add_user(
        &self,
        id: PlayerId,
        name: String,
        account_balance: Chips,
    ) -> Result<SeatIdx, TableError> {
        let mut inner = self.inner.write().await;
        if inner.users.contains_key(&id) {
            return Err(TableError::AlreadyAtTable);
        }
        if inner.users.len() >= self.cfg.max_players {
            return Err(TableError::TableFull);
        }
        let taken: Vec<SeatIdx> = inner.users.values().map(|u| u.seat).collect();
        let seat = (0..self.cfg.max_players)
            .find(|s| !taken.contains(s))
            .ok_or(TableError::TableFull)?;
        log::info!("{} sits at table {} seat {}", id, self.cfg.id, seat);
        inner.users.insert(
            id.clone(),
            User {
                id,
                name,
                seat,
                ready: false,
                account_balance,
            },
        );
        Ok(seat)
    }

    /// Seat a brand-new account with no lobby balance on record.
    pub async fn add_new_user(&self, id: PlayerId, name: String) -> Result<SeatIdx, TableError> {
        self.add_user(id, name, 0).await
    }

    /// Unseat a user. If a hand is running their seat is marked as gone:
    /// dead to the pots and skipped by the turn order.
    pub async fn remove_user(&self, id: &str) -> Result<(), TableError> {
        let mut inner = self.inner.write().await;
        if inner.users.remove(id).is_none() {
            return Err(TableError::UserNotFound);
        }
        log::info!("{} leaves table {}", id, self.cfg.id);
        let game = inner.game.clone();
        let mut left_hand = false;
        if let Some(game) = &game {
            let mut g = game.mu.lock().await;
            if let Some(seat) = g.seat_of(id) {
                g.remove_seat(seat);
                left_hand = true;
            }
        }
        if inner.state == TableState::PlayersReady && inner.users.len() < self.cfg.min_players {
            inner.state = TableState::WaitingForPlayers;
        }
        drop(inner);
        // A departure can end the hand outright (everyone else folded or
        // gone), so run the usual post-action progression.
        if left_hand {
            if let Some(game) = &game {
                self.progress(game).await?;
            }
        }
        Ok(())
    }

    pub async fn set_host(&self, id: PlayerId) -> Result<(), TableError> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&id) {
            return Err(TableError::UserNotFound);
        }
        inner.host_id = id;
        Ok(())
    }

    /// Flip a user's ready flag. When everyone at a quorate table is ready
    /// the lobby moves to `PlayersReady`.
    pub async fn set_player_ready(&self, id: &str, ready: bool) -> Result<(), TableError> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(id).ok_or(TableError::UserNotFound)?;
        user.ready = ready;
        if ready {
            self.events.publish(
                &self.cfg.id,
                EventPayload::PlayerReady {
                    player_id: id.to_string(),
                },
            );
        }
        self.check_all_players_ready(&mut inner);
        Ok(())
    }

    fn check_all_players_ready(&self, inner: &mut TableInner) {
        if inner.state == TableState::WaitingForPlayers
            && inner.users.len() >= self.cfg.min_players
            && inner.users.values().all(|u| u.ready)
        {
            inner.state = TableState::PlayersReady;
            self.events
                .publish(&self.cfg.id, EventPayload::AllPlayersReady);
        }
    }

    /// Deal the first hand. Admissible only from `PlayersReady`; everyone
    /// seated is bought in for the configured starting chips.
    pub async fn start_game(&self) -> Result<(), TableError> {
        let mut inner = self.inner.write().await;
        if inner.state != TableState::PlayersReady {
            return Err(TableError::NotInPlayersReady);
        }
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by_key(|u| u.seat);
        let roster: Vec<Player> = users
            .iter()
            .enumerate()
            .map(|(idx, u)| {
                Player::new(u.id.clone(), u.name.clone(), self.cfg.starting_chips, idx)
            })
            .collect();
        let ids: Vec<PlayerId> = roster.iter().map(|p| p.id.clone()).collect();
        let game = Arc::new(Game::new(roster.clone(), &self.cfg)?);
        game.set_hooks(self.make_hooks());
        let posts = {
            let mut g = game.mu.lock().await;
            g.reset_for_new_hand(roster)?
        };
        inner.game = Some(game);
        inner.state = TableState::GameActive;
        inner.last_showdown = None;
        inner.resolved_round = 0;
        log::info!("table {} starts a game with {} players", self.cfg.id, ids.len());
        self.events
            .publish(&self.cfg.id, EventPayload::GameStarted { players: ids });
        self.publish_blinds(posts);
        Ok(())
    }

    /// Deal the next hand: returning seats keep their chips, newly seated
    /// users buy in fresh, the button rotates. Called by the auto-start
    /// timer or explicitly by the operator.
    pub async fn start_new_hand(&self) -> Result<(), TableError> {
        let mut inner = self.inner.write().await;
        let game = inner.game.clone().ok_or(TableError::GameNotStarted)?;
        let mut g = game.mu.lock().await;
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by_key(|u| u.seat);
        let roster: Vec<Player> = users
            .iter()
            .enumerate()
            .map(|(idx, u)| match g.players.iter().find(|p| p.id == u.id) {
                Some(existing) => {
                    let mut p = existing.clone();
                    p.seat = idx;
                    p
                }
                None => Player::new(u.id.clone(), u.name.clone(), self.cfg.starting_chips, idx),
            })
            .collect();
        let posts = g.reset_for_new_hand(roster)?;
        let (round, dealer) = (g.round, g.dealer);
        drop(g);
        inner.last_showdown = None;
        inner.state = TableState::GameActive;
        drop(inner);
        log::info!("table {} deals hand {}", self.cfg.id, round);
        self.events
            .publish(&self.cfg.id, EventPayload::NewHandStarted { round, dealer });
        self.publish_blinds(posts);
        Ok(())
    }

    fn publish_blinds(&self, posts: Vec<BlindPost>) {
        for post in posts {
            self.events.publish(
                &self.cfg.id,
                EventPayload::BlindPosted {
                    player_id: post.player_id,
                    seat: post.seat,
                    amount: post.amount,
                    blind: if post.is_big {
                        BlindKind::Big
                    } else {
                        BlindKind::Small
                    },
                },
            );
        }
    }

    fn make_hooks(&self) -> AutoStartHooks {
        let weak = self.weak.clone();
        let min = self.cfg.min_players;
        let notify = self
            .on_new_hand_started
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        AutoStartHooks {
            min_players: Arc::new(move || min),
            start_new_hand: Arc::new(move || {
                let weak = weak.clone();
                Box::pin(async move {
                    match weak.upgrade() {
                        Some(table) => table.start_new_hand().await,
                        None => Ok(()),
                    }
                }) as BoxFuture<'static, Result<(), TableError>>
            }),
            on_new_hand_started: notify,
        }
    }

    pub async fn handle_fold(&self, player_id: &str) -> Result<(), TableError> {
        let game = self.action(player_id, |g, pid| g.fold(pid)).await?;
        self.progress(&game).await
    }

    pub async fn handle_check(&self, player_id: &str) -> Result<(), TableError> {
        let game = self.action(player_id, |g, pid| g.check(pid)).await?;
        self.progress(&game).await
    }

    pub async fn handle_call(&self, player_id: &str) -> Result<(), TableError> {
        let game = self.action(player_id, |g, pid| g.call(pid)).await?;
        self.progress(&game).await
    }

    /// `amount` is the player's new total for the betting round.
    pub async fn make_bet(&self, player_id: &str, amount: Chips) -> Result<(), TableError> {
        let game = self
            .action(player_id, move |g, pid| g.bet(pid, amount))
            .await?;
        self.progress(&game).await
    }

    /// Common action plumbing: require an active game and a seated user,
    /// then run the handler under the game lock (which re-checks the turn).
    async fn action<F>(&self, player_id: &str, f: F) -> Result<Arc<Game>, TableError>
    where
        F: FnOnce(&mut GameInner, &str) -> Result<(), GameError>,
    {
        let inner = self.inner.read().await;
        if inner.state != TableState::GameActive {
            return Err(TableError::GameNotStarted);
        }
        let game = inner.game.clone().ok_or(TableError::GameNotStarted)?;
        if !inner.users.contains_key(player_id) {
            return Err(TableError::UserNotFound);
        }
        {
            let mut g = game.mu.lock().await;
            f(&mut g, player_id)?;
        }
        drop(inner);
        Ok(game)
    }

    /// After every accepted action: decide whether the street, the hand, or
    /// nothing at all just ended, and drive the consequences.
    async fn progress(&self, game: &Arc<Game>) -> Result<(), TableError> {
        let disposition = {
            let g = game.mu.lock().await;
            g.disposition()
        };
        match disposition {
            RoundDisposition::InProgress => Ok(()),
            RoundDisposition::AdvanceStreet => {
                let (phase, community) = {
                    let mut g = game.mu.lock().await;
                    let phase = g.advance_street()?;
                    (phase, g.community.clone())
                };
                if matches!(phase, HandPhase::Showdown) {
                    self.finish_hand(game).await
                } else {
                    self.events
                        .publish(&self.cfg.id, EventPayload::NewRound { phase, community });
                    Ok(())
                }
            }
            RoundDisposition::AutoDeal => {
                if self.cfg.street_delay.is_zero() {
                    self.run_out_board(game.clone()).await
                } else {
                    // Paced run-out happens off this call so no lock is ever
                    // held across the sleeps.
                    let Some(table) = self.weak.upgrade() else {
                        return Ok(());
                    };
                    let game = game.clone();
                    tokio::spawn(async move {
                        if let Err(e) = table.run_out_board(game).await {
                            log::warn!("board run-out failed: {}", e);
                        }
                    });
                    Ok(())
                }
            }
            RoundDisposition::Showdown => self.finish_hand(game).await,
        }
    }

    /// Deal the remaining streets with nothing left to bet, pausing between
    /// them so snapshots observe each phase, then settle the hand.
    async fn run_out_board(&self, game: Arc<Game>) -> Result<(), TableError> {
        loop {
            tokio::time::sleep(self.cfg.street_delay).await;
            let dealt = {
                let mut g = game.mu.lock().await;
                g.deal_next_street()?
            };
            match dealt {
                Some((phase, community)) => {
                    self.events
                        .publish(&self.cfg.id, EventPayload::NewRound { phase, community });
                }
                None => break,
            }
        }
        self.finish_hand(&game).await
    }

    /// Resolve the showdown exactly once per hand, publish the result, bust
    /// out empty stacks, and arm the next hand's auto-start.
    async fn finish_hand(&self, game: &Arc<Game>) -> Result<(), TableError> {
        let mut inner = self.inner.write().await;
        let (result, busted) = {
            let mut g = game.mu.lock().await;
            if inner.resolved_round >= g.round {
                return Ok(());
            }
            let result = g.resolve_showdown()?;
            inner.resolved_round = g.round;
            let busted: Vec<PlayerId> = g
                .players
                .iter()
                .filter(|p| p.balance == 0 && p.state != PlayerState::Left)
                .map(|p| p.id.clone())
                .collect();
            (result, busted)
        };
        inner.last_showdown = Some(result.clone());
        self.events
            .publish(&self.cfg.id, EventPayload::Showdown(result));
        for id in &busted {
            log::info!("{} busted out of table {}", id, self.cfg.id);
            inner.users.remove(id);
        }
        let remaining = inner.users.len();
        if remaining < 2 {
            for u in inner.users.values_mut() {
                u.ready = false;
            }
            inner.state = TableState::WaitingForPlayers;
            inner.game = None;
            log::info!("table {} game over, {} seat(s) left", self.cfg.id, remaining);
            self.events.publish(&self.cfg.id, EventPayload::GameEnded);
            return Ok(());
        }
        if remaining < self.cfg.min_players {
            log::info!(
                "table {} continues short-handed with {} players",
                self.cfg.id,
                remaining
            );
        }
        drop(inner);
        Game::schedule_auto_start(game, self.cfg.auto_start_delay);
        Ok(())
    }

    /// Check the clock on the seat holding the action. Expired seats check
    /// when checking is free, otherwise fold. Meant to be driven
    /// periodically from outside; does nothing without a game or with a
    /// zero time bank.
    pub async fn handle_timeouts(&self) -> Result<(), TableError> {
        if self.cfg.time_bank.is_zero() {
            return Ok(());
        }
        let game = {
            let inner = self.inner.read().await;
            if inner.state != TableState::GameActive {
                return Ok(());
            }
            match inner.game.clone() {
                Some(g) => g,
                None => return Ok(()),
            }
        };
        let acted = {
            let mut g = game.mu.lock().await;
            if !matches!(g.phase, HandPhase::Street(_)) {
                false
            } else {
                let seat = g.current_player;
                let expired = g
                    .players
                    .get(seat)
                    .map(|p| p.is_active() && p.last_action.elapsed() > self.cfg.time_bank)
                    .unwrap_or(false);
                if expired {
                    let pid = g.players[seat].id.clone();
                    if g.players[seat].current_bet == g.current_bet {
                        log::info!("seat {} timed out: auto-check", seat);
                        g.check(&pid)?;
                    } else {
                        log::info!("seat {} timed out: auto-fold", seat);
                        g.fold(&pid)?;
                    }
                }
                expired
            }
        };
        if acted {
            self.progress(&game).await
        } else {
            Ok(())
        }
    }

    /// Whose action it is right now, if a hand is running.
    pub async fn current_player_id(&self) -> Option<PlayerId> {
        let inner = self.inner.read().await;
        let game = inner.game.clone()?;
        let g = game.mu.lock().await;
        g.current_player_id()
    }

    pub async fn last_showdown(&self) -> Option<ShowdownResult> {
        self.inner.read().await.last_showdown.clone()
    }

    /// Atomic point-in-time view of the table and any running hand. Hole
    /// cards are included; the transport filters per recipient.
    pub async fn state_snapshot(&self) -> TableStateSnapshot {
        let inner = self.inner.read().await;
        let mut users: Vec<UserSnapshot> = inner
            .users
            .values()
            .map(|u| UserSnapshot {
                id: u.id.clone(),
                name: u.name.clone(),
                seat: u.seat,
                ready: u.ready,
            })
            .collect();
        users.sort_by_key(|u| u.seat);
        let game = match &inner.game {
            Some(game) => {
                let g = game.mu.lock().await;
                Some(GameSnapshot::capture(&g))
            }
            None => None,
        };
        let mut config = self.cfg.clone();
        config.host_id = inner.host_id.clone();
        TableStateSnapshot {
            config,
            users,
            game_started: inner.state == TableState::GameActive,
            game_phase: game.as_ref().map(|g| g.phase),
            game,
        }
    }

    /// Replace the running game with one rebuilt from a snapshot. Seats in
    /// the snapshot that aren't at the table are re-seated. Timers are not
    /// re-armed; the restorer decides whether auto-start should resume.
    pub async fn restore_game(&self, snap: &GameSnapshot) -> Result<(), TableError> {
        let mut inner = self.inner.write().await;
        let restored = GameInner::from_snapshot(snap, &self.cfg)?;
        let game = Arc::new(Game::from_inner(restored));
        game.set_hooks(self.make_hooks());
        for ps in &snap.players {
            if !inner.users.contains_key(&ps.id) && ps.state != PlayerState::Left {
                inner.users.insert(
                    ps.id.clone(),
                    User {
                        id: ps.id.clone(),
                        name: ps.name.clone(),
                        seat: ps.seat,
                        ready: true,
                        account_balance: 0,
                    },
                );
            }
        }
        inner.resolved_round = if matches!(snap.phase, HandPhase::Showdown) {
            snap.round
        } else {
            snap.round.saturating_sub(1)
        };
        inner.last_showdown = None;
        inner.game = Some(game);
        inner.state = TableState::GameActive;
        log::info!("table {} restored at hand {}", self.cfg.id, snap.round);
        Ok(())
    }

    /// Stop any pending auto-start timer.
    pub async fn cancel_auto_start(&self) {
        let inner = self.inner.read().await;
        if let Some(game) = &inner.game {
            game.cancel_auto_start();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_cfg() -> TableConfig {
        TableConfig {
            id: "t1".into(),
            host_id: "p0".into(),
            small_blind: 10,
            big_blind: 20,
            starting_chips: 1000,
            street_delay: Duration::ZERO,
            seed: Some(1),
            ..Default::default()
        }
    }

    async fn ready_table(n: usize) -> Arc<Table> {
        let table = Table::new(test_cfg());
        for i in 0..n {
            table
                .add_user(format!("p{}", i), format!("P{}", i), 0)
                .await
                .unwrap();
        }
        for i in 0..n {
            table.set_player_ready(&format!("p{}", i), true).await.unwrap();
        }
        table
    }

    #[tokio::test]
    async fn lobby_state_machine() {
        let table = Table::new(test_cfg());
        assert_eq!(table.table_state().await, TableState::WaitingForPlayers);
        assert_eq!(
            table.start_game().await.unwrap_err(),
            TableError::NotInPlayersReady
        );
        table.add_user("p0".into(), "P0".into(), 0).await.unwrap();
        table.set_player_ready("p0", true).await.unwrap();
        // one ready player is not a quorum
        assert_eq!(table.table_state().await, TableState::WaitingForPlayers);
        table.add_user("p1".into(), "P1".into(), 0).await.unwrap();
        assert_eq!(table.table_state().await, TableState::WaitingForPlayers);
        table.set_player_ready("p1", true).await.unwrap();
        assert_eq!(table.table_state().await, TableState::PlayersReady);
        table.start_game().await.unwrap();
        assert_eq!(table.table_state().await, TableState::GameActive);
    }

    #[tokio::test]
    async fn seating_validation() {
        let table = Table::new(TableConfig {
            max_players: 2,
            ..test_cfg()
        });
        table.add_user("p0".into(), "P0".into(), 0).await.unwrap();
        assert_eq!(
            table.add_user("p0".into(), "P0".into(), 0).await.unwrap_err(),
            TableError::AlreadyAtTable
        );
        table.add_user("p1".into(), "P1".into(), 0).await.unwrap();
        assert_eq!(
            table.add_user("p2".into(), "P2".into(), 0).await.unwrap_err(),
            TableError::TableFull
        );
        assert_eq!(
            table.remove_user("nobody").await.unwrap_err(),
            TableError::UserNotFound
        );
        table.remove_user("p1").await.unwrap();
        // the freed seat is reused
        let seat = table.add_user("p3".into(), "P3".into(), 0).await.unwrap();
        assert_eq!(seat, 1);
    }

    #[tokio::test]
    async fn turn_validation_through_the_table() {
        let table = ready_table(2).await;
        table.start_game().await.unwrap();
        // heads-up: dealer p0 is the small blind and acts first
        assert_eq!(table.current_player_id().await.unwrap(), "p0");
        assert_eq!(
            table.handle_check("p1").await.unwrap_err(),
            TableError::GameError(GameError::NotYourTurn)
        );
        assert_eq!(
            table.handle_call("ghost").await.unwrap_err(),
            TableError::UserNotFound
        );
        table.handle_call("p0").await.unwrap();
        assert_eq!(table.current_player_id().await.unwrap(), "p1");
    }

    #[tokio::test]
    async fn actions_rejected_with_no_game() {
        let table = Table::new(test_cfg());
        assert_eq!(
            table.handle_fold("p0").await.unwrap_err(),
            TableError::GameNotStarted
        );
        assert_eq!(
            table.start_new_hand().await.unwrap_err(),
            TableError::GameNotStarted
        );
    }

    #[tokio::test]
    async fn check_down_reaches_showdown() {
        let table = ready_table(2).await;
        table.start_game().await.unwrap();
        table.handle_call("p0").await.unwrap();
        table.handle_check("p1").await.unwrap();
        for _street in 0..3 {
            table.handle_check("p0").await.unwrap();
            table.handle_check("p1").await.unwrap();
        }
        let result = table.last_showdown().await.expect("hand should be settled");
        assert_eq!(result.total_pot, 40);
        assert!(!result.winners.is_empty());
        // chips are conserved
        let snap = table.state_snapshot().await;
        let game = snap.game.unwrap();
        let total: Chips = game.players.iter().map(|p| p.balance).sum();
        assert_eq!(total, 2000);
        assert!(matches!(game.phase, HandPhase::Showdown));
    }

    #[tokio::test]
    async fn fold_win_refunds_uncalled_raise() {
        // blinds 10/20; the button opens to 60 and both blinds fold
        let table = ready_table(3).await;
        table.start_game().await.unwrap();
        // dealer p0, sb p1, bb p2, action on p0
        assert_eq!(table.current_player_id().await.unwrap(), "p0");
        table.make_bet("p0", 60).await.unwrap();
        table.handle_fold("p1").await.unwrap();
        table.handle_fold("p2").await.unwrap();
        let result = table.last_showdown().await.unwrap();
        assert_eq!(result.total_pot, 50);
        assert_eq!(result.winners, vec!["p0".to_string()]);
        let snap = table.state_snapshot().await;
        let balances: HashMap<String, Chips> = snap
            .game
            .unwrap()
            .players
            .iter()
            .map(|p| (p.id.clone(), p.balance))
            .collect();
        assert_eq!(balances["p0"], 1030);
        assert_eq!(balances["p1"], 990);
        assert_eq!(balances["p2"], 980);
    }

    #[tokio::test]
    async fn showdown_resolution_is_idempotent() {
        let table = ready_table(3).await;
        table.start_game().await.unwrap();
        table.make_bet("p0", 60).await.unwrap();
        table.handle_fold("p1").await.unwrap();
        table.handle_fold("p2").await.unwrap();
        let first = table.last_showdown().await.unwrap();
        // late or duplicate completion calls must not pay twice
        let inner = table.inner.read().await;
        let game = inner.game.clone().unwrap();
        drop(inner);
        table.finish_hand(&game).await.unwrap();
        let snap = table.state_snapshot().await;
        let p0 = snap
            .game
            .unwrap()
            .players
            .iter()
            .find(|p| p.id == "p0")
            .unwrap()
            .balance;
        assert_eq!(p0, 1030);
        assert_eq!(table.last_showdown().await.unwrap(), first);
    }

    #[tokio::test]
    async fn timeout_auto_folds_facing_a_bet() {
        let table = Table::new(TableConfig {
            time_bank: Duration::from_millis(5),
            ..test_cfg()
        });
        for i in 0..2 {
            table
                .add_user(format!("p{}", i), format!("P{}", i), 0)
                .await
                .unwrap();
            table.set_player_ready(&format!("p{}", i), true).await.unwrap();
        }
        table.start_game().await.unwrap();
        // p0 (sb) owes 10 more; expiry folds them and p1 wins uncontested
        tokio::time::sleep(Duration::from_millis(20)).await;
        table.handle_timeouts().await.unwrap();
        let result = table.last_showdown().await.expect("timeout should settle");
        assert_eq!(result.winners, vec!["p1".to_string()]);
    }

    #[tokio::test]
    async fn timeout_auto_checks_when_free() {
        let table = Table::new(TableConfig {
            time_bank: Duration::from_millis(5),
            ..test_cfg()
        });
        for i in 0..2 {
            table
                .add_user(format!("p{}", i), format!("P{}", i), 0)
                .await
                .unwrap();
            table.set_player_ready(&format!("p{}", i), true).await.unwrap();
        }
        table.start_game().await.unwrap();
        table.handle_call("p0").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        // p1 has matched the bet: the timeout checks instead of folding
        table.handle_timeouts().await.unwrap();
        assert!(table.last_showdown().await.is_none());
        let snap = table.state_snapshot().await;
        assert_eq!(snap.game_phase, Some(HandPhase::Street(crate::game::Street::Flop)));
    }

    #[tokio::test]
    async fn timeouts_do_nothing_before_the_clock() {
        let table = Table::new(TableConfig {
            time_bank: Duration::from_secs(3600),
            ..test_cfg()
        });
        for i in 0..2 {
            table
                .add_user(format!("p{}", i), format!("P{}", i), 0)
                .await
                .unwrap();
            table.set_player_ready(&format!("p{}", i), true).await.unwrap();
        }
        table.start_game().await.unwrap();
        table.handle_timeouts().await.unwrap();
        assert_eq!(table.current_player_id().await.unwrap(), "p0");
    }

    #[tokio::test]
    async fn events_flow_in_order() {
        let table = ready_table(2).await;
        let (tx, mut rx) = mpsc::channel(64);
        table.set_event_channel(tx);
        table.set_player_ready("p0", true).await.unwrap(); // re-ready publishes again
        table.start_game().await.unwrap();
        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind());
        }
        use crate::events::EventKind::*;
        assert_eq!(kinds, vec![PlayerReady, GameStarted, BlindPosted, BlindPosted]);
    }

    #[tokio::test]
    async fn new_hand_preserves_balances_and_rotates_button() {
        let table = ready_table(3).await;
        table.start_game().await.unwrap();
        table.make_bet("p0", 60).await.unwrap();
        table.handle_fold("p1").await.unwrap();
        table.handle_fold("p2").await.unwrap();
        assert!(table.last_showdown().await.is_some());
        table.start_new_hand().await.unwrap();
        assert!(table.last_showdown().await.is_none());
        let snap = table.state_snapshot().await;
        let game = snap.game.unwrap();
        assert_eq!(game.round, 2);
        assert_eq!(game.dealer, 1);
        // p0 kept last hand's winnings, minus the blinds just posted
        let total: Chips = game
            .players
            .iter()
            .map(|p| p.balance + p.total_bet)
            .sum();
        assert_eq!(total, 3000);
    }

    #[tokio::test]
    async fn auto_start_deals_the_next_hand() {
        let table = Table::new(TableConfig {
            auto_start_delay: Duration::from_millis(10),
            ..test_cfg()
        });
        for i in 0..3 {
            table
                .add_user(format!("p{}", i), format!("P{}", i), 0)
                .await
                .unwrap();
            table.set_player_ready(&format!("p{}", i), true).await.unwrap();
        }
        table.start_game().await.unwrap();
        table.make_bet("p0", 60).await.unwrap();
        table.handle_fold("p1").await.unwrap();
        table.handle_fold("p2").await.unwrap();
        assert!(table.last_showdown().await.is_some());
        // the timer fires and deals hand 2 on its own
        tokio::time::sleep(Duration::from_millis(100)).await;
        let game = table.state_snapshot().await.game.unwrap();
        assert_eq!(game.round, 2);
        assert!(table.last_showdown().await.is_none());
    }

    #[tokio::test]
    async fn canceled_auto_start_stays_put() {
        let table = Table::new(TableConfig {
            auto_start_delay: Duration::from_millis(20),
            ..test_cfg()
        });
        for i in 0..3 {
            table
                .add_user(format!("p{}", i), format!("P{}", i), 0)
                .await
                .unwrap();
            table.set_player_ready(&format!("p{}", i), true).await.unwrap();
        }
        table.start_game().await.unwrap();
        table.make_bet("p0", 60).await.unwrap();
        table.handle_fold("p1").await.unwrap();
        table.handle_fold("p2").await.unwrap();
        table.cancel_auto_start().await;
        // canceling twice is fine
        table.cancel_auto_start().await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        let game = table.state_snapshot().await.game.unwrap();
        assert_eq!(game.round, 1);
    }

    #[tokio::test]
    async fn removing_current_player_moves_the_action() {
        let table = ready_table(3).await;
        table.start_game().await.unwrap();
        assert_eq!(table.current_player_id().await.unwrap(), "p0");
        table.remove_user("p0").await.unwrap();
        assert_eq!(table.current_player_id().await.unwrap(), "p1");
        // the departed seat's blind money stays in the pot
        let snap = table.state_snapshot().await;
        assert_eq!(snap.game.unwrap().pot, 30);
    }
}
