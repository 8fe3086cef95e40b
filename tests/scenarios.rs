//! Full-table scenarios driven through the public API. Hands that need a
//! known board are set up by restoring a snapshot with a stacked deck and
//! then playing the betting out for real.

use holdem_table::cards::card::Card;
use holdem_table::cards::deck::DeckState;
use holdem_table::config::TableConfig;
use holdem_table::events::EventKind;
use holdem_table::game::{HandPhase, Street};
use holdem_table::player::PlayerState;
use holdem_table::snapshot::{GameSnapshot, PlayerSnapshot, TableStateSnapshot};
use holdem_table::table::{Table, TableState};
use holdem_table::Chips;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn cards(s: &str) -> Vec<Card> {
    s.split_whitespace().map(|w| w.parse().unwrap()).collect()
}

fn cfg(small_blind: Chips, big_blind: Chips) -> TableConfig {
    TableConfig {
        id: "t1".into(),
        host_id: "p0".into(),
        small_blind,
        big_blind,
        starting_chips: 1000,
        street_delay: Duration::ZERO,
        seed: Some(1),
        ..Default::default()
    }
}

struct Seat {
    balance: Chips,
    current_bet: Chips,
    total_bet: Chips,
    hole: &'static str,
}

/// A preflop snapshot: seats as given, dealer at seat 0, action on
/// `current_player`, and `deck` as the exact remaining draw order
/// (burns included).
fn preflop_snapshot(
    seats: &[Seat],
    current_player: usize,
    current_bet: Chips,
    deck: &str,
) -> GameSnapshot {
    let players: Vec<PlayerSnapshot> = seats
        .iter()
        .enumerate()
        .map(|(i, s)| PlayerSnapshot {
            id: format!("p{}", i),
            name: format!("P{}", i),
            balance: s.balance,
            current_bet: s.current_bet,
            total_bet: s.total_bet,
            seat: i,
            state: if s.balance == 0 && s.total_bet > 0 {
                PlayerState::AllIn
            } else {
                PlayerState::InGame
            },
            hand: cards(s.hole),
        })
        .collect();
    let pot = players.iter().map(|p| p.total_bet).sum();
    GameSnapshot {
        dealer: 0,
        current_player,
        current_bet,
        pot,
        round: 1,
        actions_in_round: 0,
        phase: HandPhase::Street(Street::PreFlop),
        bet_round: Some(Street::PreFlop),
        community: Vec::new(),
        deck: DeckState {
            cards: cards(deck),
            seed: None,
        },
        players,
    }
}

async fn balances(table: &Table) -> HashMap<String, Chips> {
    table
        .state_snapshot()
        .await
        .game
        .expect("game should exist")
        .players
        .iter()
        .map(|p| (p.id.clone(), p.balance))
        .collect()
}

/// Heads-up 10/20: the small blind completes, both players check every
/// street, and the stacked board gives seat 0 the better hand.
#[tokio::test]
async fn heads_up_call_down() {
    init_logs();
    let table = Table::new(cfg(10, 20));
    let snap = preflop_snapshot(
        &[
            Seat {
                balance: 990,
                current_bet: 10,
                total_bet: 10,
                hole: "As Ad",
            },
            Seat {
                balance: 980,
                current_bet: 20,
                total_bet: 20,
                hole: "2c 7d",
            },
        ],
        0,
        20,
        "2h Ks Qh Jc 5d 9h 6s 3c",
    );
    table.restore_game(&snap).await.unwrap();
    table.handle_call("p0").await.unwrap();
    table.handle_check("p1").await.unwrap();
    for _street in 0..3 {
        table.handle_check("p0").await.unwrap();
        table.handle_check("p1").await.unwrap();
    }
    let result = table.last_showdown().await.expect("showdown");
    assert_eq!(result.total_pot, 40);
    assert_eq!(result.winners, vec!["p0".to_string()]);
    let b = balances(&table).await;
    assert_eq!(b["p0"], 1020);
    assert_eq!(b["p1"], 980);
}

/// Seat 0 shoves its short stack, seat 1 raises over the top, seat 2
/// calls. Seat 1 holds the best hand and takes main and side pot both.
#[tokio::test]
async fn three_way_side_pot_deep_stack_wins() {
    let table = Table::new(cfg(10, 20));
    let snap = preflop_snapshot(
        &[
            Seat {
                balance: 50,
                current_bet: 0,
                total_bet: 0,
                hole: "Kc Kd",
            },
            Seat {
                balance: 1000,
                current_bet: 0,
                total_bet: 0,
                hole: "Ac Ad",
            },
            Seat {
                balance: 1000,
                current_bet: 0,
                total_bet: 0,
                hole: "7h 2d",
            },
        ],
        0,
        0,
        "2h 4d 9s Jd 5h 3s 6h 8c",
    );
    table.restore_game(&snap).await.unwrap();
    table.make_bet("p0", 50).await.unwrap();
    table.make_bet("p1", 100).await.unwrap();
    table.handle_call("p2").await.unwrap();
    // betting continues heads-up between the two live stacks
    table.handle_check("p1").await.unwrap();
    table.handle_check("p2").await.unwrap();
    table.handle_check("p1").await.unwrap();
    table.handle_check("p2").await.unwrap();
    table.handle_check("p1").await.unwrap();
    table.handle_check("p2").await.unwrap();
    let result = table.last_showdown().await.expect("showdown");
    assert_eq!(result.total_pot, 250);
    assert_eq!(result.winners, vec!["p1".to_string()]);
    let b = balances(&table).await;
    assert_eq!(b["p0"], 0);
    assert_eq!(b["p1"], 1150);
    assert_eq!(b["p2"], 900);
}

/// Same action, but the short all-in stack holds the best hand. It can
/// only win the main pot; the side pot goes to the second-best hand.
#[tokio::test]
async fn three_way_side_pot_short_stack_wins_main_only() {
    let table = Table::new(cfg(10, 20));
    let snap = preflop_snapshot(
        &[
            Seat {
                balance: 50,
                current_bet: 0,
                total_bet: 0,
                hole: "Ac Ad",
            },
            Seat {
                balance: 1000,
                current_bet: 0,
                total_bet: 0,
                hole: "Kc Kd",
            },
            Seat {
                balance: 1000,
                current_bet: 0,
                total_bet: 0,
                hole: "7h 2d",
            },
        ],
        0,
        0,
        "2h 4d 9s Jd 5h 3s 6h 8c",
    );
    table.restore_game(&snap).await.unwrap();
    table.make_bet("p0", 50).await.unwrap();
    table.make_bet("p1", 100).await.unwrap();
    table.handle_call("p2").await.unwrap();
    for _street in 0..3 {
        table.handle_check("p1").await.unwrap();
        table.handle_check("p2").await.unwrap();
    }
    let result = table.last_showdown().await.expect("showdown");
    let mut winners = result.winners.clone();
    winners.sort();
    assert_eq!(winners, vec!["p0".to_string(), "p1".to_string()]);
    let b = balances(&table).await;
    assert_eq!(b["p0"], 150);
    assert_eq!(b["p1"], 1000);
    assert_eq!(b["p2"], 900);
}

/// Three-way tie on a board that plays: the pot splits evenly.
#[tokio::test]
async fn board_plays_three_way_split() {
    let table = Table::new(cfg(10, 20));
    let snap = preflop_snapshot(
        &[
            Seat {
                balance: 1000,
                current_bet: 0,
                total_bet: 0,
                hole: "2c 3c",
            },
            Seat {
                balance: 1000,
                current_bet: 0,
                total_bet: 0,
                hole: "2d 3d",
            },
            Seat {
                balance: 1000,
                current_bet: 0,
                total_bet: 0,
                hole: "2s 3s",
            },
        ],
        0,
        0,
        // board is a royal flush in hearts: everyone plays the board
        "4c Ah Kh Qh 5s Jh 6d Th",
    );
    table.restore_game(&snap).await.unwrap();
    table.make_bet("p0", 50).await.unwrap();
    table.handle_call("p1").await.unwrap();
    table.handle_call("p2").await.unwrap();
    for _street in 0..3 {
        table.handle_check("p1").await.unwrap();
        table.handle_check("p2").await.unwrap();
        table.handle_check("p0").await.unwrap();
    }
    let result = table.last_showdown().await.expect("showdown");
    assert_eq!(result.total_pot, 150);
    assert_eq!(result.winners.len(), 3);
    let b = balances(&table).await;
    assert_eq!(b["p0"], 1000);
    assert_eq!(b["p1"], 1000);
    assert_eq!(b["p2"], 1000);
}

/// Both players all in preflop. The board is run out with no further
/// betting, the loser busts, and the table winds the game down.
#[tokio::test]
async fn all_in_preflop_runs_board_and_ends_game() {
    init_logs();
    let table = Table::new(cfg(10, 20));
    let (tx, mut rx) = mpsc::channel(64);
    table.set_event_channel(tx);
    let snap = preflop_snapshot(
        &[
            Seat {
                balance: 40,
                current_bet: 10,
                total_bet: 10,
                hole: "As Ad",
            },
            Seat {
                balance: 30,
                current_bet: 20,
                total_bet: 20,
                hole: "2c 7d",
            },
        ],
        0,
        20,
        "2h Ks Qh Jc 5d 9h 6s 3c",
    );
    table.restore_game(&snap).await.unwrap();
    table.make_bet("p0", 50).await.unwrap();
    table.handle_call("p1").await.unwrap();

    let result = table.last_showdown().await.expect("showdown");
    assert_eq!(result.total_pot, 100);
    assert_eq!(result.winners, vec!["p0".to_string()]);
    assert_eq!(result.winner_info[0].winnings, 100);

    // the loser busted: the game is over and the table is back to waiting
    assert_eq!(table.table_state().await, TableState::WaitingForPlayers);
    let snap = table.state_snapshot().await;
    assert!(!snap.game_started);
    assert!(snap.game.is_none());

    let mut kinds = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        kinds.push(ev.kind());
    }
    assert_eq!(
        kinds,
        vec![
            EventKind::NewRound,
            EventKind::NewRound,
            EventKind::NewRound,
            EventKind::ShowdownResult,
            EventKind::GameEnded,
        ]
    );
}

/// The bet ledger and the pot stay balanced at every observable point.
#[tokio::test]
async fn bets_and_pots_balance_mid_hand() {
    let table = Table::new(cfg(10, 20));
    for i in 0..3 {
        table
            .add_user(format!("p{}", i), format!("P{}", i), 0)
            .await
            .unwrap();
        table
            .set_player_ready(&format!("p{}", i), true)
            .await
            .unwrap();
    }
    table.start_game().await.unwrap();
    table.make_bet("p0", 60).await.unwrap();
    table.handle_call("p1").await.unwrap();
    let game = table.state_snapshot().await.game.unwrap();
    let ledger: Chips = game.players.iter().map(|p| p.total_bet).sum();
    assert_eq!(game.pot, ledger);
    assert_eq!(game.pot, 60 + 60 + 20);
}

/// Snapshots round-trip through JSON and restore to an equivalent game.
#[tokio::test]
async fn snapshot_round_trip_restores_play() {
    let table = Table::new(cfg(10, 20));
    for i in 0..2 {
        table
            .add_user(format!("p{}", i), format!("P{}", i), 0)
            .await
            .unwrap();
        table
            .set_player_ready(&format!("p{}", i), true)
            .await
            .unwrap();
    }
    table.start_game().await.unwrap();
    table.handle_call("p0").await.unwrap();

    let snap = table.state_snapshot().await;
    let j = serde_json::to_string(&snap).unwrap();
    let back: TableStateSnapshot = serde_json::from_str(&j).unwrap();
    assert_eq!(back, snap);

    // bring the snapshot up on a fresh table and keep playing
    let table2 = Table::new(cfg(10, 20));
    table2.restore_game(back.game.as_ref().unwrap()).await.unwrap();
    assert_eq!(
        table2.current_player_id().await,
        table.current_player_id().await
    );
    table2.handle_check("p1").await.unwrap();
    let game = table2.state_snapshot().await.game.unwrap();
    assert_eq!(game.phase, HandPhase::Street(Street::Flop));
    assert_eq!(game.community.len(), 3);
}

/// A short-stacked big blind posts what it has and is all in; the pot is
/// stratified accordingly from the first action.
#[tokio::test]
async fn short_blind_creates_side_pot() {
    let table = Table::new(TableConfig {
        starting_chips: 1000,
        ..cfg(10, 20)
    });
    // the big blind could only post 15 of the 20 and is already all in
    let snap = preflop_snapshot(
        &[
            Seat {
                balance: 990,
                current_bet: 10,
                total_bet: 10,
                hole: "2c 7d",
            },
            Seat {
                balance: 0,
                current_bet: 15,
                total_bet: 15,
                hole: "As Ad",
            },
        ],
        0,
        20,
        "2h Ks Qh Jc 5d 9h 6s 3c",
    );
    table.restore_game(&snap).await.unwrap();
    let game = table.state_snapshot().await.game.unwrap();
    assert_eq!(game.pot, 25);
    // the caller matches the nominal big blind; the 5 chips the all-in
    // seat never covered come back before the pot is paid
    table.handle_call("p0").await.unwrap();
    let result = table.last_showdown().await.expect("showdown");
    assert_eq!(result.total_pot, 30);
    assert_eq!(result.winners, vec!["p1".to_string()]);
    let b = balances(&table).await;
    assert_eq!(b["p0"], 985);
    assert_eq!(b["p1"], 30);
}
