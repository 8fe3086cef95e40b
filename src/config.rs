use crate::{Chips, PlayerId, MAX_PLAYERS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything a table needs to know about itself. Blinds and chip amounts
/// are plain chip counts; `big_blind >= 2 * small_blind` is conventional
/// but not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub id: String,
    pub host_id: PlayerId,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub min_players: usize,
    pub max_players: usize,
    /// Chips handed to a player the first time they sit down.
    pub starting_chips: Chips,
    /// Account-level join gating. Validated by the account layer, carried
    /// here so snapshots describe the table completely.
    pub buy_in: Chips,
    pub min_balance: Chips,
    /// Per-action clock before the table checks or folds for the player.
    /// Zero disables enforcement.
    pub time_bank: Duration,
    /// Pause between showdown and the next hand auto-starting. Zero
    /// disables auto-start.
    pub auto_start_delay: Duration,
    /// Pause between streets when the remaining board runs out with no
    /// betting left, so observers see each phase. Zero deals immediately.
    pub street_delay: Duration,
    /// Deterministic RNG root. When unset every hand reseeds itself.
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            host_id: String::new(),
            small_blind: 5,
            big_blind: 10,
            min_players: 2,
            max_players: MAX_PLAYERS,
            starting_chips: 1000,
            buy_in: 0,
            min_balance: 0,
            time_bank: Duration::ZERO,
            auto_start_delay: Duration::ZERO,
            street_delay: Duration::from_secs(1),
            seed: None,
        }
    }
}
