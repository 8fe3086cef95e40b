//! Errors are values: every rule violation is reported to the caller and
//! leaves the table in the state it was in before the offending call.

/// Deck exhaustion. The only way a deck operation can fail.
#[derive(Debug, derive_more::Display, Clone, Copy, PartialEq, Eq)]
pub enum DeckError {
    DeckEmpty,
}

impl std::error::Error for DeckError {}

/// Violations of the pot bookkeeping invariants. These indicate a logic bug
/// in the caller rather than a bad user action; distribution stops at the
/// first one.
#[derive(Debug, derive_more::Display, Clone, Copy, PartialEq, Eq)]
pub enum PotError {
    EligibilityLengthMismatch,
    EligibilityIndexOutOfRange,
    NoEligibleWinner,
    EvaluationMissing,
}

impl std::error::Error for PotError {}

/// Per-hand rule violations and invariant failures.
#[derive(Debug, derive_more::Display, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    NotYourTurn,
    CannotDecreaseBet,
    CannotCheck,
    NothingToCall,
    CannotFoldAllIn,
    InsufficientBalance,
    NotEnoughPlayers,
    InvalidShowdownCardCount,
    DeckError(DeckError),
    PotError(PotError),
}

impl std::error::Error for GameError {}

impl From<DeckError> for GameError {
    fn from(e: DeckError) -> Self {
        Self::DeckError(e)
    }
}

impl From<PotError> for GameError {
    fn from(e: PotError) -> Self {
        Self::PotError(e)
    }
}

/// Table-level validation and state errors; wraps [`GameError`] for anything
/// that happens inside a hand.
#[derive(Debug, derive_more::Display, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    TableFull,
    AlreadyAtTable,
    UserNotFound,
    NotInPlayersReady,
    GameNotStarted,
    GameError(GameError),
}

impl std::error::Error for TableError {}

impl From<GameError> for TableError {
    fn from(e: GameError) -> Self {
        Self::GameError(e)
    }
}

impl From<DeckError> for TableError {
    fn from(e: DeckError) -> Self {
        Self::GameError(e.into())
    }
}

impl From<PotError> for TableError {
    fn from(e: PotError) -> Self {
        Self::GameError(e.into())
    }
}
