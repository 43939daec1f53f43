use std::fmt;

use thiserror::Error;

use crate::cards::Card;

/// Where a card was supplied, for duplicate reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardLocation {
    /// Hole cards of the player at this (0-based) seat.
    Player(usize),
    Board,
    /// A bare card list handed to the evaluator or deck tracker.
    Hand,
}

impl fmt::Display for CardLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardLocation::Player(i) => write!(f, "player {}", i + 1),
            CardLocation::Board => write!(f, "board"),
            CardLocation::Hand => write!(f, "hand"),
        }
    }
}

#[derive(Error, Debug)]
pub enum EquityError {
    #[error("Invalid card code: {0:?}")]
    InvalidCardCode(String),

    #[error("Duplicate card {card}: used by {first} and {second}")]
    DuplicateCard {
        card: Card,
        first: CardLocation,
        second: CardLocation,
    },

    #[error("Board must have 0, 3, 4, or 5 cards, got {0}")]
    InvalidBoardSize(usize),

    #[error("Invalid hand size: {what} has {got} cards, expected {expected}")]
    InvalidHandSize {
        what: String,
        got: usize,
        expected: &'static str,
    },

    #[error("Need at least 2 players, got {0}")]
    InsufficientPlayers(usize),

    #[error("Cannot deal {requested} cards, only {available} remaining")]
    NotEnoughDeck { requested: usize, available: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Calculation cancelled after {trials_completed} trials")]
    Cancelled { trials_completed: u64 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EquityResult<T> = Result<T, EquityError>;
