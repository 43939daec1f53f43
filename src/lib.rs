pub mod batch;
pub mod cancel;
pub mod cards;
pub mod cli;
pub mod deck;
pub mod display;
pub mod enumerate;
pub mod equity;
pub mod error;
pub mod hand_evaluator;
pub mod lookup;

pub use cancel::CancelToken;
pub use cards::{parse_card, parse_cards, Card, Rank, Suit};
pub use enumerate::{Mode, Strategy};
pub use equity::{compute_equities, compute_equities_from_codes, Equities, EquityConfig, PlayerEquity};
pub use error::{EquityError, EquityResult};
pub use hand_evaluator::{evaluate, HandCategory, HandRank};
