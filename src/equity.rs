use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::cards::{parse_cards, Card, DECK};
use crate::deck::remaining;
use crate::enumerate::{Enumerator, Mode, PlayerTally, Strategy, Tally};
use crate::error::{CardLocation, EquityError, EquityResult};
use crate::lookup;

pub const DEFAULT_TRIALS: u64 = 100_000;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EquityConfig {
    pub mode: Mode,
    /// Monte Carlo sample size; ignored by exact enumeration.
    pub trials: u64,
    /// Fixes the Monte Carlo streams. `None` draws a fresh seed per call.
    pub seed: Option<u64>,
    #[serde(skip)]
    pub cancel: Option<CancelToken>,
    /// Return the tallies gathered so far instead of `Cancelled`. Monte Carlo
    /// only: a cancelled exact run always fails.
    pub allow_partial: bool,
}

impl Default for EquityConfig {
    fn default() -> Self {
        EquityConfig {
            mode: Mode::Auto,
            trials: DEFAULT_TRIALS,
            seed: None,
            cancel: None,
            allow_partial: false,
        }
    }
}

impl EquityConfig {
    pub fn exact() -> Self {
        EquityConfig {
            mode: Mode::Exact,
            ..Default::default()
        }
    }

    pub fn monte_carlo(trials: u64, seed: Option<u64>) -> Self {
        EquityConfig {
            mode: Mode::MonteCarlo,
            trials,
            seed,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerEquity {
    /// Percent of trials won outright.
    pub win: f64,
    /// Percent of trials ending in a split pot this player shares.
    pub tie: f64,
    /// Percent of the pot: outright wins plus fractional split credit.
    pub equity: f64,
    pub tally: PlayerTally,
}

impl fmt::Display for PlayerEquity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Win {:.2}% | Tie {:.2}% (equity: {:.2}%)",
            self.win, self.tie, self.equity,
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Equities {
    /// Same order as the input players.
    pub players: Vec<PlayerEquity>,
    pub trials: u64,
    pub strategy: Strategy,
    /// `false` only for a cancelled run that returned partial tallies.
    pub complete: bool,
}

impl Equities {
    pub fn total_equity(&self) -> f64 {
        self.players.iter().map(|p| p.equity).sum()
    }
}

/// Turns raw tallies into percentages. No rounding happens here.
pub fn finalize(tally: Tally, strategy: Strategy, complete: bool) -> Equities {
    let trials = tally.trials;
    let pct = |n: f64| {
        if trials == 0 {
            0.0
        } else {
            n / trials as f64 * 100.0
        }
    };
    let players = tally
        .players
        .into_iter()
        .map(|p| PlayerEquity {
            win: pct(p.wins as f64),
            tie: pct(p.ties as f64),
            equity: pct(p.win_credit()),
            tally: p,
        })
        .collect();
    Equities {
        players,
        trials,
        strategy,
        complete,
    }
}

/// Checks every precondition up front so no trial work is spent on bad input.
fn validate(players: &[Vec<Card>], board: &[Card]) -> EquityResult<Vec<[Card; 2]>> {
    if players.len() < 2 {
        return Err(EquityError::InsufficientPlayers(players.len()));
    }
    let mut hands = Vec::with_capacity(players.len());
    for (i, hole) in players.iter().enumerate() {
        match hole.as_slice() {
            &[a, b] => hands.push([a, b]),
            _ => {
                return Err(EquityError::InvalidHandSize {
                    what: CardLocation::Player(i).to_string(),
                    got: hole.len(),
                    expected: "2",
                })
            }
        }
    }
    if !matches!(board.len(), 0 | 3 | 4 | 5) {
        return Err(EquityError::InvalidBoardSize(board.len()));
    }

    let mut owners: [Option<CardLocation>; 52] = [None; 52];
    let seats = hands
        .iter()
        .enumerate()
        .flat_map(|(i, hole)| hole.iter().map(move |&c| (c, CardLocation::Player(i))));
    let shared = board.iter().map(|&c| (c, CardLocation::Board));
    for (card, location) in seats.chain(shared) {
        let owner = &mut owners[card.index() as usize];
        if let Some(first) = *owner {
            return Err(EquityError::DuplicateCard {
                card,
                first,
                second: location,
            });
        }
        *owner = Some(location);
    }

    let dealt = hands.len() * 2 + board.len();
    let missing = 5 - board.len();
    if dealt + missing > DECK.len() {
        return Err(EquityError::NotEnoughDeck {
            requested: missing,
            available: DECK.len() - dealt,
        });
    }
    Ok(hands)
}

/// Win, tie and equity percentages for each player's hole cards against the
/// others, over every (or a sample of) board completion.
pub fn compute_equities(
    players: &[Vec<Card>],
    board: &[Card],
    config: &EquityConfig,
) -> EquityResult<Equities> {
    let hands = validate(players, board)?;
    let committed: Vec<Card> = hands.iter().flatten().chain(board).copied().collect();
    let deck = remaining(&committed)?;

    let missing = 5 - board.len();
    let strategy = Strategy::select(config.mode, missing, deck.len(), config.trials);
    if let Strategy::MonteCarlo { trials: 0 } = strategy {
        return Err(EquityError::InvalidConfig(
            "Monte Carlo needs at least one trial".to_string(),
        ));
    }
    let seed = config.seed.unwrap_or_else(rand::random);
    let cancel = config.cancel.clone().unwrap_or_default();

    log::debug!(
        "{} players, board {} cards, {} remaining, {} ({} trials)",
        hands.len(),
        board.len(),
        deck.len(),
        strategy.name(),
        strategy.planned_trials(),
    );
    lookup::warm_up();
    let started = Instant::now();
    let run = Enumerator::new(&hands, board, &deck).run(strategy, seed, &cancel);
    log::debug!(
        "{} trials in {:.1?} (seed {})",
        run.tally.trials,
        started.elapsed(),
        seed
    );
    debug_assert_eq!(run.tally.pots_awarded(), run.tally.trials);

    if !run.complete {
        log::warn!(
            "cancelled after {} of {} trials",
            run.tally.trials,
            strategy.planned_trials()
        );
        // Exact batches run in deck order, so an unfinished enumeration is
        // a biased subset of boards. Only sampled runs may stop early.
        let sampled = matches!(strategy, Strategy::MonteCarlo { .. });
        if !(config.allow_partial && sampled) {
            return Err(EquityError::Cancelled {
                trials_completed: run.tally.trials,
            });
        }
    }
    Ok(finalize(run.tally, strategy, run.complete))
}

/// [`compute_equities`] over card codes: one 4-character pair per player
/// (`"AsAh"`) and a concatenated board (`""`, `"2c7d9h"`, ...).
pub fn compute_equities_from_codes(
    players: &[&str],
    board: &str,
    config: &EquityConfig,
) -> EquityResult<Equities> {
    let hands = players
        .iter()
        .map(|p| parse_cards(p))
        .collect::<EquityResult<Vec<_>>>()?;
    let board = parse_cards(board)?;
    compute_equities(&hands, &board, config)
}
