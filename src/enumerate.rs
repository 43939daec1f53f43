//! Board completion: exhaustive enumeration or seeded sampling, scored by a
//! shared showdown routine and tallied per worker.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::cards::Card;
use crate::hand_evaluator::HandRank;
use crate::lookup::rank_cards;

/// Most players a single deck can serve with a full board (2 * 23 + 5 = 51).
pub const MAX_PLAYERS: usize = 23;

/// Monte Carlo trials per work unit. Each unit owns one RNG stream.
pub const CHUNK_TRIALS: u64 = 4096;

/// Completions scored between cancellation checks in exact mode.
const CANCEL_CHECK_INTERVAL: u64 = 4096;

/// `Auto` enumerates exactly up to this many missing board cards.
pub const EXACT_MAX_MISSING: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Auto,
    Exact,
    #[serde(alias = "monte_carlo")]
    MonteCarlo,
}

/// How a calculation completes the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Strategy {
    /// Board already complete: a single showdown.
    Showdown,
    Exact { combinations: u64 },
    MonteCarlo { trials: u64 },
}

impl Strategy {
    pub fn select(mode: Mode, missing: usize, remaining: usize, trials: u64) -> Strategy {
        if missing == 0 {
            return Strategy::Showdown;
        }
        match mode {
            Mode::Exact => Strategy::Exact {
                combinations: n_choose_k(remaining as u64, missing as u64),
            },
            Mode::Auto if missing <= EXACT_MAX_MISSING => Strategy::Exact {
                combinations: n_choose_k(remaining as u64, missing as u64),
            },
            Mode::Auto | Mode::MonteCarlo => Strategy::MonteCarlo { trials },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Showdown => "showdown",
            Strategy::Exact { .. } => "exact",
            Strategy::MonteCarlo { .. } => "monte carlo",
        }
    }

    /// Trials a full run performs.
    pub fn planned_trials(&self) -> u64 {
        match *self {
            Strategy::Showdown => 1,
            Strategy::Exact { combinations } => combinations,
            Strategy::MonteCarlo { trials } => trials,
        }
    }
}

pub fn n_choose_k(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1u64, |acc, i| acc * (n - i) / (i + 1))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlayerTally {
    /// Trials won outright.
    pub wins: u64,
    /// Trials that ended in a split pot including this player.
    pub ties: u64,
    /// `tie_groups[k]`: split pots shared by exactly `k` players.
    pub tie_groups: Vec<u64>,
}

impl PlayerTally {
    fn new(players: usize) -> Self {
        PlayerTally {
            wins: 0,
            ties: 0,
            tie_groups: vec![0; players + 1],
        }
    }

    /// Pots won, counting a k-way split as 1/k.
    pub fn win_credit(&self) -> f64 {
        let shared: f64 = self
            .tie_groups
            .iter()
            .enumerate()
            .skip(2)
            .map(|(k, &n)| n as f64 / k as f64)
            .sum();
        self.wins as f64 + shared
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub trials: u64,
    pub players: Vec<PlayerTally>,
}

impl Tally {
    pub fn new(players: usize) -> Self {
        Tally {
            trials: 0,
            players: (0..players).map(|_| PlayerTally::new(players)).collect(),
        }
    }

    /// Scores one completed board: the best rank wins; `k` players sharing
    /// it each take a 1/k split.
    pub fn record_showdown(&mut self, ranks: &[HandRank]) {
        let best = ranks.iter().copied().max().unwrap_or_default();
        let winners = ranks.iter().filter(|&&r| r == best).count();
        for (player, &rank) in ranks.iter().enumerate() {
            if rank != best {
                continue;
            }
            let tally = &mut self.players[player];
            if winners == 1 {
                tally.wins += 1;
            } else {
                tally.ties += 1;
                tally.tie_groups[winners] += 1;
            }
        }
        self.trials += 1;
    }

    pub fn merge(mut self, other: Tally) -> Tally {
        self.trials += other.trials;
        for (mine, theirs) in self.players.iter_mut().zip(other.players) {
            mine.wins += theirs.wins;
            mine.ties += theirs.ties;
            for (a, b) in mine.tie_groups.iter_mut().zip(theirs.tie_groups) {
                *a += b;
            }
        }
        self
    }

    /// Whole pots handed out, computed in integers: outright wins plus
    /// each k-way split counted once. Equals `trials` for a consistent tally.
    pub fn pots_awarded(&self) -> u64 {
        let wins: u64 = self.players.iter().map(|p| p.wins).sum();
        let splits: u64 = (2..=self.players.len())
            .map(|k| self.players.iter().map(|p| p.tie_groups[k]).sum::<u64>() / k as u64)
            .sum();
        wins + splits
    }
}

#[derive(Debug, Clone)]
pub struct Run {
    pub tally: Tally,
    pub complete: bool,
}

impl Run {
    fn empty(players: usize) -> Self {
        Run {
            tally: Tally::new(players),
            complete: true,
        }
    }

    fn merge(self, other: Run) -> Run {
        Run {
            tally: self.tally.merge(other.tally),
            complete: self.complete && other.complete,
        }
    }
}

/// Fixed inputs of one calculation: hole cards, the known board prefix and
/// the undealt cards.
pub struct Enumerator<'a> {
    hands: &'a [[Card; 2]],
    board: [Card; 5],
    known: usize,
    deck: &'a [Card],
}

impl<'a> Enumerator<'a> {
    /// `hands.len() <= MAX_PLAYERS`, `board.len() <= 5` and
    /// `deck.len() >= 5 - board.len()` are the caller's responsibility.
    pub fn new(hands: &'a [[Card; 2]], board: &[Card], deck: &'a [Card]) -> Self {
        // Unknown slots are overwritten before every showdown.
        let mut full = [deck[0]; 5];
        full[..board.len()].copy_from_slice(board);
        Enumerator {
            hands,
            board: full,
            known: board.len(),
            deck,
        }
    }

    fn missing(&self) -> usize {
        5 - self.known
    }

    fn score(&self, board: &[Card; 5], tally: &mut Tally) {
        let mut ranks = [HandRank::default(); MAX_PLAYERS];
        for (slot, hole) in ranks.iter_mut().zip(self.hands) {
            let cards = [
                hole[0], hole[1], board[0], board[1], board[2], board[3], board[4],
            ];
            *slot = rank_cards(&cards);
        }
        tally.record_showdown(&ranks[..self.hands.len()]);
    }

    pub fn run(&self, strategy: Strategy, seed: u64, cancel: &CancelToken) -> Run {
        match strategy {
            Strategy::Showdown => {
                let mut tally = Tally::new(self.hands.len());
                self.score(&self.board, &mut tally);
                Run {
                    tally,
                    complete: true,
                }
            }
            Strategy::Exact { .. } => self.exact(cancel),
            Strategy::MonteCarlo { trials } => self.monte_carlo(trials, seed, cancel),
        }
    }

    /// Every `missing`-card combination of the deck, split across workers by
    /// the combination's first card.
    fn exact(&self, cancel: &CancelToken) -> Run {
        let players = self.hands.len();
        let last_first = self.deck.len() - self.missing();
        (0..=last_first)
            .into_par_iter()
            .map(|first| self.exact_from(first, cancel))
            .reduce(|| Run::empty(players), Run::merge)
    }

    fn exact_from(&self, first: usize, cancel: &CancelToken) -> Run {
        let mut tally = Tally::new(self.hands.len());
        if cancel.is_cancelled() {
            return Run {
                tally,
                complete: false,
            };
        }

        let n = self.deck.len();
        let rest = self.missing() - 1;
        let mut board = self.board;
        board[self.known] = self.deck[first];

        // Odometer over the remaining slots, lexicographic after `first`.
        let mut idx = [0usize; 4];
        for (j, slot) in idx.iter_mut().enumerate().take(rest) {
            *slot = first + 1 + j;
        }
        loop {
            if tally.trials > 0
                && tally.trials % CANCEL_CHECK_INTERVAL == 0
                && cancel.is_cancelled()
            {
                return Run {
                    tally,
                    complete: false,
                };
            }
            for j in 0..rest {
                board[self.known + 1 + j] = self.deck[idx[j]];
            }
            self.score(&board, &mut tally);

            let mut j = rest;
            loop {
                if j == 0 {
                    return Run {
                        tally,
                        complete: true,
                    };
                }
                j -= 1;
                if idx[j] < n - rest + j {
                    break;
                }
            }
            idx[j] += 1;
            for l in j + 1..rest {
                idx[l] = idx[l - 1] + 1;
            }
        }
    }

    fn monte_carlo(&self, trials: u64, seed: u64, cancel: &CancelToken) -> Run {
        let players = self.hands.len();
        let chunks = trials.div_ceil(CHUNK_TRIALS);
        (0..chunks)
            .into_par_iter()
            .map(|chunk| {
                let len = CHUNK_TRIALS.min(trials - chunk * CHUNK_TRIALS);
                self.sample_chunk(chunk_seed(seed, chunk), len, cancel)
            })
            .reduce(|| Run::empty(players), Run::merge)
    }

    /// `len` uniform completions via partial Fisher-Yates over a private deck copy.
    fn sample_chunk(&self, seed: u64, len: u64, cancel: &CancelToken) -> Run {
        let mut tally = Tally::new(self.hands.len());
        if cancel.is_cancelled() {
            return Run {
                tally,
                complete: false,
            };
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut deck = self.deck.to_vec();
        let mut board = self.board;
        let n = deck.len();
        let missing = self.missing();
        for _ in 0..len {
            for j in 0..missing {
                let k = rng.gen_range(j..n);
                deck.swap(j, k);
                board[self.known + j] = deck[j];
            }
            self.score(&board, &mut tally);
        }
        Run {
            tally,
            complete: true,
        }
    }
}

/// Independent stream seed for one Monte Carlo chunk.
fn chunk_seed(seed: u64, chunk: u64) -> u64 {
    seed ^ chunk.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
