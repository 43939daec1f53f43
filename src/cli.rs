use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::LevelFilter;

use crate::batch::{load_scenarios, run_batch};
use crate::cancel::CancelToken;
use crate::cards::{format_cards, parse_cards, Card};
use crate::display::{
    board_display, equity_bar, equity_table, print_error, print_section, print_warning, rank_table,
};
use crate::enumerate::Mode;
use crate::equity::{compute_equities, EquityConfig, DEFAULT_TRIALS};
use crate::error::EquityResult;
use crate::hand_evaluator::evaluate;

#[derive(Parser)]
#[command(name = "odds", version = "1.0.0", about = "Hold'em equity calculator: win, tie and pot share for any number of hands.")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum ModeArg {
    Auto,
    Exact,
    #[value(name = "montecarlo", alias = "mc")]
    MonteCarlo,
}

impl ModeArg {
    fn as_mode(&self) -> Mode {
        match self {
            ModeArg::Auto => Mode::Auto,
            ModeArg::Exact => Mode::Exact,
            ModeArg::MonteCarlo => Mode::MonteCarlo,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate equities for two or more hands
    Equity {
        /// Hole cards per player (e.g., AsAh KsKh)
        #[arg(required = true, num_args = 2..)]
        hands: Vec<String>,
        /// Board cards: none, flop, turn or river (e.g., Ts9s2h)
        #[arg(short, long)]
        board: Option<String>,
        /// Enumeration mode
        #[arg(short, long, default_value = "auto")]
        mode: ModeArg,
        /// Monte Carlo trials
        #[arg(short = 'n', long, default_value_t = DEFAULT_TRIALS)]
        trials: u64,
        /// RNG seed for reproducible Monte Carlo runs
        #[arg(long)]
        seed: Option<u64>,
        /// Stop after this many milliseconds (Monte Carlo reports partial results)
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Rank a 5 to 7 card hand
    Rank {
        /// Cards (e.g., AsKsQsJsTs or "As Ks Qs Js Ts 2h 3d")
        cards: String,
    },
    /// Solve every scenario in a JSON file
    Batch {
        /// Path to a JSON array of scenarios
        file: PathBuf,
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    dispatch(cli)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // RUST_LOG, when set, overrides the -v level.
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

fn dispatch(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);
    let outcome = match cli.command {
        Commands::Equity {
            hands,
            board,
            mode,
            trials,
            seed,
            timeout_ms,
            json,
        } => cmd_equity(hands, board, mode.as_mode(), trials, seed, timeout_ms, json),
        Commands::Rank { cards } => cmd_rank(&cards),
        Commands::Batch { file, json } => cmd_batch(file, json),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn cmd_equity(
    hands: Vec<String>,
    board: Option<String>,
    mode: Mode,
    trials: u64,
    seed: Option<u64>,
    timeout_ms: Option<u64>,
    json: bool,
) -> EquityResult<()> {
    let players: Vec<Vec<Card>> = hands
        .iter()
        .map(|h| parse_cards(h))
        .collect::<EquityResult<_>>()?;
    let board_cards = match &board {
        Some(b) => parse_cards(b)?,
        None => Vec::new(),
    };

    let mut config = EquityConfig {
        mode,
        trials,
        seed,
        ..Default::default()
    };
    let mut watcher = None;
    if let Some(ms) = timeout_ms {
        let token = CancelToken::new();
        watcher = Some(token.cancel_after(Duration::from_millis(ms)));
        config.cancel = Some(token);
        // honoured for Monte Carlo only; a timed-out exact run fails
        config.allow_partial = true;
    }

    log::info!(
        "{} on [{}]",
        players
            .iter()
            .map(|p| format_cards(p))
            .collect::<Vec<_>>()
            .join(" vs "),
        format_cards(&board_cards)
    );
    let result = compute_equities(&players, &board_cards, &config);
    if let (Some(token), Some(watcher)) = (&config.cancel, watcher) {
        token.cancel();
        let _ = watcher.join();
    }
    let result = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} on {}",
        hands.join(" vs ").bold(),
        board_display(&board_cards)
    );
    println!(
        "  {} {} trials\n",
        result.strategy.name().bold(),
        format!("{}", result.trials).bold()
    );
    for (i, player) in result.players.iter().enumerate() {
        println!("  Player {}: {}", i + 1, equity_bar(player.equity / 100.0, 30));
    }
    println!();
    println!("{}", equity_table(&players, &result));
    if !result.complete {
        print_warning(&format!(
            "timed out, partial results over {} trials",
            result.trials
        ));
    }
    println!();
    Ok(())
}

fn cmd_rank(cards: &str) -> EquityResult<()> {
    let cards = parse_cards(cards)?;
    let rank = evaluate(&cards)?;
    println!();
    println!("{}", rank_table(&cards, rank));
    println!();
    Ok(())
}

fn cmd_batch(file: PathBuf, json: bool) -> EquityResult<()> {
    let scenarios = load_scenarios(&file)?;
    let outcomes = run_batch(&scenarios, None);

    if json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
        return Ok(());
    }

    for (scenario, outcome) in scenarios.iter().zip(&outcomes) {
        match (&outcome.result, &outcome.error) {
            (Some(result), _) => {
                let lines: Vec<String> = scenario
                    .players
                    .iter()
                    .zip(&result.players)
                    .map(|(hand, player)| format!("{:<6} {}", hand, player))
                    .collect();
                print_section(&outcome.name, &lines.join("\n  "));
            }
            (None, Some(error)) => print_section(&outcome.name, &error.red().to_string()),
            (None, None) => {}
        }
    }
    println!();
    Ok(())
}
