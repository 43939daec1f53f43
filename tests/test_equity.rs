use std::time::Duration;

use approx::assert_abs_diff_eq;

use holdem_odds::cancel::CancelToken;
use holdem_odds::cards::*;
use holdem_odds::enumerate::{Mode, Strategy};
use holdem_odds::equity::*;
use holdem_odds::error::{CardLocation, EquityError};

fn hands(codes: &[&str]) -> Vec<Vec<Card>> {
    codes.iter().map(|h| parse_cards(h).unwrap()).collect()
}

fn board(codes: &str) -> Vec<Card> {
    parse_cards(codes).unwrap()
}

#[test]
fn test_aa_vs_kk_preflop_exact() {
    let result = compute_equities(&hands(&["AsAh", "KsKh"]), &[], &EquityConfig::exact()).unwrap();
    assert_eq!(result.trials, 1_712_304);
    assert_eq!(
        result.strategy,
        Strategy::Exact {
            combinations: 1_712_304
        }
    );
    assert_abs_diff_eq!(result.players[0].win, 82.3648, epsilon = 1e-3);
    assert_abs_diff_eq!(result.players[1].win, 17.0916, epsilon = 1e-3);
    assert_abs_diff_eq!(result.players[0].tie, 0.5436, epsilon = 1e-3);
    assert_abs_diff_eq!(result.players[0].equity, 82.6366, epsilon = 1e-3);
    assert_abs_diff_eq!(result.total_equity(), 100.0, epsilon = 1e-9);
}

#[test]
fn test_aa_vs_kk_preflop_monte_carlo() {
    let config = EquityConfig::monte_carlo(50_000, Some(1));
    let result = compute_equities(&hands(&["AsAh", "KsKh"]), &[], &config).unwrap();
    assert_eq!(result.trials, 50_000);
    assert!(result.players[0].equity > 81.5 && result.players[0].equity < 83.8);
    assert!(result.players[1].equity > 16.2 && result.players[1].equity < 18.5);
    assert!(result.players[0].tie < 1.5);
}

#[test]
fn test_auto_uses_monte_carlo_preflop() {
    let config = EquityConfig {
        trials: 5_000,
        seed: Some(3),
        ..Default::default()
    };
    let result = compute_equities(&hands(&["AsKs", "QhQd"]), &[], &config).unwrap();
    assert_eq!(result.strategy, Strategy::MonteCarlo { trials: 5_000 });
    assert!(result.players[0].equity > 40.0 && result.players[0].equity < 60.0);
}

#[test]
fn test_flop_exact_heads_up() {
    let result = compute_equities(
        &hands(&["AsAh", "KsKh"]),
        &board("2c7d9h"),
        &EquityConfig::default(),
    )
    .unwrap();
    assert_eq!(result.trials, 990);
    assert_eq!(result.strategy, Strategy::Exact { combinations: 990 });
    assert_eq!(result.players[0].tally.wins, 907);
    assert_eq!(result.players[1].tally.wins, 83);
    assert_abs_diff_eq!(result.players[0].win, 907.0 / 990.0 * 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(result.players[0].tie, 0.0);
}

#[test]
fn test_flop_exact_three_way_credit_sums_to_trials() {
    let result = compute_equities(
        &hands(&["AsAh", "KsKh", "QcJc"]),
        &board("2c7c9h"),
        &EquityConfig::default(),
    )
    .unwrap();
    // 52 - 6 - 3 = 43 cards left, C(43, 2) turn/river pairs
    assert_eq!(result.trials, 903);
    let credit: f64 = result.players.iter().map(|p| p.tally.win_credit()).sum();
    assert_abs_diff_eq!(credit, 903.0, epsilon = 1e-9);
    assert_abs_diff_eq!(result.players[0].equity, 57.3643, epsilon = 1e-3);
    assert_abs_diff_eq!(result.players[1].equity, 4.4297, epsilon = 1e-3);
    assert_abs_diff_eq!(result.players[2].equity, 38.2060, epsilon = 1e-3);
}

#[test]
fn test_turn_exact() {
    let result = compute_equities(
        &hands(&["AsAh", "KsKh"]),
        &board("2c7d9h3s"),
        &EquityConfig::default(),
    )
    .unwrap();
    assert_eq!(result.trials, 44);
    assert_abs_diff_eq!(result.total_equity(), 100.0, epsilon = 1e-9);
}

#[test]
fn test_board_plays_on_river() {
    let result = compute_equities(
        &hands(&["2h3d", "4h5d"]),
        &board("AsKdQhJsTs"),
        &EquityConfig::default(),
    )
    .unwrap();
    assert_eq!(result.trials, 1);
    assert_eq!(result.strategy, Strategy::Showdown);
    for player in &result.players {
        assert_abs_diff_eq!(player.win, 0.0);
        assert_abs_diff_eq!(player.tie, 100.0);
        assert_abs_diff_eq!(player.equity, 50.0);
        assert_eq!(player.tally.tie_groups[2], 1);
    }
}

#[test]
fn test_river_ignores_monte_carlo_mode() {
    let config = EquityConfig::monte_carlo(10_000, None);
    let result = compute_equities(
        &hands(&["AsAh", "KsKh"]),
        &board("2c7d9h3sKd"),
        &config,
    )
    .unwrap();
    assert_eq!(result.trials, 1);
    assert_abs_diff_eq!(result.players[1].win, 100.0);
}

#[test]
fn test_three_way_split_shares_pot() {
    // broadway on board, nobody can improve
    let result = compute_equities(
        &hands(&["2h3d", "4h5d", "6c7c"]),
        &board("AsKdQhJsTc"),
        &EquityConfig::default(),
    )
    .unwrap();
    for player in &result.players {
        assert_abs_diff_eq!(player.tie, 100.0);
        assert_abs_diff_eq!(player.equity, 100.0 / 3.0, epsilon = 1e-9);
        assert_eq!(player.tally.tie_groups[3], 1);
    }
    assert_abs_diff_eq!(result.total_equity(), 100.0, epsilon = 1e-9);
}

#[test]
fn test_exact_is_reproducible() {
    let players = hands(&["AsKs", "QhQd", "7c7d"]);
    let flop = board("Ts9s2h");
    let a = compute_equities(&players, &flop, &EquityConfig::default()).unwrap();
    let b = compute_equities(&players, &flop, &EquityConfig::default()).unwrap();
    for (x, y) in a.players.iter().zip(&b.players) {
        assert_eq!(x.tally, y.tally);
        assert_eq!(x.equity.to_bits(), y.equity.to_bits());
    }
}

#[test]
fn test_seeded_monte_carlo_is_reproducible() {
    let players = hands(&["AsKs", "QhQd", "7c7d"]);
    let config = EquityConfig::monte_carlo(20_000, Some(99));
    let a = compute_equities(&players, &[], &config).unwrap();
    let b = compute_equities(&players, &[], &config).unwrap();
    for (x, y) in a.players.iter().zip(&b.players) {
        assert_eq!(x.tally, y.tally);
    }
}

#[test]
fn test_unseeded_monte_carlo_varies() {
    let players = hands(&["AsKs", "QhQd"]);
    let config = EquityConfig::monte_carlo(20_000, None);
    let a = compute_equities(&players, &[], &config).unwrap();
    let b = compute_equities(&players, &[], &config).unwrap();
    assert_ne!(a.players[0].tally, b.players[0].tally);
}

#[test]
fn test_seeds_converge_to_exact() {
    let players = hands(&["AsAh", "KsKh"]);
    let flop = board("2c7d9h");
    let exact = compute_equities(&players, &flop, &EquityConfig::exact()).unwrap();
    for seed in [1, 2] {
        let sampled =
            compute_equities(&players, &flop, &EquityConfig::monte_carlo(40_000, Some(seed)))
                .unwrap();
        assert_abs_diff_eq!(
            sampled.players[0].equity,
            exact.players[0].equity,
            epsilon = 1.0
        );
    }
}

#[test]
fn test_multiway_equity_sums_to_hundred() {
    let players = hands(&["AsKs", "QhQd", "JcTc", "7h7s", "5d4d", "Ah2c"]);
    let result =
        compute_equities(&players, &[], &EquityConfig::monte_carlo(20_000, Some(5))).unwrap();
    assert_abs_diff_eq!(result.total_equity(), 100.0, epsilon = 1e-9);
    let wins: f64 = result.players.iter().map(|p| p.win).sum();
    assert!(wins <= 100.0 + 1e-9);
}

#[test]
fn test_from_codes() {
    let result = compute_equities_from_codes(
        &["asah", "KSKH"],
        "2c 7d 9h",
        &EquityConfig::default(),
    )
    .unwrap();
    assert_eq!(result.trials, 990);
}

#[test]
fn test_duplicate_between_players() {
    match compute_equities(&hands(&["AsAh", "AsKh"]), &[], &EquityConfig::default()) {
        Err(EquityError::DuplicateCard {
            card,
            first,
            second,
        }) => {
            assert_eq!(card.to_string(), "As");
            assert_eq!(first, CardLocation::Player(0));
            assert_eq!(second, CardLocation::Player(1));
        }
        other => panic!("expected DuplicateCard, got {:?}", other),
    }
}

#[test]
fn test_duplicate_between_player_and_board() {
    let err = compute_equities(
        &hands(&["AsAh", "KsKh"]),
        &board("Kh7d9h"),
        &EquityConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        EquityError::DuplicateCard {
            first: CardLocation::Player(1),
            second: CardLocation::Board,
            ..
        }
    ));
    assert!(err.to_string().contains("Kh"));
}

#[test]
fn test_duplicate_within_board() {
    assert!(matches!(
        compute_equities(&hands(&["AsAh", "KsKh"]), &board("2c2c9h"), &EquityConfig::default()),
        Err(EquityError::DuplicateCard {
            first: CardLocation::Board,
            second: CardLocation::Board,
            ..
        })
    ));
}

#[test]
fn test_invalid_board_size() {
    for b in ["2c", "2c7d", "2c7d9h3sKdQd"] {
        assert!(matches!(
            compute_equities(&hands(&["AsAh", "KsKh"]), &board(b), &EquityConfig::default()),
            Err(EquityError::InvalidBoardSize(_))
        ));
    }
}

#[test]
fn test_insufficient_players() {
    assert!(matches!(
        compute_equities(&hands(&["AsAh"]), &[], &EquityConfig::default()),
        Err(EquityError::InsufficientPlayers(1))
    ));
    assert!(matches!(
        compute_equities(&[], &[], &EquityConfig::default()),
        Err(EquityError::InsufficientPlayers(0))
    ));
}

#[test]
fn test_invalid_hand_size() {
    assert!(matches!(
        compute_equities(&hands(&["AsAh", "KsKhKd"]), &[], &EquityConfig::default()),
        Err(EquityError::InvalidHandSize { got: 3, .. })
    ));
}

#[test]
fn test_too_many_players() {
    let players: Vec<Vec<Card>> = DECK[..48].chunks(2).map(|p| p.to_vec()).collect();
    assert_eq!(players.len(), 24);
    assert!(matches!(
        compute_equities(&players, &[], &EquityConfig::default()),
        Err(EquityError::NotEnoughDeck { .. })
    ));
}

#[test]
fn test_zero_trials_rejected() {
    assert!(matches!(
        compute_equities(
            &hands(&["AsAh", "KsKh"]),
            &[],
            &EquityConfig::monte_carlo(0, Some(1))
        ),
        Err(EquityError::InvalidConfig(_))
    ));
}

#[test]
fn test_cancelled_run_fails() {
    let token = CancelToken::new();
    token.cancel();
    let config = EquityConfig {
        mode: Mode::Exact,
        cancel: Some(token),
        ..Default::default()
    };
    assert!(matches!(
        compute_equities(&hands(&["AsAh", "KsKh"]), &board("2c7d9h"), &config),
        Err(EquityError::Cancelled { .. })
    ));
}

#[test]
fn test_cancelled_run_returns_partial_when_asked() {
    let token = CancelToken::new();
    token.cancel();
    let config = EquityConfig {
        trials: 50_000,
        seed: Some(1),
        cancel: Some(token),
        allow_partial: true,
        ..Default::default()
    };
    let result = compute_equities(&hands(&["AsAh", "KsKh"]), &[], &config).unwrap();
    assert!(!result.complete);
    assert!(result.trials < 50_000);
}

#[test]
fn test_cancelled_exact_run_never_returns_partial() {
    let token = CancelToken::new();
    token.cancel();
    let config = EquityConfig {
        mode: Mode::Exact,
        cancel: Some(token),
        allow_partial: true,
        ..Default::default()
    };
    assert!(matches!(
        compute_equities(&hands(&["AsAh", "KsKh"]), &[], &config),
        Err(EquityError::Cancelled { .. })
    ));
}

#[test]
fn test_exact_run_cancelled_midway() {
    let token = CancelToken::new();
    let config = EquityConfig {
        mode: Mode::Exact,
        cancel: Some(token.clone()),
        allow_partial: true,
        ..Default::default()
    };
    let watcher = token.cancel_after(Duration::from_millis(5));
    let result = compute_equities(&hands(&["AsAh", "KsKh", "QcJc", "7d6d"]), &[], &config);
    watcher.join().unwrap();
    // C(44,5) boards for four players preflop
    match result {
        Err(EquityError::Cancelled { trials_completed }) => {
            assert!(trials_completed < 1_086_008)
        }
        other => panic!("expected Cancelled, got {:?}", other),
    }
}

#[test]
fn test_monte_carlo_cancelled_midway_keeps_partial_tallies() {
    let token = CancelToken::new();
    let config = EquityConfig {
        mode: Mode::MonteCarlo,
        trials: 200_000_000,
        seed: Some(5),
        cancel: Some(token.clone()),
        allow_partial: true,
        ..Default::default()
    };
    let watcher = token.cancel_after(Duration::from_millis(20));
    let result = compute_equities(&hands(&["AsAh", "KsKh"]), &[], &config).unwrap();
    watcher.join().unwrap();
    assert!(!result.complete);
    assert!(result.trials < 200_000_000);
    let awarded: f64 = result.players.iter().map(|p| p.tally.win_credit()).sum();
    assert_abs_diff_eq!(awarded, result.trials as f64, epsilon = 1e-6);
}

#[test]
fn test_result_string() {
    let result = compute_equities(
        &hands(&["AsAh", "KsKh"]),
        &board("2c7d9h"),
        &EquityConfig::default(),
    )
    .unwrap();
    let s = format!("{}", result.players[0]);
    assert!(s.contains("Win 91.62%"));
    assert!(s.contains("equity"));
}

#[test]
fn test_result_json() {
    let result = compute_equities(
        &hands(&["AsAh", "KsKh"]),
        &board("2c7d9h"),
        &EquityConfig::default(),
    )
    .unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["trials"], 990);
    assert_eq!(json["strategy"]["kind"], "exact");
    assert_eq!(json["players"].as_array().unwrap().len(), 2);
    assert_eq!(json["complete"], true);
}

#[test]
fn test_config_from_json() {
    let config: EquityConfig =
        serde_json::from_str(r#"{ "mode": "montecarlo", "trials": 500, "seed": 4 }"#).unwrap();
    assert_eq!(config.mode, Mode::MonteCarlo);
    assert_eq!(config.trials, 500);
    assert_eq!(config.seed, Some(4));
    let defaults: EquityConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(defaults.trials, DEFAULT_TRIALS);
    assert_eq!(defaults.mode, Mode::Auto);
}
