//! Batch scenarios: a JSON list of spots, each solved independently.
//!
//! ```json
//! [
//!   { "name": "aces vs kings", "players": ["AsAh", "KsKh"] },
//!   { "players": ["AsKs", "QhQd", "7c7d"], "board": "Ts9s2h", "mode": "exact" }
//! ]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::enumerate::Mode;
use crate::equity::{compute_equities_from_codes, Equities, EquityConfig, DEFAULT_TRIALS};
use crate::error::EquityResult;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    pub players: Vec<String>,
    #[serde(default)]
    pub board: String,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub trials: Option<u64>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Scenario {
    pub fn label(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("#{} {}", index + 1, self.players.join(" vs ")))
    }

    pub fn config(&self, default_trials: u64, cancel: Option<CancelToken>) -> EquityConfig {
        EquityConfig {
            mode: self.mode,
            trials: self.trials.unwrap_or(default_trials),
            seed: self.seed,
            cancel,
            allow_partial: false,
        }
    }

    pub fn solve(&self, default_trials: u64, cancel: Option<CancelToken>) -> EquityResult<Equities> {
        let players: Vec<&str> = self.players.iter().map(|p| p.as_str()).collect();
        compute_equities_from_codes(&players, &self.board, &self.config(default_trials, cancel))
    }
}

#[derive(Debug, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Equities>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn parse_scenarios(json: &str) -> EquityResult<Vec<Scenario>> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_scenarios(path: &Path) -> EquityResult<Vec<Scenario>> {
    let raw = fs::read_to_string(path)?;
    let scenarios = parse_scenarios(&raw)?;
    log::info!("loaded {} scenarios from {}", scenarios.len(), path.display());
    Ok(scenarios)
}

/// Solves scenarios in order. A bad scenario records its error and the
/// rest still run.
pub fn run_batch(scenarios: &[Scenario], cancel: Option<CancelToken>) -> Vec<ScenarioOutcome> {
    scenarios
        .iter()
        .enumerate()
        .map(|(i, scenario)| {
            let name = scenario.label(i);
            match scenario.solve(DEFAULT_TRIALS, cancel.clone()) {
                Ok(result) => ScenarioOutcome {
                    name,
                    result: Some(result),
                    error: None,
                },
                Err(e) => {
                    log::warn!("scenario {} failed: {}", name, e);
                    ScenarioOutcome {
                        name,
                        result: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect()
}
