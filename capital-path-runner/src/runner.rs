//! Simulation runner — wires together loading, the simulator, and metrics.
//!
//! Three entry points:
//! - `run_simulation()`: rows and config already in memory. No I/O.
//! - `run_from_files()`: loads a TOML config and a CSV trade log, then runs. Used by the CLI.
//! - `BatchRunner::run()`: several configs against one log, optionally on rayon's pool.

use std::path::Path;

use capital_path_core::{
    simulate_with_trades, CapitalPathConfig, SimulationError, SimulationResult, TradeRow,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, SimulationConfigFile};
use crate::data_loader::{load_trade_log, LoadError};
use crate::metrics::SummaryMetrics;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("load error: {0}")]
    Load(#[from] LoadError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error("failed to fingerprint run inputs: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// BLAKE3 fingerprint of config + rows.
    pub run_id: String,
    #[serde(default)]
    pub label: Option<String>,
    pub config: CapitalPathConfig,
    pub simulation: SimulationResult,
    pub metrics: SummaryMetrics,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// One configuration to run in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RunJob {
    pub label: Option<String>,
    pub config: CapitalPathConfig,
}

/// Deterministic fingerprint of a run's inputs.
///
/// Identical config and rows (in identical order) always hash to the same id.
pub fn run_id(config: &CapitalPathConfig, rows: &[TradeRow]) -> Result<String, serde_json::Error> {
    let mut hasher = blake3::Hasher::new();
    hasher.update(serde_json::to_string(config)?.as_bytes());
    hasher.update(b"\n");
    hasher.update(serde_json::to_string(rows)?.as_bytes());
    Ok(hasher.finalize().to_hex().to_string())
}

/// Run one simulation on in-memory inputs.
pub fn run_simulation(
    rows: &[TradeRow],
    config: &CapitalPathConfig,
    label: Option<String>,
) -> Result<RunResult, RunError> {
    let (simulation, trades) = simulate_with_trades(rows, config)?;
    let metrics = SummaryMetrics::compute(&simulation, &trades);
    let run_id = run_id(config, rows)?;

    tracing::info!(
        run_id = %&run_id[..12],
        label = label.as_deref().unwrap_or("-"),
        policy = config.withdrawal.name(),
        trades = metrics.trade_count,
        final_equity = simulation.final_equity,
        total_withdrawn = simulation.total_withdrawn,
        "simulation complete"
    );

    Ok(RunResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        label,
        config: config.clone(),
        simulation,
        metrics,
    })
}

/// Load a config file and a trade log, then run.
pub fn run_from_files(trades_path: &Path, config_path: &Path) -> Result<RunResult, RunError> {
    let file = SimulationConfigFile::load(config_path)?;
    let config = file.to_capital_path_config()?;
    let rows = load_trade_log(trades_path, &config.log_type)?;
    run_simulation(&rows, &config, file.label)
}

/// Runs several configurations against the same trade log.
///
/// Output order always matches job order, in both modes.
pub struct BatchRunner {
    parallel: bool,
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchRunner {
    pub fn new() -> Self {
        Self { parallel: true }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every job. Fails on the first job that errors.
    pub fn run(&self, rows: &[TradeRow], jobs: &[RunJob]) -> Result<Vec<RunResult>, RunError> {
        if self.parallel {
            jobs.par_iter()
                .map(|job| run_simulation(rows, &job.config, job.label.clone()))
                .collect()
        } else {
            jobs.iter()
                .map(|job| run_simulation(rows, &job.config, job.label.clone()))
                .collect()
        }
    }
}
