//! Capital Path CLI — run and check commands.
//!
//! Commands:
//! - `run` — simulate a trade log under one or more config files and save artifacts
//! - `check` — load and validate a trade log and config without saving anything

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use capital_path_core::simulate;
use capital_path_runner::export::save_artifacts;
use capital_path_runner::{load_trade_log, BatchRunner, RunJob, RunResult, SimulationConfigFile};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "capital-path",
    about = "Capital Path — replay a trade log under a withdrawal policy"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a trade log under one or more configurations.
    Run {
        /// Path to the CSV trade log.
        #[arg(long)]
        trades: PathBuf,

        /// Path to a TOML config file. Repeat to run several policies in parallel.
        #[arg(long = "config", required = true)]
        configs: Vec<PathBuf>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Print results without writing artifacts.
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// Validate a trade log against a configuration without saving anything.
    Check {
        /// Path to the CSV trade log.
        #[arg(long)]
        trades: PathBuf,

        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            trades,
            configs,
            output_dir,
            no_save,
        } => run_cmd(&trades, &configs, &output_dir, no_save),
        Commands::Check { trades, config } => check_cmd(&trades, &config),
    }
}

fn load_jobs(configs: &[PathBuf]) -> Result<Vec<RunJob>> {
    configs
        .iter()
        .map(|path| {
            let file = SimulationConfigFile::load(path)?;
            let config = file
                .to_capital_path_config()
                .with_context(|| format!("invalid config {}", path.display()))?;
            // Fall back to the file stem so batch artifacts stay distinguishable.
            let label = file.label.or_else(|| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            });
            Ok(RunJob { label, config })
        })
        .collect()
}

fn run_cmd(trades: &Path, configs: &[PathBuf], output_dir: &Path, no_save: bool) -> Result<()> {
    let jobs = load_jobs(configs)?;

    // Every job must agree on the log shape since they share one file.
    let log_type = jobs
        .first()
        .map(|j| j.config.log_type)
        .context("at least one --config is required")?;
    if let Some(other) = jobs.iter().find(|j| j.config.log_type.shape() != log_type.shape()) {
        anyhow::bail!(
            "all configs must share one log type: found {} and {}",
            log_type.shape(),
            other.config.log_type.shape()
        );
    }

    let rows = load_trade_log(trades, &log_type)
        .with_context(|| format!("failed to load {}", trades.display()))?;
    let results = BatchRunner::new().run(&rows, &jobs)?;

    for result in &results {
        print_summary(result);
        if !no_save {
            let dir = save_artifacts(result, output_dir)?;
            println!("  artifacts: {}", dir.display());
        }
    }
    Ok(())
}

fn check_cmd(trades: &Path, config_path: &Path) -> Result<()> {
    let file = SimulationConfigFile::load(config_path)?;
    let config = file
        .to_capital_path_config()
        .with_context(|| format!("invalid config {}", config_path.display()))?;
    let rows = load_trade_log(trades, &config.log_type)
        .with_context(|| format!("failed to load {}", trades.display()))?;
    let result = simulate(&rows, &config)?;

    println!(
        "ok: {} rows across {} periods, policy {}",
        rows.len(),
        result.periods.len(),
        config.withdrawal.name()
    );
    Ok(())
}

fn print_summary(result: &RunResult) {
    let sim = &result.simulation;
    println!(
        "{} [{}]: final ${:.2}  P/L ${:.2}  withdrawn ${:.2}  ({} trades, {} periods, max DD {:.2}%)",
        result.label.as_deref().unwrap_or("run"),
        &result.run_id[..12],
        sim.final_equity,
        sim.total_pl,
        sim.total_withdrawn,
        result.metrics.trade_count,
        result.metrics.period_count,
        result.metrics.max_drawdown * 100.0,
    );
}
