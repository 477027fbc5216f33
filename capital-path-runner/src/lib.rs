//! Capital Path Runner — loading, batch runs, metrics, and artifacts.
//!
//! This crate builds on `capital-path-core` to provide:
//! - CSV trade-log loading in either log shape
//! - TOML configuration files mapped onto the typed core configuration
//! - Single and batch (rayon) simulation runs with BLAKE3 run ids
//! - Descriptive summary metrics
//! - JSON, CSV, and Markdown export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;

pub use config::{ConfigError, SimulationConfigFile};
pub use data_loader::{load_trade_log, read_trade_log, LoadError};
pub use export::{load_artifacts, save_artifacts};
pub use metrics::SummaryMetrics;
pub use runner::{
    run_from_files, run_id, run_simulation, BatchRunner, RunError, RunJob, RunResult,
    SCHEMA_VERSION,
};
