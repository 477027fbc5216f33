//! Capital Path Core — trade rows, withdrawal policies, and the capital path simulator.
//!
//! This crate contains the pure accounting heart of Capital Path:
//! - Domain types (trade log rows in both accepted shapes, accounting periods)
//! - Capital path configuration with a typed withdrawal policy
//! - Typed configuration and data errors
//! - The simulator: close-date replay, monthly period bucketing, withdrawals
//!
//! Nothing in here touches the filesystem, the clock, or global state.

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod result;

pub use config::{CapitalPathConfig, LogType, WithdrawalPolicy};
pub use domain::{ClosedTrade, ContractTrade, LogShape, PeriodKey, SizedTrade, TradeRow};
pub use engine::{simulate, simulate_with_trades};
pub use error::{ConfigurationError, DataError, SimulationError};
pub use result::{EquityEvent, EquityPoint, PeriodSummary, SimulationResult, WithdrawalEvent};
