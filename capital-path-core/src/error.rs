//! Error types for the capital path simulator.
//!
//! Both kinds are fatal to a call: configuration problems are reported
//! before any row is read, data problems before any row is applied.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{LogShape, PeriodKey};

/// Invalid or incomplete capital-management configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("starting capital must be finite and positive, got {0}")]
    InvalidStartingCapital(f64),

    #[error("withdrawal profit fraction must be within [0, 1], got {0}")]
    InvalidWithdrawalFraction(f64),

    #[error("contract multiplier must be finite and positive, got {0}")]
    InvalidContractMultiplier(f64),
}

/// A trade log that cannot be simulated.
///
/// `index` is the row's position in the caller's input, before sorting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("row {index}: closed on {closed_on} before it was opened on {opened_on}")]
    CloseBeforeOpen {
        index: usize,
        opened_on: NaiveDate,
        closed_on: NaiveDate,
    },

    #[error("row {index}: {field} is not a finite number ({value})")]
    NonFinite {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("row {index}: log is declared {expected} but row is {found}")]
    ShapeMismatch {
        index: usize,
        expected: LogShape,
        found: LogShape,
    },

    #[error("running totals are no longer finite after period {period}")]
    RunningTotalOverflow { period: PeriodKey },
}

/// Errors from a simulation call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
}
