//! Capital path configuration.
//!
//! The withdrawal policy is a sum type: each mode carries exactly the
//! parameters it needs, so a percent mode without a percent cannot exist.

use serde::{Deserialize, Serialize};

use crate::domain::LogShape;
use crate::error::ConfigurationError;

/// Shape of the trade log and how its rows resolve to realized P/L.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogType {
    /// Rows carry realized P/L directly.
    Sized,
    /// Rows carry a contract count and a per-contract result in points.
    Contracts { multiplier: f64 },
}

impl LogType {
    pub fn shape(&self) -> LogShape {
        match self {
            LogType::Sized => LogShape::Sized,
            LogType::Contracts { .. } => LogShape::Contracts,
        }
    }
}

/// What happens to equity when an accounting period closes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WithdrawalPolicy {
    /// Never withdraw.
    None,
    /// Withdraw `fraction` of a period's net profit when that profit is positive.
    PercentOfMonthlyProfit { fraction: f64 },
    /// Withdraw everything above starting capital at each period close.
    ResetToStartingFunds,
}

impl WithdrawalPolicy {
    /// Short identifier used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            WithdrawalPolicy::None => "none",
            WithdrawalPolicy::PercentOfMonthlyProfit { .. } => "percent_of_monthly_profit",
            WithdrawalPolicy::ResetToStartingFunds => "reset_to_starting_funds",
        }
    }
}

/// Immutable inputs to one simulation besides the trade rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalPathConfig {
    pub starting_capital: f64,
    pub log_type: LogType,
    pub withdrawal: WithdrawalPolicy,
}

impl CapitalPathConfig {
    /// Build and validate a configuration.
    pub fn new(
        starting_capital: f64,
        log_type: LogType,
        withdrawal: WithdrawalPolicy,
    ) -> Result<Self, ConfigurationError> {
        let config = Self {
            starting_capital,
            log_type,
            withdrawal,
        };
        config.validate()?;
        Ok(config)
    }

    /// Build and validate a configuration for a sized log.
    pub fn sized(
        starting_capital: f64,
        withdrawal: WithdrawalPolicy,
    ) -> Result<Self, ConfigurationError> {
        Self::new(starting_capital, LogType::Sized, withdrawal)
    }

    /// Check every numeric parameter. The simulator runs this on entry as well.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.starting_capital.is_finite() || self.starting_capital <= 0.0 {
            return Err(ConfigurationError::InvalidStartingCapital(
                self.starting_capital,
            ));
        }
        if let LogType::Contracts { multiplier } = self.log_type {
            if !multiplier.is_finite() || multiplier <= 0.0 {
                return Err(ConfigurationError::InvalidContractMultiplier(multiplier));
            }
        }
        if let WithdrawalPolicy::PercentOfMonthlyProfit { fraction } = self.withdrawal {
            // NaN fails the range check too.
            if !(0.0..=1.0).contains(&fraction) {
                return Err(ConfigurationError::InvalidWithdrawalFraction(fraction));
            }
        }
        Ok(())
    }
}
