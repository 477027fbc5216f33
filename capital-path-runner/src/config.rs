//! TOML configuration files for a simulation run.
//!
//! ```toml
//! label = "half-profit"
//!
//! [account]
//! starting_capital = 100000.0
//! log_type = "contracts"
//! contract_multiplier = 50.0
//!
//! [withdrawal]
//! mode = "percent_of_monthly_profit"
//! profit_percent = 0.5
//! ```
//!
//! The file layer is flat (a mode name plus optional
//! parameters); `to_capital_path_config` turns it into the typed core value
//! and rejects mismatched mode/parameter pairs.

use std::path::{Path, PathBuf};

use capital_path_core::{CapitalPathConfig, ConfigurationError, LogType, WithdrawalPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from reading or interpreting a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("withdrawal mode '{mode}' requires '{param}'")]
    MissingParameter {
        mode: &'static str,
        param: &'static str,
    },
    #[error("'{param}' is only valid with {allowed}")]
    UnexpectedParameter {
        param: &'static str,
        allowed: &'static str,
    },
    #[error(transparent)]
    Invalid(#[from] ConfigurationError),
}

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfigFile {
    /// Optional human-readable name; used for artifact directories and reports.
    #[serde(default)]
    pub label: Option<String>,
    pub account: AccountSection,
    #[serde(default)]
    pub withdrawal: WithdrawalSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountSection {
    pub starting_capital: f64,
    #[serde(default)]
    pub log_type: LogTypeName,
    #[serde(default)]
    pub contract_multiplier: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogTypeName {
    #[default]
    Sized,
    Contracts,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WithdrawalSection {
    #[serde(default)]
    pub mode: WithdrawalModeName,
    #[serde(default)]
    pub profit_percent: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalModeName {
    #[default]
    None,
    PercentOfMonthlyProfit,
    ResetToStartingFunds,
}

impl SimulationConfigFile {
    /// Parse from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Convert to the validated core configuration.
    pub fn to_capital_path_config(&self) -> Result<CapitalPathConfig, ConfigError> {
        let log_type = match (self.account.log_type, self.account.contract_multiplier) {
            (LogTypeName::Sized, None) => LogType::Sized,
            (LogTypeName::Sized, Some(_)) => {
                return Err(ConfigError::UnexpectedParameter {
                    param: "contract_multiplier",
                    allowed: "log_type = \"contracts\"",
                })
            }
            (LogTypeName::Contracts, Some(multiplier)) => LogType::Contracts { multiplier },
            (LogTypeName::Contracts, None) => {
                return Err(ConfigError::MissingParameter {
                    mode: "contracts",
                    param: "contract_multiplier",
                })
            }
        };

        let withdrawal = match (self.withdrawal.mode, self.withdrawal.profit_percent) {
            (WithdrawalModeName::PercentOfMonthlyProfit, Some(fraction)) => {
                WithdrawalPolicy::PercentOfMonthlyProfit { fraction }
            }
            (WithdrawalModeName::PercentOfMonthlyProfit, None) => {
                return Err(ConfigError::MissingParameter {
                    mode: "percent_of_monthly_profit",
                    param: "profit_percent",
                })
            }
            (_, Some(_)) => {
                return Err(ConfigError::UnexpectedParameter {
                    param: "profit_percent",
                    allowed: "mode = \"percent_of_monthly_profit\"",
                })
            }
            (WithdrawalModeName::None, None) => WithdrawalPolicy::None,
            (WithdrawalModeName::ResetToStartingFunds, None) => {
                WithdrawalPolicy::ResetToStartingFunds
            }
        };

        Ok(CapitalPathConfig::new(
            self.account.starting_capital,
            log_type,
            withdrawal,
        )?)
    }

    /// Inverse of `to_capital_path_config`, for writing a config back out.
    pub fn from_capital_path_config(config: &CapitalPathConfig, label: Option<String>) -> Self {
        let (log_type, contract_multiplier) = match config.log_type {
            LogType::Sized => (LogTypeName::Sized, None),
            LogType::Contracts { multiplier } => (LogTypeName::Contracts, Some(multiplier)),
        };
        let (mode, profit_percent) = match config.withdrawal {
            WithdrawalPolicy::None => (WithdrawalModeName::None, None),
            WithdrawalPolicy::PercentOfMonthlyProfit { fraction } => {
                (WithdrawalModeName::PercentOfMonthlyProfit, Some(fraction))
            }
            WithdrawalPolicy::ResetToStartingFunds => {
                (WithdrawalModeName::ResetToStartingFunds, None)
            }
        };
        Self {
            label,
            account: AccountSection {
                starting_capital: config.starting_capital,
                log_type,
                contract_multiplier,
            },
            withdrawal: WithdrawalSection {
                mode,
                profit_percent,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let file = SimulationConfigFile::from_toml(
            r#"
[account]
starting_capital = 100000.0
"#,
        )
        .unwrap();
        let config = file.to_capital_path_config().unwrap();
        assert_eq!(config.starting_capital, 100_000.0);
        assert_eq!(config.log_type, LogType::Sized);
        assert_eq!(config.withdrawal, WithdrawalPolicy::None);
        assert!(file.label.is_none());
    }

    #[test]
    fn parses_full_config() {
        let file = SimulationConfigFile::from_toml(
            r#"
label = "es-futures"

[account]
starting_capital = 50000.0
log_type = "contracts"
contract_multiplier = 50.0

[withdrawal]
mode = "percent_of_monthly_profit"
profit_percent = 0.25
"#,
        )
        .unwrap();
        let config = file.to_capital_path_config().unwrap();
        assert_eq!(file.label.as_deref(), Some("es-futures"));
        assert_eq!(config.log_type, LogType::Contracts { multiplier: 50.0 });
        assert_eq!(
            config.withdrawal,
            WithdrawalPolicy::PercentOfMonthlyProfit { fraction: 0.25 }
        );
    }

    #[test]
    fn percent_mode_requires_percent() {
        let file = SimulationConfigFile::from_toml(
            r#"
[account]
starting_capital = 1000.0

[withdrawal]
mode = "percent_of_monthly_profit"
"#,
        )
        .unwrap();
        let err = file.to_capital_path_config().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingParameter {
                param: "profit_percent",
                ..
            }
        ));
    }

    #[test]
    fn percent_given_for_other_mode_is_rejected() {
        let file = SimulationConfigFile::from_toml(
            r#"
[account]
starting_capital = 1000.0

[withdrawal]
mode = "reset_to_starting_funds"
profit_percent = 0.5
"#,
        )
        .unwrap();
        assert!(matches!(
            file.to_capital_path_config(),
            Err(ConfigError::UnexpectedParameter { .. })
        ));
    }

    #[test]
    fn contracts_require_multiplier() {
        let file = SimulationConfigFile::from_toml(
            r#"
[account]
starting_capital = 1000.0
log_type = "contracts"
"#,
        )
        .unwrap();
        assert!(matches!(
            file.to_capital_path_config(),
            Err(ConfigError::MissingParameter {
                param: "contract_multiplier",
                ..
            })
        ));
    }

    #[test]
    fn core_validation_runs() {
        let file = SimulationConfigFile::from_toml(
            r#"
[account]
starting_capital = -5.0
"#,
        )
        .unwrap();
        assert!(matches!(
            file.to_capital_path_config(),
            Err(ConfigError::Invalid(
                ConfigurationError::InvalidStartingCapital(_)
            ))
        ));
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        let parsed = SimulationConfigFile::from_toml(
            r#"
[account]
starting_capital = 1000.0

[withdrawal]
mode = "everything"
"#,
        );
        assert!(matches!(parsed, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn round_trips_through_core_config() {
        let core = CapitalPathConfig::new(
            75_000.0,
            LogType::Contracts { multiplier: 20.0 },
            WithdrawalPolicy::ResetToStartingFunds,
        )
        .unwrap();
        let file = SimulationConfigFile::from_capital_path_config(&core, Some("nq".into()));
        let text = toml::to_string(&file).unwrap();
        let back = SimulationConfigFile::from_toml(&text)
            .unwrap()
            .to_capital_path_config()
            .unwrap();
        assert_eq!(core, back);
    }
}
