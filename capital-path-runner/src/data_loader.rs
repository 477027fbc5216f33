//! Trade-log loading from CSV.
//!
//! The configuration's log type picks the columns:
//! - sized: `opened_on,closed_on,pl`
//! - contracts: `opened_on,closed_on,contracts,pl_per_contract`
//!
//! Columns are matched by header name, in any order; extra columns are
//! ignored. Loading only parses. Semantic checks (close before open,
//! non-finite P/L) belong to the simulator.

use std::io::Read;
use std::path::{Path, PathBuf};

use capital_path_core::{LogType, TradeRow};
use chrono::NaiveDate;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors from the trade-log loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open trade log {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("trade log is missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("line {line}: invalid {column} '{value}': {reason}")]
    InvalidField {
        line: u64,
        column: &'static str,
        value: String,
        reason: String,
    },
}

/// Load a trade log file in the shape declared by `log_type`.
pub fn load_trade_log(path: &Path, log_type: &LogType) -> Result<Vec<TradeRow>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = read_trade_log(file, log_type)?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded trade log");
    Ok(rows)
}

/// Parse a trade log from any reader.
pub fn read_trade_log<R: Read>(reader: R, log_type: &LogType) -> Result<Vec<TradeRow>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or(LoadError::MissingColumn { column: name })
    };

    let opened_col = column("opened_on")?;
    let closed_col = column("closed_on")?;
    let shape = match log_type {
        LogType::Sized => Columns::Sized { pl: column("pl")? },
        LogType::Contracts { .. } => Columns::Contracts {
            contracts: column("contracts")?,
            pl_per_contract: column("pl_per_contract")?,
        },
    };

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let opened_on = parse_date(line, "opened_on", field(opened_col))?;
        let closed_on = parse_date(line, "closed_on", field(closed_col))?;
        let row = match shape {
            Columns::Sized { pl } => {
                TradeRow::sized(opened_on, closed_on, parse_number(line, "pl", field(pl))?)
            }
            Columns::Contracts {
                contracts,
                pl_per_contract,
            } => TradeRow::contracts(
                opened_on,
                closed_on,
                parse_number(line, "contracts", field(contracts))?,
                parse_number(line, "pl_per_contract", field(pl_per_contract))?,
            ),
        };
        rows.push(row);
    }
    Ok(rows)
}

#[derive(Clone, Copy)]
enum Columns {
    Sized { pl: usize },
    Contracts { contracts: usize, pl_per_contract: usize },
}

fn parse_date(line: u64, column: &'static str, value: &str) -> Result<NaiveDate, LoadError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| LoadError::InvalidField {
        line,
        column,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_number(line: u64, column: &'static str, value: &str) -> Result<f64, LoadError> {
    value.parse::<f64>().map_err(|e| LoadError::InvalidField {
        line,
        column,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
