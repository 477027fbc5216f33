//! Trade log rows — one closed position each, in one of two shapes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which row shape a trade log uses.
///
/// Rows do not describe their own shape to the simulator; the configuration's
/// `LogType` declares it and rows of the other shape are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogShape {
    Sized,
    Contracts,
}

impl fmt::Display for LogShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogShape::Sized => f.write_str("sized"),
            LogShape::Contracts => f.write_str("contracts"),
        }
    }
}

/// A closed position whose realized P/L is already in currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizedTrade {
    pub opened_on: NaiveDate,
    pub closed_on: NaiveDate,
    pub pl: f64,
}

/// A closed position recorded as a contract count and a per-contract result in points.
///
/// Realized P/L is `contracts * pl_per_contract * multiplier`, where the
/// multiplier comes from the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractTrade {
    pub opened_on: NaiveDate,
    pub closed_on: NaiveDate,
    pub contracts: f64,
    pub pl_per_contract: f64,
}

/// One row of a trade log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum TradeRow {
    Sized(SizedTrade),
    Contracts(ContractTrade),
}

impl TradeRow {
    /// Convenience constructor for the sized shape.
    pub fn sized(opened_on: NaiveDate, closed_on: NaiveDate, pl: f64) -> Self {
        TradeRow::Sized(SizedTrade {
            opened_on,
            closed_on,
            pl,
        })
    }

    /// Convenience constructor for the contracts shape.
    pub fn contracts(
        opened_on: NaiveDate,
        closed_on: NaiveDate,
        contracts: f64,
        pl_per_contract: f64,
    ) -> Self {
        TradeRow::Contracts(ContractTrade {
            opened_on,
            closed_on,
            contracts,
            pl_per_contract,
        })
    }

    pub fn shape(&self) -> LogShape {
        match self {
            TradeRow::Sized(_) => LogShape::Sized,
            TradeRow::Contracts(_) => LogShape::Contracts,
        }
    }

    pub fn opened_on(&self) -> NaiveDate {
        match self {
            TradeRow::Sized(t) => t.opened_on,
            TradeRow::Contracts(t) => t.opened_on,
        }
    }

    /// Close date. This, not the open date, decides processing order and period membership.
    pub fn closed_on(&self) -> NaiveDate {
        match self {
            TradeRow::Sized(t) => t.closed_on,
            TradeRow::Contracts(t) => t.closed_on,
        }
    }
}

/// A validated row reduced to what the period walk needs.
///
/// `index` is the row's position in the caller's input, kept so sorting
/// stays traceable back to the original log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub index: usize,
    pub opened_on: NaiveDate,
    pub closed_on: NaiveDate,
    pub pl: f64,
}

impl ClosedTrade {
    pub fn is_winner(&self) -> bool {
        self.pl > 0.0
    }

    /// Calendar days the position was held (zero for same-day trades).
    pub fn days_held(&self) -> i64 {
        (self.closed_on - self.opened_on).num_days()
    }
}
