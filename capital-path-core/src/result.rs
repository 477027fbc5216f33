//! Simulation result — scalar totals plus the period table and equity series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::PeriodKey;

/// Complete output of one simulation.
///
/// The scalar fields satisfy, bit for bit:
/// `final_equity == starting_capital + gross_pl - total_withdrawn`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub starting_capital: f64,
    /// Equity after the last trade and any withdrawal its period triggered.
    pub final_equity: f64,
    /// P/L still in the account: `final_equity - starting_capital`.
    pub total_pl: f64,
    /// Sum of realized trade P/L, independent of withdrawals.
    pub gross_pl: f64,
    pub total_withdrawn: f64,
    /// Closed accounting periods in chronological order.
    pub periods: Vec<PeriodSummary>,
    pub equity_curve: Vec<EquityPoint>,
    pub withdrawals: Vec<WithdrawalEvent>,
}

impl SimulationResult {
    /// Result for a log with no trades.
    pub fn empty(starting_capital: f64) -> Self {
        Self {
            starting_capital,
            final_equity: starting_capital,
            total_pl: 0.0,
            gross_pl: 0.0,
            total_withdrawn: 0.0,
            periods: Vec::new(),
            equity_curve: Vec::new(),
            withdrawals: Vec::new(),
        }
    }

    pub fn trade_count(&self) -> usize {
        self.periods.iter().map(|p| p.trade_count).sum()
    }

    /// Equity values in series order, starting with the starting capital.
    pub fn equity_values(&self) -> Vec<f64> {
        std::iter::once(self.starting_capital)
            .chain(self.equity_curve.iter().map(|p| p.equity))
            .collect()
    }
}

/// One closed accounting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub key: PeriodKey,
    pub first_close: NaiveDate,
    pub last_close: NaiveDate,
    pub trade_count: usize,
    pub net_pl: f64,
    /// Equity before the period's first trade.
    pub opening_equity: f64,
    /// Equity after the period's last trade, before any withdrawal.
    pub closing_equity: f64,
    pub withdrawn: f64,
    pub equity_after_withdrawal: f64,
}

/// What moved equity at a point of the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquityEvent {
    Trade,
    Withdrawal,
}

/// Single point in the equity series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
    pub event: EquityEvent,
}

/// Capital removed from the account at a period close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalEvent {
    pub period: PeriodKey,
    /// Close date of the period's last trade.
    pub date: NaiveDate,
    pub amount: f64,
    pub equity_after: f64,
}
