//! Summary metrics — pure functions over a finished simulation.
//!
//! Descriptive only: every metric looks back at what the trade log and the
//! withdrawal policy produced. Nothing here projects forward.

use capital_path_core::{ClosedTrade, SimulationResult};
use serde::{Deserialize, Serialize};

/// Aggregate statistics for a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub trade_count: usize,
    pub period_count: usize,
    pub winning_periods: usize,
    pub losing_periods: usize,
    pub withdrawal_count: usize,
    pub trade_win_rate: f64,
    /// Retained P/L as a fraction of starting capital.
    pub net_return: f64,
    /// Gross trading P/L as a fraction of starting capital.
    pub gross_return: f64,
    /// Worst peak-to-trough decline of the trading path (withdrawals excluded).
    pub max_drawdown: f64,
    /// Largest period net gain (0.0 when no period gained).
    pub best_period_pl: f64,
    /// Largest period net loss (0.0 when no period lost).
    pub worst_period_pl: f64,
}

impl SummaryMetrics {
    /// Compute all metrics from a result and the trades that produced it.
    pub fn compute(result: &SimulationResult, trades: &[ClosedTrade]) -> Self {
        let period_pls: Vec<f64> = result.periods.iter().map(|p| p.net_pl).collect();
        Self {
            trade_count: trades.len(),
            period_count: result.periods.len(),
            winning_periods: period_pls.iter().filter(|&&pl| pl > 0.0).count(),
            losing_periods: period_pls.iter().filter(|&&pl| pl < 0.0).count(),
            withdrawal_count: result.withdrawals.len(),
            trade_win_rate: win_rate(trades),
            net_return: fraction_of(result.total_pl, result.starting_capital),
            gross_return: fraction_of(result.gross_pl, result.starting_capital),
            max_drawdown: max_drawdown(&trading_path(result.starting_capital, trades)),
            best_period_pl: period_pls.iter().copied().fold(0.0, f64::max),
            worst_period_pl: period_pls.iter().copied().fold(0.0, f64::min),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

fn fraction_of(amount: f64, base: f64) -> f64 {
    if base <= 0.0 {
        return 0.0;
    }
    amount / base
}

/// Equity path from trading alone: starting capital plus cumulative P/L in close order.
pub fn trading_path(starting_capital: f64, trades: &[ClosedTrade]) -> Vec<f64> {
    let mut sorted: Vec<&ClosedTrade> = trades.iter().collect();
    sorted.sort_by_key(|t| t.closed_on);

    let mut equity = starting_capital;
    std::iter::once(starting_capital)
        .chain(sorted.into_iter().map(|t| {
            equity += t.pl;
            equity
        }))
        .collect()
}

/// Maximum drawdown as a negative fraction of the running peak.
///
/// Points are only measured against a positive peak; a path that never rises
/// above zero reports 0.0.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Win rate: fraction of trades with positive P/L.
pub fn win_rate(trades: &[ClosedTrade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use capital_path_core::{simulate_with_trades, CapitalPathConfig, TradeRow, WithdrawalPolicy};
    use chrono::NaiveDate;

    fn make_trade(day: u32, pl: f64) -> ClosedTrade {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        ClosedTrade {
            index: day as usize,
            opened_on: date,
            closed_on: date,
            pl,
        }
    }

    // ── Max drawdown ──

    #[test]
    fn max_drawdown_known() {
        let eq = vec![100_000.0, 110_000.0, 90_000.0, 95_000.0];
        // Peak = 110k, trough = 90k → dd = (90k-110k)/110k
        let dd = max_drawdown(&eq);
        let expected = (90_000.0 - 110_000.0) / 110_000.0;
        assert!((dd - expected).abs() < 1e-10);
    }

    #[test]
    fn max_drawdown_monotonic_increase() {
        let eq: Vec<f64> = (0..100).map(|i| 100_000.0 + i as f64 * 100.0).collect();
        assert_eq!(max_drawdown(&eq), 0.0);
    }

    #[test]
    fn max_drawdown_empty() {
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn max_drawdown_all_negative_path() {
        assert_eq!(max_drawdown(&[-10.0, -20.0, -30.0]), 0.0);
    }

    // ── Win rate ──

    #[test]
    fn win_rate_mixed() {
        let trades = vec![
            make_trade(1, 500.0),
            make_trade(2, -200.0),
            make_trade(3, 300.0),
            make_trade(4, 0.0),
        ];
        assert!((win_rate(&trades) - 0.5).abs() < 1e-10);
    }

    #[test]
    fn win_rate_empty() {
        assert_eq!(win_rate(&[]), 0.0);
    }

    // ── Trading path ──

    #[test]
    fn trading_path_sorts_by_close() {
        let trades = vec![make_trade(9, -50.0), make_trade(2, 100.0)];
        assert_eq!(trading_path(1_000.0, &trades), vec![1_000.0, 1_100.0, 1_050.0]);
    }

    // ── Summary ──

    #[test]
    fn withdrawals_do_not_count_as_drawdown() {
        let date = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
        let rows = vec![
            TradeRow::sized(date(1, 2), date(1, 3), 50_000.0),
            TradeRow::sized(date(2, 2), date(2, 3), 10_000.0),
        ];
        let config =
            CapitalPathConfig::sized(100_000.0, WithdrawalPolicy::ResetToStartingFunds).unwrap();
        let (result, trades) = simulate_with_trades(&rows, &config).unwrap();
        let m = SummaryMetrics::compute(&result, &trades);

        assert_eq!(m.max_drawdown, 0.0);
        assert_eq!(m.withdrawal_count, 2);
        assert_eq!(m.winning_periods, 2);
        assert_eq!(m.net_return, 0.0);
        assert!((m.gross_return - 0.6).abs() < 1e-12);
        assert_eq!(m.best_period_pl, 50_000.0);
        assert_eq!(m.worst_period_pl, 0.0);
    }
}
