//! The capital path simulator.
//!
//! Replays closed trades in close-date order, buckets them into calendar
//! months, and applies the withdrawal policy once at each month's close:
//!
//! 1. Validate configuration (before any row is read)
//! 2. Validate and resolve every row to realized P/L
//! 3. Stable-sort by close date
//! 4. Group into an explicit, ordered sequence of periods
//! 5. Walk periods: book each close date, then close the period

use tracing::{debug, warn};

use crate::config::CapitalPathConfig;
use crate::domain::{group_into_periods, same_day_total, ClosedTrade, TradeRow};
use crate::error::{DataError, SimulationError};
use crate::result::{EquityEvent, EquityPoint, PeriodSummary, SimulationResult, WithdrawalEvent};

use super::accounting::Ledger;
use super::resolve::resolve_rows;
use super::withdrawal::withdrawal_amount;

/// Reconstruct an account's equity path from a trade log and a capital policy.
///
/// Pure: the same inputs always give the same result. `rows` is never
/// mutated; sorting happens on a private copy. Rows sharing a close date keep
/// their input order in the equity curve, but are booked as one same-day
/// total, so every total and period summary is independent of input order.
pub fn simulate(
    rows: &[TradeRow],
    config: &CapitalPathConfig,
) -> Result<SimulationResult, SimulationError> {
    simulate_with_trades(rows, config).map(|(result, _)| result)
}

/// Like [`simulate`], also returning the resolved trades in close order.
pub fn simulate_with_trades(
    rows: &[TradeRow],
    config: &CapitalPathConfig,
) -> Result<(SimulationResult, Vec<ClosedTrade>), SimulationError> {
    config.validate()?;
    let mut trades = resolve_rows(rows, &config.log_type)?;

    if trades.is_empty() {
        return Ok((SimulationResult::empty(config.starting_capital), trades));
    }

    // `sort_by_key` is stable.
    trades.sort_by_key(|t| t.closed_on);
    let result = walk_periods(&trades, config)?;
    Ok((result, trades))
}

fn walk_periods(
    trades: &[ClosedTrade],
    config: &CapitalPathConfig,
) -> Result<SimulationResult, SimulationError> {
    let periods = group_into_periods(trades);

    let mut ledger = Ledger::new(config.starting_capital);
    let mut summaries = Vec::with_capacity(periods.len());
    let mut equity_curve = Vec::with_capacity(trades.len() + periods.len());
    let mut withdrawals = Vec::new();

    for period in &periods {
        let opening_equity = ledger.equity();
        for group in period.same_day_groups() {
            let before = ledger.equity();
            ledger.apply_pl(same_day_total(group));
            let mut running = before;
            for (i, trade) in group.iter().enumerate() {
                running += trade.pl;
                let equity = if i + 1 == group.len() {
                    ledger.equity()
                } else {
                    running
                };
                equity_curve.push(EquityPoint {
                    date: trade.closed_on,
                    equity,
                    event: EquityEvent::Trade,
                });
            }
        }
        if !ledger.is_finite() {
            return Err(DataError::RunningTotalOverflow { period: period.key }.into());
        }

        let net_pl = period.net_pl();
        let closing_equity = ledger.equity();
        let amount = withdrawal_amount(
            &config.withdrawal,
            net_pl,
            closing_equity,
            config.starting_capital,
        );

        let equity_after_withdrawal = if amount > 0.0 {
            let equity_after = ledger.withdraw(amount);
            if !ledger.is_finite() {
                return Err(DataError::RunningTotalOverflow { period: period.key }.into());
            }
            equity_curve.push(EquityPoint {
                date: period.last_close,
                equity: equity_after,
                event: EquityEvent::Withdrawal,
            });
            withdrawals.push(WithdrawalEvent {
                period: period.key,
                date: period.last_close,
                amount,
                equity_after,
            });
            equity_after
        } else {
            closing_equity
        };

        debug!(
            period = %period.key,
            trades = period.trades.len(),
            net_pl,
            closing_equity,
            withdrawn = amount,
            "period closed"
        );

        if equity_after_withdrawal < 0.0 {
            warn!(period = %period.key, equity = equity_after_withdrawal, "equity is negative");
        }

        summaries.push(PeriodSummary {
            key: period.key,
            first_close: period.first_close,
            last_close: period.last_close,
            trade_count: period.trades.len(),
            net_pl,
            opening_equity,
            closing_equity,
            withdrawn: amount,
            equity_after_withdrawal,
        });
    }

    Ok(SimulationResult {
        starting_capital: config.starting_capital,
        final_equity: ledger.equity(),
        total_pl: ledger.retained_pl(),
        gross_pl: ledger.gross_pl(),
        total_withdrawn: ledger.total_withdrawn(),
        periods: summaries,
        equity_curve,
        withdrawals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogType, WithdrawalPolicy};
    use crate::domain::PeriodKey;
    use crate::error::{ConfigurationError, DataError};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(m: u32, day: u32, pl: f64) -> TradeRow {
        TradeRow::sized(d(2024, m, 1), d(2024, m, day), pl)
    }

    fn config(policy: WithdrawalPolicy) -> CapitalPathConfig {
        CapitalPathConfig::sized(100_000.0, policy).unwrap()
    }

    #[test]
    fn empty_log_returns_starting_capital() {
        let r = simulate(&[], &config(WithdrawalPolicy::ResetToStartingFunds)).unwrap();
        assert_eq!(r.final_equity, 100_000.0);
        assert_eq!(r.total_pl, 0.0);
        assert_eq!(r.total_withdrawn, 0.0);
        assert!(r.periods.is_empty());
    }

    #[test]
    fn single_trade_closes_its_own_period() {
        let r = simulate(
            &[row(3, 15, 4_000.0)],
            &config(WithdrawalPolicy::PercentOfMonthlyProfit { fraction: 0.25 }),
        )
        .unwrap();
        assert_eq!(r.total_withdrawn, 1_000.0);
        assert_eq!(r.final_equity, 103_000.0);
        assert_eq!(r.periods.len(), 1);
        assert_eq!(r.withdrawals.len(), 1);
        assert_eq!(r.withdrawals[0].date, d(2024, 3, 15));
    }

    #[test]
    fn withdrawal_uses_period_net_not_last_trade() {
        // Last trade of the month loses, but the month nets positive.
        let rows = vec![row(1, 5, 8_000.0), row(1, 20, -2_000.0)];
        let r = simulate(
            &rows,
            &config(WithdrawalPolicy::PercentOfMonthlyProfit { fraction: 0.5 }),
        )
        .unwrap();
        assert_eq!(r.total_withdrawn, 3_000.0);
        assert_eq!(r.periods[0].closing_equity, 106_000.0);
        assert_eq!(r.periods[0].equity_after_withdrawal, 103_000.0);
    }

    #[test]
    fn percent_mode_skips_losing_month_even_above_baseline() {
        let rows = vec![row(1, 5, 20_000.0), row(2, 5, -1_000.0)];
        let r = simulate(
            &rows,
            &config(WithdrawalPolicy::PercentOfMonthlyProfit { fraction: 0.5 }),
        )
        .unwrap();
        assert_eq!(r.withdrawals.len(), 1);
        assert_eq!(r.periods[1].withdrawn, 0.0);
        assert_eq!(r.final_equity, 109_000.0);
    }

    #[test]
    fn reset_mode_withdraws_only_above_baseline() {
        let rows = vec![row(1, 5, 30_000.0), row(1, 6, 20_000.0), row(2, 5, -5_000.0)];
        let mut cfg = config(WithdrawalPolicy::ResetToStartingFunds);
        cfg.starting_capital = 60_000.0;
        let r = simulate(&rows, &cfg).unwrap();
        // Jan: 60k + 50k = 110k -> withdraw 50k. Feb: 55k, below baseline.
        assert_eq!(r.withdrawals.len(), 1);
        assert_eq!(r.total_withdrawn, 50_000.0);
        assert_eq!(r.final_equity, 55_000.0);
    }

    #[test]
    fn unordered_rows_are_sorted_by_close_date() {
        let rows = vec![row(2, 10, -10_000.0), row(1, 10, 50_000.0)];
        let r = simulate(&rows, &config(WithdrawalPolicy::ResetToStartingFunds)).unwrap();
        assert_eq!(r.periods[0].key, PeriodKey::new(2024, 1));
        assert_eq!(r.total_withdrawn, 50_000.0);
        assert_eq!(r.final_equity, 90_000.0);
    }

    #[test]
    fn close_date_not_open_date_decides_period() {
        let rows = vec![TradeRow::sized(d(2024, 1, 25), d(2024, 2, 3), 1_000.0)];
        let r = simulate(&rows, &config(WithdrawalPolicy::None)).unwrap();
        assert_eq!(r.periods[0].key, PeriodKey::new(2024, 2));
    }

    #[test]
    fn equity_curve_records_trades_and_withdrawals() {
        let rows = vec![row(1, 5, 1_000.0), row(1, 9, 1_000.0), row(2, 1, 500.0)];
        let r = simulate(&rows, &config(WithdrawalPolicy::ResetToStartingFunds)).unwrap();
        let events: Vec<EquityEvent> = r.equity_curve.iter().map(|p| p.event).collect();
        assert_eq!(
            events,
            vec![
                EquityEvent::Trade,
                EquityEvent::Trade,
                EquityEvent::Withdrawal,
                EquityEvent::Trade,
                EquityEvent::Withdrawal,
            ]
        );
        assert_eq!(r.equity_curve[2].equity, 100_000.0);
    }

    #[test]
    fn negative_equity_is_carried_not_clamped() {
        let rows = vec![row(1, 5, -150_000.0), row(2, 5, 10_000.0)];
        let r = simulate(
            &rows,
            &config(WithdrawalPolicy::PercentOfMonthlyProfit { fraction: 1.0 }),
        )
        .unwrap();
        // February is profitable but equity is -40k, so the cap allows nothing.
        assert_eq!(r.total_withdrawn, 0.0);
        assert_eq!(r.final_equity, -40_000.0);
    }

    #[test]
    fn contract_log_resolves_before_walk() {
        let rows = vec![TradeRow::contracts(d(2024, 1, 2), d(2024, 1, 3), 2.0, 10.0)];
        let cfg = CapitalPathConfig::new(
            10_000.0,
            LogType::Contracts { multiplier: 50.0 },
            WithdrawalPolicy::None,
        )
        .unwrap();
        let r = simulate(&rows, &cfg).unwrap();
        assert_eq!(r.gross_pl, 1_000.0);
        assert_eq!(r.final_equity, 11_000.0);
    }

    #[test]
    fn configuration_checked_before_rows() {
        // Both the config and the row are bad; the config error wins.
        let rows = vec![TradeRow::sized(d(2024, 2, 1), d(2024, 1, 1), f64::NAN)];
        let cfg = CapitalPathConfig {
            starting_capital: -1.0,
            log_type: LogType::Sized,
            withdrawal: WithdrawalPolicy::None,
        };
        let err = simulate(&rows, &cfg).unwrap_err();
        assert_eq!(
            err,
            SimulationError::Configuration(ConfigurationError::InvalidStartingCapital(-1.0))
        );
    }

    #[test]
    fn bad_row_fails_whole_call() {
        let rows = vec![row(1, 5, 1_000.0), TradeRow::sized(d(2024, 3, 9), d(2024, 3, 1), 5.0)];
        let err = simulate(&rows, &config(WithdrawalPolicy::None)).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Data(DataError::CloseBeforeOpen { index: 1, .. })
        ));
    }

    #[test]
    fn tied_close_dates_book_identically_in_any_order() {
        let pls = [5518.4200788, -9450.3599272, 3467.6300651, 569.1900452];
        let forward: Vec<TradeRow> = pls.iter().map(|&pl| row(1, 5, pl)).collect();
        let mut reversed = forward.clone();
        reversed.reverse();

        let cfg = config(WithdrawalPolicy::None);
        let a = simulate(&forward, &cfg).unwrap();
        let b = simulate(&reversed, &cfg).unwrap();
        assert_eq!(a.final_equity.to_bits(), b.final_equity.to_bits());
        assert_eq!(a.gross_pl.to_bits(), b.gross_pl.to_bits());
        assert_eq!(a.periods, b.periods);
        assert_eq!(a.final_equity, 100_000.0 + a.gross_pl - a.total_withdrawn);
    }

    #[test]
    fn tied_close_dates_keep_input_order_in_equity_curve() {
        let rows = vec![row(1, 5, 100.0), row(1, 5, 200.0), row(1, 5, -50.0)];
        let r = simulate(&rows, &config(WithdrawalPolicy::None)).unwrap();
        let equities: Vec<f64> = r.equity_curve.iter().map(|p| p.equity).collect();
        assert_eq!(equities, vec![100_100.0, 100_300.0, 100_250.0]);

        let mut reversed = rows;
        reversed.reverse();
        let r = simulate(&reversed, &config(WithdrawalPolicy::None)).unwrap();
        let equities: Vec<f64> = r.equity_curve.iter().map(|p| p.equity).collect();
        assert_eq!(equities, vec![99_950.0, 100_150.0, 100_250.0]);
    }

    #[test]
    fn overflowing_totals_fail_the_call() {
        let rows = vec![row(1, 5, 1e308), row(2, 5, 1e308)];
        let err = simulate(&rows, &config(WithdrawalPolicy::None)).unwrap_err();
        assert_eq!(
            err,
            SimulationError::Data(DataError::RunningTotalOverflow {
                period: PeriodKey::new(2024, 2)
            })
        );
    }

    #[test]
    fn overflow_is_caught_under_reset_mode() {
        let rows = vec![row(1, 5, 1e308), row(2, 5, 1e308), row(2, 6, 1e308)];
        let err = simulate(&rows, &config(WithdrawalPolicy::ResetToStartingFunds)).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Data(DataError::RunningTotalOverflow { .. })
        ));
    }

    #[test]
    fn simulate_with_trades_returns_close_order() {
        let rows = vec![row(2, 10, -10.0), row(1, 10, 50.0)];
        let (r, trades) =
            simulate_with_trades(&rows, &config(WithdrawalPolicy::None)).unwrap();
        assert_eq!(r.trade_count(), 2);
        let indices: Vec<usize> = trades.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![1, 0]);
    }
}
