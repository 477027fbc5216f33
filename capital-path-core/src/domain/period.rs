//! Accounting periods — calendar months keyed by close date.

use super::trade::ClosedTrade;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar month a trade's close date falls in.
///
/// Orders chronologically: year first, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeriodKey {
    pub year: i32,
    pub month: u32,
}

impl PeriodKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A run of trades that closed in the same calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct Period<'a> {
    pub key: PeriodKey,
    pub first_close: NaiveDate,
    pub last_close: NaiveDate,
    pub trades: &'a [ClosedTrade],
}

impl<'a> Period<'a> {
    /// Net realized P/L of the period.
    ///
    /// Each close date is summed with [`same_day_total`], then dates are
    /// added in calendar order, so the value does not depend on how
    /// same-day trades were ordered in the input.
    pub fn net_pl(&self) -> f64 {
        self.same_day_groups().into_iter().map(same_day_total).sum()
    }

    /// Consecutive runs of trades sharing a close date, in close order.
    pub fn same_day_groups(&self) -> Vec<&'a [ClosedTrade]> {
        let trades = self.trades;
        let mut groups = Vec::new();
        let mut start = 0;

        while start < trades.len() {
            let date = trades[start].closed_on;
            let mut end = start + 1;
            while end < trades.len() && trades[end].closed_on == date {
                end += 1;
            }
            groups.push(&trades[start..end]);
            start = end;
        }

        groups
    }
}

/// Sum of P/L for trades that closed on the same day.
///
/// Values are added in `f64::total_cmp` order, which makes the result
/// bit-identical for any permutation of `trades`.
pub fn same_day_total(trades: &[ClosedTrade]) -> f64 {
    let mut pls: Vec<f64> = trades.iter().map(|t| t.pl).collect();
    pls.sort_by(f64::total_cmp);
    pls.into_iter().sum()
}

/// Split trades sorted by close date into consecutive monthly periods.
///
/// Months with no closed trades never appear. Every returned period holds at
/// least one trade, and the periods partition the input in order.
pub fn group_into_periods(sorted: &[ClosedTrade]) -> Vec<Period<'_>> {
    let mut periods = Vec::new();
    let mut start = 0;

    while start < sorted.len() {
        let key = PeriodKey::of(sorted[start].closed_on);
        let mut end = start + 1;
        while end < sorted.len() && PeriodKey::of(sorted[end].closed_on) == key {
            end += 1;
        }
        periods.push(Period {
            key,
            first_close: sorted[start].closed_on,
            last_close: sorted[end - 1].closed_on,
            trades: &sorted[start..end],
        });
        start = end;
    }

    periods
}
