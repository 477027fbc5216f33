//! Row validation and resolution to realized P/L.

use crate::config::LogType;
use crate::domain::{ClosedTrade, TradeRow};
use crate::error::DataError;

/// Validate every row and reduce it to a `ClosedTrade`, in input order.
///
/// Fails on the first malformed row; no partial output is returned.
pub fn resolve_rows(rows: &[TradeRow], log_type: &LogType) -> Result<Vec<ClosedTrade>, DataError> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| resolve_row(index, row, log_type))
        .collect()
}

fn resolve_row(index: usize, row: &TradeRow, log_type: &LogType) -> Result<ClosedTrade, DataError> {
    let (opened_on, closed_on) = (row.opened_on(), row.closed_on());

    let pl = match (row, log_type) {
        (TradeRow::Sized(t), LogType::Sized) => finite(index, "pl", t.pl)?,
        (TradeRow::Contracts(t), LogType::Contracts { multiplier }) => {
            let contracts = finite(index, "contracts", t.contracts)?;
            let per_contract = finite(index, "pl_per_contract", t.pl_per_contract)?;
            // Product of finite values can still overflow.
            finite(index, "pl", contracts * per_contract * multiplier)?
        }
        _ => {
            return Err(DataError::ShapeMismatch {
                index,
                expected: log_type.shape(),
                found: row.shape(),
            })
        }
    };

    if closed_on < opened_on {
        return Err(DataError::CloseBeforeOpen {
            index,
            opened_on,
            closed_on,
        });
    }

    Ok(ClosedTrade {
        index,
        opened_on,
        closed_on,
        pl,
    })
}

fn finite(index: usize, field: &'static str, value: f64) -> Result<f64, DataError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DataError::NonFinite {
            index,
            field,
            value,
        })
    }
}
