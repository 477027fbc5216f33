//! Domain types for Capital Path

pub mod period;
pub mod trade;

pub use period::{group_into_periods, same_day_total, Period, PeriodKey};
pub use trade::{ClosedTrade, ContractTrade, LogShape, SizedTrade, TradeRow};
