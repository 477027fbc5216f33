//! Simulation engine: row validation, ledger accounting, withdrawal rules, and the period walk.

pub mod accounting;
pub mod resolve;
pub mod simulate;
pub mod withdrawal;

pub use accounting::Ledger;
pub use resolve::resolve_rows;
pub use simulate::{simulate, simulate_with_trades};
pub use withdrawal::withdrawal_amount;
