//! Withdrawal rules applied once at each period close.

use crate::config::WithdrawalPolicy;

/// Amount to withdraw when a period closes.
///
/// `period_net` is the period's net realized P/L and `equity` the account
/// equity after its last trade. The result is never negative and never
/// larger than positive equity.
pub fn withdrawal_amount(
    policy: &WithdrawalPolicy,
    period_net: f64,
    equity: f64,
    starting_capital: f64,
) -> f64 {
    match *policy {
        WithdrawalPolicy::None => 0.0,
        WithdrawalPolicy::PercentOfMonthlyProfit { fraction } => {
            if period_net <= 0.0 {
                return 0.0;
            }
            let wanted = period_net * fraction;
            let available = equity.max(0.0);
            if wanted > available {
                tracing::warn!(
                    wanted,
                    available,
                    "withdrawal capped at remaining equity"
                );
                available
            } else {
                wanted
            }
        }
        WithdrawalPolicy::ResetToStartingFunds => {
            if equity > starting_capital {
                equity - starting_capital
            } else {
                0.0
            }
        }
    }
}
