/// Running totals for one simulation.
///
/// Equity is never stored. It is always `starting + gross_pl - withdrawn`,
/// so the accounting identity holds exactly at every step.
#[derive(Debug, Clone)]
pub struct Ledger {
    starting_capital: f64,
    gross_pl: f64,
    total_withdrawn: f64,
}

impl Ledger {
    pub fn new(starting_capital: f64) -> Self {
        Self {
            starting_capital,
            gross_pl: 0.0,
            total_withdrawn: 0.0,
        }
    }

    /// Book a closed trade's realized P/L.
    pub fn apply_pl(&mut self, pl: f64) {
        self.gross_pl += pl;
    }

    /// Remove capital from the account. Returns equity afterwards.
    pub fn withdraw(&mut self, amount: f64) -> f64 {
        self.total_withdrawn += amount;
        self.equity()
    }

    pub fn equity(&self) -> f64 {
        self.starting_capital + self.gross_pl - self.total_withdrawn
    }

    pub fn starting_capital(&self) -> f64 {
        self.starting_capital
    }

    pub fn gross_pl(&self) -> f64 {
        self.gross_pl
    }

    pub fn total_withdrawn(&self) -> f64 {
        self.total_withdrawn
    }

    /// False once any total has overflowed to infinity or NaN.
    pub fn is_finite(&self) -> bool {
        self.gross_pl.is_finite() && self.total_withdrawn.is_finite() && self.equity().is_finite()
    }

    /// P/L that remains in the account.
    pub fn retained_pl(&self) -> f64 {
        self.equity() - self.starting_capital
    }
}
